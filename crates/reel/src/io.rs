// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::common::{
    non_blank, CatalogColumn, CatalogRecord, CatalogTable, ContentType, RawCatalog, RawEntry,
};
use crate::error::{ReportError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct CatalogReader {
    delimiter: u8,
    quote_char: u8,
}

impl CatalogReader {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote_char(mut self, quote_char: u8) -> Self {
        self.quote_char = quote_char;
        self
    }

    pub fn read_file(&self, path: &Path, dataset_name: &str) -> Result<RawCatalog> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReportError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ReportError::Io(e),
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote_char)
            .has_headers(true)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let missing: Vec<String> = CatalogColumn::ALL
            .iter()
            .filter(|column| !headers.iter().any(|h| h == column.name()))
            .map(|column| column.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::SchemaMismatch {
                path: path.to_path_buf(),
                missing,
            });
        }
        let layout: Vec<Option<CatalogColumn>> =
            headers.iter().map(|h| CatalogColumn::from_name(h)).collect();

        let mut entries = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            entries.push(Self::parse_record(&record, &layout, index + 1)?);
        }
        debug!(
            rows = entries.len(),
            columns = headers.len(),
            path = %path.display(),
            "parsed catalog file"
        );
        Ok(CatalogTable::new(
            dataset_name,
            headers,
            entries,
            Some(path.to_path_buf()),
        ))
    }

    fn parse_record(
        record: &csv::StringRecord,
        layout: &[Option<CatalogColumn>],
        row: usize,
    ) -> Result<RawEntry> {
        let field = |column: CatalogColumn| {
            layout
                .iter()
                .position(|slot| *slot == Some(column))
                .and_then(|i| record.get(i))
                .unwrap_or_default()
        };
        let invalid = |column: CatalogColumn, value: &str| ReportError::InvalidRecord {
            row,
            column: column.name().to_string(),
            value: value.to_string(),
        };

        let raw_type = field(CatalogColumn::Type);
        let content_type: ContentType = raw_type
            .parse()
            .map_err(|_| invalid(CatalogColumn::Type, raw_type))?;
        let raw_year = field(CatalogColumn::ReleaseYear);
        let release_year: i32 = raw_year
            .trim()
            .parse()
            .map_err(|_| invalid(CatalogColumn::ReleaseYear, raw_year))?;

        let mut entry = RawEntry::new(content_type, release_year);
        for (slot, value) in layout.iter().zip(record.iter()) {
            match slot {
                Some(column) => {
                    if let Some(target) = entry.slot_mut(*column) {
                        *target = non_blank(value);
                    }
                }
                None => entry.passthrough.push(non_blank(value)),
            }
        }
        Ok(entry)
    }
}

impl Default for CatalogReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CatalogWriter {
    delimiter: u8,
    quote_all: bool,
    buffer_size: usize,
}

impl CatalogWriter {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_all: false,
            buffer_size: 64 * 1024,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote_all(mut self, quote_all: bool) -> Self {
        self.quote_all = quote_all;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Writes the table with its original header order. Missing values are
    /// written as empty fields.
    pub fn write_file<E: CatalogRecord>(&self, table: &CatalogTable<E>, path: &Path) -> Result<()> {
        let fail = |source: std::io::Error| ReportError::write_failure(path, source);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(fail)?;
        }
        let file = File::create(path).map_err(fail)?;
        let quote_style = if self.quote_all {
            csv::QuoteStyle::Always
        } else {
            csv::QuoteStyle::Necessary
        };
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(quote_style)
            .from_writer(BufWriter::with_capacity(self.buffer_size, file));

        writer
            .write_record(table.columns())
            .map_err(|e| fail(e.into()))?;
        for index in 0..table.row_count() {
            let cells = table.row_cells(index).unwrap_or_default();
            writer
                .write_record(cells.iter().map(|cell| cell.as_deref().unwrap_or_default()))
                .map_err(|e| fail(e.into()))?;
        }
        let mut inner = writer.into_inner().map_err(|e| fail(e.into_error()))?;
        inner.flush().map_err(fail)?;
        debug!(rows = table.row_count(), path = %path.display(), "wrote catalog file");
        Ok(())
    }
}

impl Default for CatalogWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const HEADER: &str =
        "show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_entries_and_keeps_passthrough_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "catalog.csv",
            &format!(
                "{HEADER}\n\
                 s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,\"A son, a father\"\n\
                 s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema\",South Africa,,2021,TV-MA,2 Seasons,\"International TV Shows, TV Dramas\",After crossing paths\n"
            ),
        );
        let table = CatalogReader::new().read_file(&path, "sample").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 12);
        assert_eq!(table.passthrough_columns(), &["show_id".to_string(), "title".to_string()]);

        let first = &table.entries()[0];
        assert_eq!(first.content_type, ContentType::Movie);
        assert_eq!(first.release_year, 2020);
        assert_eq!(first.cast, None);
        assert_eq!(first.date_added.as_deref(), Some("September 25, 2021"));
        assert_eq!(first.description.as_deref(), Some("A son, a father"));
        assert_eq!(
            first.passthrough,
            vec![Some("s1".to_string()), Some("Dick Johnson Is Dead".to_string())]
        );

        let second = &table.entries()[1];
        assert_eq!(second.content_type, ContentType::TvShow);
        assert_eq!(second.director, None);
        assert_eq!(second.date_added, None);
        assert_eq!(second.listed_in.as_deref(), Some("International TV Shows, TV Dramas"));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = CatalogReader::new()
            .read_file(Path::new("/definitely/not/here.csv"), "x")
            .unwrap_err();
        assert!(matches!(err, ReportError::FileNotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn missing_columns_are_a_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "type,title,release_year\nMovie,X,2020\n");
        match CatalogReader::new().read_file(&path, "bad") {
            Err(ReportError::SchemaMismatch { missing, .. }) => {
                assert!(missing.contains(&"rating".to_string()));
                assert!(missing.contains(&"listed_in".to_string()));
                assert!(!missing.contains(&"type".to_string()));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_type_or_year_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "rows.csv",
            &format!("{HEADER}\ns1,Movie,A,,,,,2020,,,,\ns2,Movie,B,,,,,twenty,,,,\n"),
        );
        match CatalogReader::new().read_file(&path, "rows") {
            Err(ReportError::InvalidRecord { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "release_year");
                assert_eq!(value, "twenty");
            }
            other => panic!("expected invalid record, got {other:?}"),
        }

        let path = write_csv(
            &dir,
            "types.csv",
            &format!("{HEADER}\ns1,Podcast,A,,,,,2020,,,,\n"),
        );
        assert!(matches!(
            CatalogReader::new().read_file(&path, "types"),
            Err(ReportError::InvalidRecord { row: 1, .. })
        ));
    }

    #[test]
    fn ragged_rows_surface_as_csv_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "ragged.csv", &format!("{HEADER}\ns1,Movie,A\n"));
        assert!(matches!(
            CatalogReader::new().read_file(&path, "ragged"),
            Err(ReportError::Csv(_))
        ));
    }

    #[test]
    fn writer_preserves_header_order_and_quotes_commas() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "in.csv",
            &format!("{HEADER}\ns9,Movie,T,,,\"India, France\",,1999,,,,\n"),
        );
        let table = CatalogReader::new().read_file(&path, "in").unwrap();
        let out = dir.path().join("nested").join("out.csv");
        CatalogWriter::new().write_file(&table, &out).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some(HEADER));
        assert_eq!(lines.next(), Some("s9,Movie,T,,,\"India, France\",,1999,,,,"));
    }
}
