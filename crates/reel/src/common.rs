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

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Columns every catalog file must provide. Anything else in the header is
/// carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogColumn {
    Type,
    Director,
    Cast,
    Country,
    DateAdded,
    ReleaseYear,
    Rating,
    Duration,
    ListedIn,
    Description,
}

impl CatalogColumn {
    pub const ALL: [CatalogColumn; 10] = [
        CatalogColumn::Type,
        CatalogColumn::Director,
        CatalogColumn::Cast,
        CatalogColumn::Country,
        CatalogColumn::DateAdded,
        CatalogColumn::ReleaseYear,
        CatalogColumn::Rating,
        CatalogColumn::Duration,
        CatalogColumn::ListedIn,
        CatalogColumn::Description,
    ];

    /// The columns the cleaner fills. `type` and `release_year` are required
    /// to be present on every row, so they never need imputation.
    pub const FILLABLE: [CatalogColumn; 8] = [
        CatalogColumn::Director,
        CatalogColumn::Cast,
        CatalogColumn::Country,
        CatalogColumn::DateAdded,
        CatalogColumn::Rating,
        CatalogColumn::Duration,
        CatalogColumn::ListedIn,
        CatalogColumn::Description,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CatalogColumn::Type => "type",
            CatalogColumn::Director => "director",
            CatalogColumn::Cast => "cast",
            CatalogColumn::Country => "country",
            CatalogColumn::DateAdded => "date_added",
            CatalogColumn::ReleaseYear => "release_year",
            CatalogColumn::Rating => "rating",
            CatalogColumn::Duration => "duration",
            CatalogColumn::ListedIn => "listed_in",
            CatalogColumn::Description => "description",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            CatalogColumn::Type => ColumnKind::Category,
            CatalogColumn::ReleaseYear => ColumnKind::Integer,
            _ => ColumnKind::Text,
        }
    }
}

impl fmt::Display for CatalogColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Category,
    Integer,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnKind::Category => write!(f, "category"),
            ColumnKind::Integer => write!(f, "int64"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
    Movie,
    TvShow,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Movie, ContentType::TvShow];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Movie => "Movie",
            ContentType::TvShow => "TV Show",
        }
    }

    /// Plural form used in chart legends.
    pub fn plural(self) -> &'static str {
        match self {
            ContentType::Movie => "Movies",
            ContentType::TvShow => "TV Shows",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Movie" => Ok(ContentType::Movie),
            "TV Show" => Ok(ContentType::TvShow),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

/// Splits a comma-joined multi-valued field such as `country` or `listed_in`.
pub fn split_multi_valued(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Blank content is a missing value. Populated fields are kept verbatim.
pub fn non_blank(field: &str) -> Option<String> {
    if field.trim().is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// Row-level access shared by raw and cleaned entries.
pub trait CatalogRecord {
    fn content_type(&self) -> ContentType;
    fn release_year(&self) -> i32;
    fn text(&self, column: CatalogColumn) -> Option<&str>;
    fn passthrough(&self) -> &[Option<String>];

    fn cell(&self, column: CatalogColumn) -> Option<Cow<'_, str>> {
        match column {
            CatalogColumn::Type => Some(Cow::Borrowed(self.content_type().as_str())),
            CatalogColumn::ReleaseYear => Some(Cow::Owned(self.release_year().to_string())),
            other => self.text(other).map(Cow::Borrowed),
        }
    }
}

/// An entry as read from disk, before any imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub content_type: ContentType,
    pub release_year: i32,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
    pub passthrough: Vec<Option<String>>,
}

impl RawEntry {
    pub fn new(content_type: ContentType, release_year: i32) -> Self {
        Self {
            content_type,
            release_year,
            director: None,
            cast: None,
            country: None,
            date_added: None,
            rating: None,
            duration: None,
            listed_in: None,
            description: None,
            passthrough: Vec::new(),
        }
    }

    pub fn slot_mut(&mut self, column: CatalogColumn) -> Option<&mut Option<String>> {
        match column {
            CatalogColumn::Director => Some(&mut self.director),
            CatalogColumn::Cast => Some(&mut self.cast),
            CatalogColumn::Country => Some(&mut self.country),
            CatalogColumn::DateAdded => Some(&mut self.date_added),
            CatalogColumn::Rating => Some(&mut self.rating),
            CatalogColumn::Duration => Some(&mut self.duration),
            CatalogColumn::ListedIn => Some(&mut self.listed_in),
            CatalogColumn::Description => Some(&mut self.description),
            CatalogColumn::Type | CatalogColumn::ReleaseYear => None,
        }
    }
}

impl CatalogRecord for RawEntry {
    fn content_type(&self) -> ContentType {
        self.content_type
    }
    fn release_year(&self) -> i32 {
        self.release_year
    }
    fn text(&self, column: CatalogColumn) -> Option<&str> {
        match column {
            CatalogColumn::Type => Some(self.content_type.as_str()),
            CatalogColumn::ReleaseYear => None,
            CatalogColumn::Director => self.director.as_deref(),
            CatalogColumn::Cast => self.cast.as_deref(),
            CatalogColumn::Country => self.country.as_deref(),
            CatalogColumn::DateAdded => self.date_added.as_deref(),
            CatalogColumn::Rating => self.rating.as_deref(),
            CatalogColumn::Duration => self.duration.as_deref(),
            CatalogColumn::ListedIn => self.listed_in.as_deref(),
            CatalogColumn::Description => self.description.as_deref(),
        }
    }
    fn passthrough(&self) -> &[Option<String>] {
        &self.passthrough
    }
}

/// An entry after cleaning. Every catalog field holds a value.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub content_type: ContentType,
    pub release_year: i32,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: String,
    pub rating: String,
    pub duration: String,
    pub listed_in: String,
    pub description: String,
    pub passthrough: Vec<Option<String>>,
}

impl CatalogEntry {
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        split_multi_valued(&self.country)
    }

    pub fn genres(&self) -> impl Iterator<Item = &str> {
        split_multi_valued(&self.listed_in)
    }
}

impl CatalogRecord for CatalogEntry {
    fn content_type(&self) -> ContentType {
        self.content_type
    }
    fn release_year(&self) -> i32 {
        self.release_year
    }
    fn text(&self, column: CatalogColumn) -> Option<&str> {
        match column {
            CatalogColumn::Type => Some(self.content_type.as_str()),
            CatalogColumn::ReleaseYear => None,
            CatalogColumn::Director => Some(&self.director),
            CatalogColumn::Cast => Some(&self.cast),
            CatalogColumn::Country => Some(&self.country),
            CatalogColumn::DateAdded => Some(&self.date_added),
            CatalogColumn::Rating => Some(&self.rating),
            CatalogColumn::Duration => Some(&self.duration),
            CatalogColumn::ListedIn => Some(&self.listed_in),
            CatalogColumn::Description => Some(&self.description),
        }
    }
    fn passthrough(&self) -> &[Option<String>] {
        &self.passthrough
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetId(String);
impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl AsRef<str> for DatasetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct DatasetMetadata {
    pub id: DatasetId,
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub created_at: DateTime<Utc>,
    pub source_path: Option<PathBuf>,
}

/// Where a header column's value lives on an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderSlot {
    Catalog(CatalogColumn),
    Passthrough(usize),
}

#[derive(Debug, Clone)]
pub struct CatalogTable<E> {
    pub metadata: DatasetMetadata,
    columns: Vec<String>,
    passthrough_columns: Vec<String>,
    entries: Vec<E>,
}

pub type RawCatalog = CatalogTable<RawEntry>;
pub type CleanCatalog = CatalogTable<CatalogEntry>;

impl<E: CatalogRecord> CatalogTable<E> {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        entries: Vec<E>,
        source_path: Option<PathBuf>,
    ) -> Self {
        let passthrough_columns = columns
            .iter()
            .filter(|c| CatalogColumn::from_name(c).is_none())
            .cloned()
            .collect();
        let metadata = DatasetMetadata {
            id: DatasetId::new(),
            name: name.into(),
            row_count: entries.len(),
            column_count: columns.len(),
            created_at: Utc::now(),
            source_path,
        };
        Self {
            metadata,
            columns,
            passthrough_columns,
            entries,
        }
    }

    pub fn row_count(&self) -> usize {
        self.entries.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn passthrough_columns(&self) -> &[String] {
        &self.passthrough_columns
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entries.iter()
    }

    /// Maps every header column to where its value lives on an entry.
    pub fn header_slots(&self) -> Vec<HeaderSlot> {
        let mut passthrough_index = 0;
        self.columns
            .iter()
            .map(|name| match CatalogColumn::from_name(name) {
                Some(column) => HeaderSlot::Catalog(column),
                None => {
                    let slot = HeaderSlot::Passthrough(passthrough_index);
                    passthrough_index += 1;
                    slot
                }
            })
            .collect()
    }

    /// Value of row `index` under each header column, in header order.
    pub fn row_cells(&self, index: usize) -> Option<Vec<Option<Cow<'_, str>>>> {
        let entry = self.entries.get(index)?;
        Some(
            self.header_slots()
                .into_iter()
                .map(|slot| match slot {
                    HeaderSlot::Catalog(column) => entry.cell(column),
                    HeaderSlot::Passthrough(i) => entry
                        .passthrough()
                        .get(i)
                        .and_then(|v| v.as_deref())
                        .map(Cow::Borrowed),
                })
                .collect(),
        )
    }

    /// Missing values per header column, in header order.
    pub fn null_counts(&self) -> Vec<(String, usize)> {
        let slots = self.header_slots();
        self.columns
            .iter()
            .zip(slots)
            .map(|(name, slot)| {
                let nulls = self
                    .entries
                    .iter()
                    .filter(|entry| match slot {
                        HeaderSlot::Catalog(column) => entry.cell(column).is_none(),
                        HeaderSlot::Passthrough(i) => {
                            !matches!(entry.passthrough().get(i), Some(Some(_)))
                        }
                    })
                    .count();
                (name.clone(), nulls)
            })
            .collect()
    }

    /// Same header over new entries; the metadata gets a fresh dataset id.
    pub fn with_entries<T: CatalogRecord>(&self, entries: Vec<T>) -> CatalogTable<T> {
        let mut metadata = self.metadata.clone();
        metadata.id = DatasetId::new();
        metadata.row_count = entries.len();
        metadata.created_at = Utc::now();
        CatalogTable {
            metadata,
            columns: self.columns.clone(),
            passthrough_columns: self.passthrough_columns.clone(),
            entries,
        }
    }
}
