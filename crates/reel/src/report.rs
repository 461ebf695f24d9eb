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

//! Console report sections. Each function renders one block of text; the
//! pipeline decides where it goes.

use crate::aggregate::CatalogSummary;
use crate::cleaning::CleaningReport;
use crate::common::{CatalogColumn, CatalogRecord, CatalogTable, ColumnKind, ContentType};
use std::fmt::Write;

const RULE_WIDTH: usize = 40;
const PREVIEW_CELL_WIDTH: usize = 24;

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{rule}\n{title}\n{rule}")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let cut: String = value.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

pub fn loaded_line<E: CatalogRecord>(table: &CatalogTable<E>) -> String {
    format!(
        "Successfully loaded dataset: {} rows, {} columns",
        table.row_count(),
        table.column_count()
    )
}

pub fn preview<E: CatalogRecord>(table: &CatalogTable<E>, limit: usize) -> String {
    let mut out = String::new();
    let sample_size = limit.min(table.row_count());
    let header = table
        .columns()
        .iter()
        .map(|c| truncate(c, PREVIEW_CELL_WIDTH))
        .collect::<Vec<_>>()
        .join(" | ");
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.len()));
    for index in 0..sample_size {
        let Some(cells) = table.row_cells(index) else {
            break;
        };
        let row: Vec<String> = cells
            .iter()
            .map(|cell| truncate(cell.as_deref().unwrap_or("NULL"), PREVIEW_CELL_WIDTH))
            .collect();
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    if table.row_count() > sample_size {
        let _ = writeln!(out, "... ({} more rows)", table.row_count() - sample_size);
    }
    out
}

/// Per-column non-null counts and kinds.
pub fn column_info<E: CatalogRecord>(table: &CatalogTable<E>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset: {} ({})", table.metadata.name, table.metadata.id);
    let _ = writeln!(
        out,
        "{} entries, {} columns",
        table.row_count(),
        table.column_count()
    );
    let width = table.columns().iter().map(String::len).max().unwrap_or(0);
    for (name, nulls) in table.null_counts() {
        let kind = CatalogColumn::from_name(&name).map_or(ColumnKind::Text, CatalogColumn::kind);
        let _ = writeln!(
            out,
            "  {name:<width$}  {:>7} non-null  {kind}",
            table.row_count() - nulls
        );
    }
    out
}

pub fn missing_values<E: CatalogRecord>(table: &CatalogTable<E>) -> String {
    let mut out = String::new();
    let width = table.columns().iter().map(String::len).max().unwrap_or(0);
    for (name, nulls) in table.null_counts() {
        let _ = writeln!(out, "{name:<width$}  {nulls}");
    }
    out
}

pub fn cleaning_notes(report: &CleaningReport) -> String {
    let mut out = String::new();
    for mode in &report.modes {
        match &mode.value {
            Some(value) => {
                let _ = writeln!(
                    out,
                    "Most common {} for {}: {value}",
                    mode.column, mode.content_type
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "No {} values for {}; using the fallback",
                    mode.column, mode.content_type
                );
            }
        }
    }
    let _ = writeln!(out, "Filled {} missing values", report.total_filled());
    out
}

pub fn exploration(summary: &CatalogSummary, top_ratings: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Basic dataset statistics:");
    let _ = writeln!(out, "Total number of titles: {}", summary.total);

    let _ = writeln!(out, "\nContent breakdown:");
    for share in &summary.type_breakdown {
        let _ = writeln!(
            out,
            "{}: {} ({:.1}%)",
            share.content_type, share.count, share.percentage
        );
    }

    let _ = writeln!(out, "\nTop {top_ratings} ratings:");
    for (rating, count) in summary.top_ratings(top_ratings) {
        let _ = writeln!(out, "{rating}: {count}");
    }

    let _ = writeln!(out, "\nRelease year information:");
    match summary.release_years {
        Some(years) => {
            let _ = writeln!(out, "Oldest content: {}", years.min);
            let _ = writeln!(out, "Newest content: {}", years.max);
            let _ = writeln!(out, "Average release year: {:.1}", years.mean);
        }
        None => {
            let _ = writeln!(out, "No release years available");
        }
    }

    let _ = writeln!(out, "\nTop countries (handling multiple countries):");
    for (country, count) in &summary.top_countries {
        let _ = writeln!(out, "{country}: {count}");
    }
    out
}

pub fn closing_summary(summary: &CatalogSummary, top_genres: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dataset processed: {} titles", summary.total);
    let _ = writeln!(out, "Movies: {}", summary.count_of(ContentType::Movie));
    let _ = writeln!(out, "TV Shows: {}", summary.count_of(ContentType::TvShow));

    let _ = writeln!(out, "\nTop {top_genres} genres:");
    for (rank, (genre, count)) in summary.leading_genres(top_genres).iter().enumerate() {
        let _ = writeln!(out, "{}. {genre}: {count}", rank + 1);
    }

    if let Some((rating, count)) = summary.most_common_rating() {
        let _ = writeln!(out, "\nMost common rating: {rating} ({count} titles)");
    }
    out
}
