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

use crate::aggregate::FrequencyTable;
use crate::common::{
    CatalogColumn, CatalogEntry, CatalogRecord, CleanCatalog, ContentType, RawCatalog, RawEntry,
};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum FillRule {
    Constant(String),
    /// Most frequent value among rows of the same content type, else the
    /// fallback constant.
    ModeByType { fallback: String },
}

impl FillRule {
    pub fn constant(value: &str) -> Self {
        FillRule::Constant(value.to_string())
    }

    pub fn mode_by_type(fallback: &str) -> Self {
        FillRule::ModeByType {
            fallback: fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPlan {
    pub director: FillRule,
    pub cast: FillRule,
    pub country: FillRule,
    pub date_added: FillRule,
    pub rating: FillRule,
    pub duration: FillRule,
    pub listed_in: FillRule,
    pub description: FillRule,
}

impl Default for FillPlan {
    fn default() -> Self {
        Self {
            director: FillRule::constant("No Director Listed"),
            cast: FillRule::constant("No Cast Info"),
            country: FillRule::constant("Country Not Specified"),
            date_added: FillRule::constant("Date Unknown"),
            rating: FillRule::constant("Not Rated"),
            duration: FillRule::mode_by_type("Duration Unknown"),
            listed_in: FillRule::constant("Genre Not Listed"),
            description: FillRule::constant("No description available"),
        }
    }
}

impl FillPlan {
    pub fn rule(&self, column: CatalogColumn) -> Option<&FillRule> {
        match column {
            CatalogColumn::Director => Some(&self.director),
            CatalogColumn::Cast => Some(&self.cast),
            CatalogColumn::Country => Some(&self.country),
            CatalogColumn::DateAdded => Some(&self.date_added),
            CatalogColumn::Rating => Some(&self.rating),
            CatalogColumn::Duration => Some(&self.duration),
            CatalogColumn::ListedIn => Some(&self.listed_in),
            CatalogColumn::Description => Some(&self.description),
            CatalogColumn::Type | CatalogColumn::ReleaseYear => None,
        }
    }
}

/// Mode picked for one (column, content type) pair. `value` is `None` when
/// no row of that type had the column populated.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedMode {
    pub column: CatalogColumn,
    pub content_type: ContentType,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFill {
    pub nulls: usize,
    pub from_mode: usize,
    pub from_constant: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CleaningReport {
    pub fills: Vec<(CatalogColumn, ColumnFill)>,
    pub modes: Vec<ImputedMode>,
}

impl CleaningReport {
    pub fn fill(&self, column: CatalogColumn) -> Option<&ColumnFill> {
        self.fills.iter().find(|(c, _)| *c == column).map(|(_, f)| f)
    }

    pub fn mode(&self, column: CatalogColumn, content_type: ContentType) -> Option<&str> {
        self.modes
            .iter()
            .find(|m| m.column == column && m.content_type == content_type)
            .and_then(|m| m.value.as_deref())
    }

    pub fn total_filled(&self) -> usize {
        self.fills.iter().map(|(_, f)| f.nulls).sum()
    }
}

#[derive(Debug, Default)]
pub struct Cleaner {
    plan: FillPlan,
}

impl Cleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: FillPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &FillPlan {
        &self.plan
    }

    /// Produces a new table in which every catalog column holds a value.
    /// The input is left untouched.
    pub fn clean(&self, table: &RawCatalog) -> (CleanCatalog, CleaningReport) {
        let modes = self.compute_modes(table);
        let mut fills: HashMap<CatalogColumn, ColumnFill> = HashMap::new();
        let lookup: HashMap<(CatalogColumn, ContentType), &str> = modes
            .iter()
            .filter_map(|m| m.value.as_deref().map(|v| ((m.column, m.content_type), v)))
            .collect();

        let entries: Vec<CatalogEntry> = table
            .iter()
            .map(|entry| {
                let mut fill = |column: CatalogColumn, rule: &FillRule| -> String {
                    if let Some(value) = entry.text(column) {
                        return value.to_string();
                    }
                    let stats = fills.entry(column).or_default();
                    stats.nulls += 1;
                    match rule {
                        FillRule::Constant(value) => {
                            stats.from_constant += 1;
                            value.clone()
                        }
                        FillRule::ModeByType { fallback } => {
                            match lookup.get(&(column, entry.content_type)) {
                                Some(mode) => {
                                    stats.from_mode += 1;
                                    (*mode).to_string()
                                }
                                None => {
                                    stats.from_constant += 1;
                                    fallback.clone()
                                }
                            }
                        }
                    }
                };
                let plan = &self.plan;
                CatalogEntry {
                    content_type: entry.content_type,
                    release_year: entry.release_year,
                    director: fill(CatalogColumn::Director, &plan.director),
                    cast: fill(CatalogColumn::Cast, &plan.cast),
                    country: fill(CatalogColumn::Country, &plan.country),
                    date_added: fill(CatalogColumn::DateAdded, &plan.date_added),
                    rating: fill(CatalogColumn::Rating, &plan.rating),
                    duration: fill(CatalogColumn::Duration, &plan.duration),
                    listed_in: fill(CatalogColumn::ListedIn, &plan.listed_in),
                    description: fill(CatalogColumn::Description, &plan.description),
                    passthrough: entry.passthrough.clone(),
                }
            })
            .collect();

        let report = CleaningReport {
            fills: CatalogColumn::FILLABLE
                .iter()
                .map(|c| (*c, fills.remove(c).unwrap_or_default()))
                .collect(),
            modes,
        };
        debug!(
            rows = entries.len(),
            filled = report.total_filled(),
            "cleaned catalog"
        );
        (table.with_entries(entries), report)
    }

    fn compute_modes(&self, table: &RawCatalog) -> Vec<ImputedMode> {
        let mut modes = Vec::new();
        for column in CatalogColumn::FILLABLE {
            if !matches!(self.plan.rule(column), Some(FillRule::ModeByType { .. })) {
                continue;
            }
            for content_type in ContentType::ALL {
                let value = type_mode(table.entries(), column, content_type);
                if value.is_none() && has_nulls(table.entries(), column, content_type) {
                    warn!(
                        %column,
                        %content_type,
                        "no populated values to impute from, using the fallback"
                    );
                }
                modes.push(ImputedMode {
                    column,
                    content_type,
                    value,
                });
            }
        }
        modes
    }
}

fn type_mode(entries: &[RawEntry], column: CatalogColumn, content_type: ContentType) -> Option<String> {
    entries
        .iter()
        .filter(|e| e.content_type == content_type)
        .filter_map(|e| e.text(column))
        .collect::<FrequencyTable>()
        .mode()
        .map(str::to_string)
}

fn has_nulls(entries: &[RawEntry], column: CatalogColumn, content_type: ContentType) -> bool {
    entries
        .iter()
        .any(|e| e.content_type == content_type && e.text(column).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(content_type: ContentType, duration: Option<&str>) -> RawEntry {
        let mut e = RawEntry::new(content_type, 2019);
        e.duration = duration.map(str::to_string);
        e
    }

    fn table(entries: Vec<RawEntry>) -> RawCatalog {
        let columns = CatalogColumn::ALL.iter().map(|c| c.name().to_string()).collect();
        RawCatalog::new("test", columns, entries, None)
    }

    #[test]
    fn constant_rules_fill_every_missing_field() {
        let raw = table(vec![entry(ContentType::Movie, Some("90 min"))]);
        let (clean, report) = Cleaner::new().clean(&raw);
        let e = &clean.entries()[0];
        assert_eq!(e.director, "No Director Listed");
        assert_eq!(e.cast, "No Cast Info");
        assert_eq!(e.country, "Country Not Specified");
        assert_eq!(e.date_added, "Date Unknown");
        assert_eq!(e.rating, "Not Rated");
        assert_eq!(e.duration, "90 min");
        assert_eq!(e.listed_in, "Genre Not Listed");
        assert_eq!(e.description, "No description available");
        assert_eq!(report.fill(CatalogColumn::Director).unwrap().nulls, 1);
        assert_eq!(report.fill(CatalogColumn::Duration).unwrap().nulls, 0);
        assert_eq!(report.total_filled(), 7);
    }

    #[test]
    fn duration_uses_mode_of_the_same_type() {
        let raw = table(vec![
            entry(ContentType::Movie, Some("90 min")),
            entry(ContentType::Movie, Some("100 min")),
            entry(ContentType::Movie, Some("100 min")),
            entry(ContentType::Movie, None),
            entry(ContentType::TvShow, Some("1 Season")),
            entry(ContentType::TvShow, None),
        ]);
        let (clean, report) = Cleaner::new().clean(&raw);
        assert_eq!(clean.entries()[3].duration, "100 min");
        assert_eq!(clean.entries()[5].duration, "1 Season");
        assert_eq!(
            report.mode(CatalogColumn::Duration, ContentType::Movie),
            Some("100 min")
        );
        let fill = report.fill(CatalogColumn::Duration).unwrap();
        assert_eq!(fill.from_mode, 2);
        assert_eq!(fill.from_constant, 0);
    }

    #[test]
    fn mode_ties_go_to_the_first_value_seen() {
        let raw = table(vec![
            entry(ContentType::Movie, Some("95 min")),
            entry(ContentType::Movie, Some("80 min")),
            entry(ContentType::Movie, Some("80 min")),
            entry(ContentType::Movie, Some("95 min")),
            entry(ContentType::Movie, None),
        ]);
        let (clean, _) = Cleaner::new().clean(&raw);
        assert_eq!(clean.entries()[4].duration, "95 min");
    }

    #[test]
    fn type_without_durations_falls_back() {
        let raw = table(vec![
            entry(ContentType::Movie, Some("90 min")),
            entry(ContentType::TvShow, None),
        ]);
        let (clean, report) = Cleaner::new().clean(&raw);
        assert_eq!(clean.entries()[1].duration, "Duration Unknown");
        assert_eq!(report.mode(CatalogColumn::Duration, ContentType::TvShow), None);
        assert_eq!(report.fill(CatalogColumn::Duration).unwrap().from_constant, 1);
    }

    #[test]
    fn cleaning_leaves_the_source_table_untouched() {
        let raw = table(vec![entry(ContentType::Movie, None)]);
        let (clean, _) = Cleaner::new().clean(&raw);
        assert_eq!(raw.entries()[0].duration, None);
        assert_eq!(raw.entries()[0].rating, None);
        assert_eq!(clean.row_count(), raw.row_count());
        assert!(clean
            .null_counts()
            .iter()
            .all(|(_, nulls)| *nulls == 0));
    }

    #[test]
    fn custom_plan_overrides_a_single_column() {
        let plan = FillPlan {
            rating: FillRule::constant("Unrated"),
            ..FillPlan::default()
        };
        let raw = table(vec![entry(ContentType::TvShow, None)]);
        let (clean, _) = Cleaner::with_plan(plan).clean(&raw);
        assert_eq!(clean.entries()[0].rating, "Unrated");
        assert_eq!(clean.entries()[0].cast, "No Cast Info");
    }
}
