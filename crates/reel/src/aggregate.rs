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

use crate::common::{CatalogEntry, CleanCatalog, ContentType};
use crate::config::RankingConfig;
use indexmap::IndexMap;
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Occurrence counts that remember the order values were first seen, so
/// rankings break ties deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tally(&mut self, value: &str) {
        match self.counts.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(value.to_string(), 1);
            }
        }
    }

    pub fn get(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Most frequent value; the earliest seen wins a tie.
    pub fn mode(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (value, &count) in &self.counts {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((value, count)),
            }
        }
        best.map(|(value, _)| value)
    }

    /// All values by descending count, stable on first-seen order.
    pub fn ranked(&self) -> Vec<(String, usize)> {
        self.counts
            .iter()
            .sorted_by(|a, b| b.1.cmp(a.1))
            .map(|(value, count)| (value.clone(), *count))
            .collect()
    }

    pub fn most_common(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for value in iter {
            table.tally(value);
        }
        table
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeShare {
    pub content_type: ContentType,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearStats {
    pub min: i32,
    pub max: i32,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearlyCounts {
    pub year: i32,
    pub movies: usize,
    pub tv_shows: usize,
}

impl YearlyCounts {
    pub fn count(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Movie => self.movies,
            ContentType::TvShow => self.tv_shows,
        }
    }

    pub fn total(&self) -> usize {
        self.movies + self.tv_shows
    }
}

pub fn type_breakdown(entries: &[CatalogEntry]) -> Vec<TypeShare> {
    let total = entries.len();
    let counts: FrequencyTable = entries.iter().map(|e| e.content_type.as_str()).collect();
    counts
        .ranked()
        .into_iter()
        .filter_map(|(name, count)| {
            let content_type = name.parse().ok()?;
            Some(TypeShare {
                content_type,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
        })
        .collect()
}

pub fn rating_frequency(entries: &[CatalogEntry]) -> FrequencyTable {
    entries.iter().map(|e| e.rating.as_str()).collect()
}

pub fn country_frequency(entries: &[CatalogEntry]) -> FrequencyTable {
    entries.iter().flat_map(CatalogEntry::countries).collect()
}

pub fn genre_frequency(entries: &[CatalogEntry]) -> FrequencyTable {
    entries.iter().flat_map(CatalogEntry::genres).collect()
}

pub fn release_year_stats(entries: &[CatalogEntry]) -> Option<YearStats> {
    let min = entries.iter().map(|e| e.release_year).min()?;
    let max = entries.iter().map(|e| e.release_year).max()?;
    let sum: i64 = entries.iter().map(|e| i64::from(e.release_year)).sum();
    Some(YearStats {
        min,
        max,
        mean: sum as f64 / entries.len() as f64,
    })
}

/// Titles per release year split by type, for years at or after
/// `start_year`. A year that only has one type reports zero for the other.
pub fn yearly_counts(entries: &[CatalogEntry], start_year: i32) -> Vec<YearlyCounts> {
    let mut by_year: BTreeMap<i32, YearlyCounts> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.release_year >= start_year) {
        let counts = by_year.entry(entry.release_year).or_insert(YearlyCounts {
            year: entry.release_year,
            ..YearlyCounts::default()
        });
        match entry.content_type {
            ContentType::Movie => counts.movies += 1,
            ContentType::TvShow => counts.tv_shows += 1,
        }
    }
    by_year.into_values().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub total: usize,
    pub type_breakdown: Vec<TypeShare>,
    /// Every rating, most common first.
    pub ratings: Vec<(String, usize)>,
    pub release_years: Option<YearStats>,
    pub top_countries: Vec<(String, usize)>,
    pub top_genres: Vec<(String, usize)>,
    pub timeline: Vec<YearlyCounts>,
}

impl CatalogSummary {
    pub fn count_of(&self, content_type: ContentType) -> usize {
        self.type_breakdown
            .iter()
            .find(|share| share.content_type == content_type)
            .map_or(0, |share| share.count)
    }

    pub fn top_ratings(&self, n: usize) -> &[(String, usize)] {
        &self.ratings[..n.min(self.ratings.len())]
    }

    pub fn leading_genres(&self, n: usize) -> &[(String, usize)] {
        &self.top_genres[..n.min(self.top_genres.len())]
    }

    pub fn most_common_rating(&self) -> Option<&(String, usize)> {
        self.ratings.first()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    ranking: RankingConfig,
}

impl Aggregator {
    pub fn new(ranking: RankingConfig) -> Self {
        Self { ranking }
    }

    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    pub fn summarize(&self, table: &CleanCatalog) -> CatalogSummary {
        let entries = table.entries();
        if entries.is_empty() {
            warn!(dataset = %table.metadata.name, "summarising an empty catalog");
        }
        let summary = CatalogSummary {
            total: entries.len(),
            type_breakdown: type_breakdown(entries),
            ratings: rating_frequency(entries).ranked(),
            release_years: release_year_stats(entries),
            top_countries: country_frequency(entries).most_common(self.ranking.top_countries),
            top_genres: genre_frequency(entries).most_common(self.ranking.top_genres_chart),
            timeline: yearly_counts(entries, self.ranking.timeline_start_year),
        };
        debug!(
            ratings = summary.ratings.len(),
            countries = summary.top_countries.len(),
            genres = summary.top_genres.len(),
            years = summary.timeline.len(),
            "aggregated catalog"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(content_type: ContentType, year: i32, country: &str, genres: &str) -> CatalogEntry {
        CatalogEntry {
            content_type,
            release_year: year,
            director: "d".into(),
            cast: "c".into(),
            country: country.into(),
            date_added: "Date Unknown".into(),
            rating: "TV-MA".into(),
            duration: "90 min".into(),
            listed_in: genres.into(),
            description: "x".into(),
            passthrough: Vec::new(),
        }
    }

    #[test]
    fn multi_country_entries_count_once_per_country() {
        let entries = vec![
            entry(ContentType::Movie, 2020, "USA, India", "Dramas"),
            entry(ContentType::Movie, 2020, "USA", "Dramas"),
        ];
        let countries = country_frequency(&entries);
        assert_eq!(countries.get("USA"), 2);
        assert_eq!(countries.get("India"), 1);
        assert_eq!(countries.total(), 3);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let table: FrequencyTable = ["b", "a", "c", "a", "c", "d"].into_iter().collect();
        assert_eq!(
            table.ranked(),
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
        assert_eq!(table.most_common(3).len(), 3);
        assert_eq!(table.most_common(10).len(), 4);
        assert_eq!(table.mode(), Some("a"));
        assert_eq!(FrequencyTable::new().mode(), None);
    }

    #[test]
    fn type_breakdown_orders_by_count() {
        let entries = vec![
            entry(ContentType::Movie, 2001, "A", "G"),
            entry(ContentType::TvShow, 2002, "A", "G"),
            entry(ContentType::TvShow, 2003, "A", "G"),
        ];
        let shares = type_breakdown(&entries);
        assert_eq!(shares[0].content_type, ContentType::TvShow);
        assert_eq!(shares[0].count, 2);
        assert!((shares[1].percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn release_years_summarise_min_max_mean() {
        let entries = vec![
            entry(ContentType::Movie, 1990, "A", "G"),
            entry(ContentType::Movie, 2000, "A", "G"),
            entry(ContentType::Movie, 2020, "A", "G"),
        ];
        let stats = release_year_stats(&entries).unwrap();
        assert_eq!(stats.min, 1990);
        assert_eq!(stats.max, 2020);
        assert!((stats.mean - 2003.333_333).abs() < 1e-3);
        assert_eq!(release_year_stats(&[]), None);
    }

    #[test]
    fn timeline_starts_at_the_cutoff_and_zero_fills() {
        let entries = vec![
            entry(ContentType::Movie, 1999, "A", "G"),
            entry(ContentType::Movie, 2000, "A", "G"),
            entry(ContentType::TvShow, 2005, "A", "G"),
            entry(ContentType::Movie, 2005, "A", "G"),
            entry(ContentType::TvShow, 2003, "A", "G"),
        ];
        let timeline = yearly_counts(&entries, 2000);
        assert_eq!(
            timeline,
            vec![
                YearlyCounts { year: 2000, movies: 1, tv_shows: 0 },
                YearlyCounts { year: 2003, movies: 0, tv_shows: 1 },
                YearlyCounts { year: 2005, movies: 1, tv_shows: 1 },
            ]
        );
    }

    #[test]
    fn summary_applies_ranking_sizes() {
        let entries: Vec<CatalogEntry> = (0..20)
            .map(|i| entry(ContentType::Movie, 2010, &format!("C{i}"), &format!("G{i}, Dramas")))
            .collect();
        let columns = crate::common::CatalogColumn::ALL
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let table = CleanCatalog::new("t", columns, entries, None);
        let summary = Aggregator::default().summarize(&table);
        assert_eq!(summary.top_countries.len(), 10);
        assert_eq!(summary.top_genres.len(), 15);
        assert_eq!(summary.top_genres[0], ("Dramas".to_string(), 20));
        assert_eq!(summary.leading_genres(5).len(), 5);
        assert_eq!(summary.most_common_rating(), Some(&("TV-MA".to_string(), 20)));
        assert_eq!(summary.count_of(ContentType::TvShow), 0);
    }

    proptest! {
        #[test]
        fn type_percentages_sum_to_one_hundred(kinds in proptest::collection::vec(any::<bool>(), 1..200)) {
            let entries: Vec<CatalogEntry> = kinds
                .iter()
                .map(|movie| {
                    let ty = if *movie { ContentType::Movie } else { ContentType::TvShow };
                    entry(ty, 2015, "A", "G")
                })
                .collect();
            let total: f64 = type_breakdown(&entries).iter().map(|s| s.percentage).sum();
            prop_assert!((total - 100.0).abs() < 1e-6);
        }

        #[test]
        fn most_common_is_bounded_and_sorted(
            values in proptest::collection::vec("[a-e]", 0..60),
            n in 0usize..8,
        ) {
            let table: FrequencyTable = values.iter().map(String::as_str).collect();
            let top = table.most_common(n);
            prop_assert_eq!(top.len(), n.min(table.len()));
            prop_assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
            prop_assert_eq!(table.total(), values.len());
        }
    }
}
