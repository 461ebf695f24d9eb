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

use crate::error::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_DPI: u32 = 1200;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub dataset_name: String,
    pub preview_rows: usize,
    pub charts: ChartConfig,
    pub ranking: RankingConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub dpi: u32,
    pub genres_file: String,
    pub ratings_file: String,
    pub timeline_file: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    pub top_ratings: usize,
    pub top_countries: usize,
    pub top_genres_chart: usize,
    pub top_genres_summary: usize,
    pub timeline_start_year: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/Netflix_shows_movies.csv"),
            output_path: PathBuf::from("data/Netflix_shows_movies_cleaned.csv"),
            dataset_name: "Netflix Shows and Movies".to_string(),
            preview_rows: 5,
            charts: ChartConfig::default(),
            ranking: RankingConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("charts"),
            dpi: 300,
            genres_file: "netflix_genres_chart.png".to_string(),
            ratings_file: "netflix_ratings_chart.png".to_string(),
            timeline_file: "netflix_timeline.png".to_string(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_ratings: 10,
            top_countries: 10,
            top_genres_chart: 15,
            top_genres_summary: 5,
            timeline_start_year: 2000,
        }
    }
}

impl ChartConfig {
    pub fn genres_path(&self) -> PathBuf {
        self.directory.join(&self.genres_file)
    }
    pub fn ratings_path(&self) -> PathBuf {
        self.directory.join(&self.ratings_file)
    }
    pub fn timeline_path(&self) -> PathBuf {
        self.directory.join(&self.timeline_file)
    }
}

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ReportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileError {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.charts.dpi == 0 || self.charts.dpi > MAX_DPI {
            return Err(invalid("charts.dpi", self.charts.dpi));
        }
        let ranking = &self.ranking;
        for (field, value) in [
            ("ranking.top_ratings", ranking.top_ratings),
            ("ranking.top_countries", ranking.top_countries),
            ("ranking.top_genres_chart", ranking.top_genres_chart),
            ("ranking.top_genres_summary", ranking.top_genres_summary),
        ] {
            if value == 0 {
                return Err(invalid(field, value));
            }
        }
        // The summary lists genres from the charted ranking.
        if ranking.top_genres_summary > ranking.top_genres_chart {
            return Err(invalid(
                "ranking.top_genres_summary",
                ranking.top_genres_summary,
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
