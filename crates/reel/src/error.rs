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

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Could not find the dataset file '{}'", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("Schema mismatch in '{}': missing column(s) {}", .path.display(), .missing.join(", "))]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },
    #[error("Invalid value '{value}' for column '{column}' on row {row}")]
    InvalidRecord {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Failed to write '{}': {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to render chart '{chart}': {reason}")]
    RenderFailure { chart: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{}': {source}", .path.display())]
    ConfigFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML configuration: {source}")]
    TomlParseError {
        #[from]
        source: toml::de::Error,
    },
    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ReportError {
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub fn render_failure(chart: &str, reason: impl ToString) -> Self {
        ReportError::RenderFailure {
            chart: chart.to_string(),
            reason: reason.to_string(),
        }
    }

    /// A missing input is the only condition a caller can fix and retry;
    /// everything else means the data or the environment is broken.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::FileNotFound { .. })
    }

    pub fn category(&self) -> &'static str {
        match self {
            ReportError::FileNotFound { .. } => "Input",
            ReportError::SchemaMismatch { .. } | ReportError::InvalidRecord { .. } => "Data",
            ReportError::WriteFailure { .. } => "Output",
            ReportError::RenderFailure { .. } => "Chart",
            ReportError::Config(_) => "Configuration",
            ReportError::Csv(_) => "CSV",
            ReportError::Io(_) => "I/O",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ReportError::FileNotFound { path } => format!(
                "Error: Could not find the dataset file! Expected it at '{}'.",
                path.display()
            ),
            ReportError::SchemaMismatch { missing, .. } => format!(
                "The dataset does not look like a catalog export; it lacks {}.",
                missing.join(", ")
            ),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_input_is_recoverable() {
        let missing = ReportError::FileNotFound {
            path: PathBuf::from("data/none.csv"),
        };
        assert!(missing.is_recoverable());
        assert_eq!(missing.category(), "Input");

        let schema = ReportError::SchemaMismatch {
            path: PathBuf::from("a.csv"),
            missing: vec!["rating".into(), "duration".into()],
        };
        assert!(!schema.is_recoverable());
        assert!(schema.to_string().contains("rating, duration"));
        assert!(schema.user_message().contains("rating, duration"));
    }

    #[test]
    fn write_failure_keeps_path_and_source() {
        let err = ReportError::write_failure(
            "out/cleaned.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.category(), "Output");
        assert!(err.to_string().contains("out/cleaned.csv"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
