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

pub mod aggregate;
pub mod cleaning;
pub mod common;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod render;
pub mod report;

pub use aggregate::{Aggregator, CatalogSummary, FrequencyTable, TypeShare, YearStats, YearlyCounts};
pub use cleaning::{Cleaner, CleaningReport, FillPlan, FillRule};
pub use common::{
    CatalogColumn, CatalogEntry, CatalogRecord, CatalogTable, CleanCatalog, ContentType,
    DatasetMetadata, RawCatalog, RawEntry,
};
pub use config::{ChartConfig, RankingConfig, ReportConfig};
pub use error::{ConfigError, ReportError, Result};
pub use io::{CatalogReader, CatalogWriter};
pub use pipeline::{run_report_pipeline, PipelineOutcome, ReportPipeline};
pub use render::ChartRenderer;

pub fn load_catalog<P: AsRef<std::path::Path>>(path: P, name: &str) -> Result<RawCatalog> {
    CatalogReader::new().read_file(path.as_ref(), name)
}

pub fn export_catalog<E: CatalogRecord, P: AsRef<std::path::Path>>(
    table: &CatalogTable<E>,
    path: P,
) -> Result<()> {
    CatalogWriter::new().write_file(table, path.as_ref())
}
