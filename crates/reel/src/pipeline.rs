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

use crate::aggregate::{Aggregator, CatalogSummary};
use crate::cleaning::{Cleaner, CleaningReport};
use crate::common::{CleanCatalog, RawCatalog};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::io::{CatalogReader, CatalogWriter};
use crate::render::ChartRenderer;
use crate::report;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug)]
pub struct PipelineOutcome {
    pub rows: usize,
    pub cleaned_path: PathBuf,
    pub charts: Vec<PathBuf>,
    pub summary: CatalogSummary,
}

/// Load, clean, aggregate, render and write, in that order. A failed load
/// stops the run.
pub struct ReportPipeline {
    config: ReportConfig,
    reader: CatalogReader,
    writer: CatalogWriter,
    cleaner: Cleaner,
    aggregator: Aggregator,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> Self {
        let aggregator = Aggregator::new(config.ranking.clone());
        Self {
            config,
            reader: CatalogReader::new(),
            writer: CatalogWriter::new(),
            cleaner: Cleaner::new(),
            aggregator,
        }
    }

    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn load(&self) -> Result<RawCatalog> {
        let path = &self.config.input_path;
        info!(path = %path.display(), "loading catalog");
        let table = self
            .reader
            .read_file(path, &self.config.dataset_name)
            .inspect_err(|e| error!(path = %path.display(), "{}", e.user_message()))?;
        println!("{}", report::loaded_line(&table));
        println!("\nFirst few rows:");
        print!("{}", report::preview(&table, self.config.preview_rows));
        println!("\nDataset info:");
        print!("{}", report::column_info(&table));
        Ok(table)
    }

    pub fn clean(&self, table: &RawCatalog) -> (CleanCatalog, CleaningReport) {
        println!("\n{}", report::banner("DATA CLEANING SECTION"));
        println!("Missing values before cleaning:");
        print!("{}", report::missing_values(table));

        let (cleaned, cleaning) = self.cleaner.clean(table);
        print!("{}", report::cleaning_notes(&cleaning));
        println!("\nMissing values after cleaning:");
        print!("{}", report::missing_values(&cleaned));
        info!(filled = cleaning.total_filled(), "cleaning finished");
        (cleaned, cleaning)
    }

    pub fn aggregate(&self, table: &CleanCatalog) -> CatalogSummary {
        println!("\n{}", report::banner("DATA EXPLORATION"));
        let summary = self.aggregator.summarize(table);
        print!(
            "{}",
            report::exploration(&summary, self.config.ranking.top_ratings)
        );
        summary
    }

    pub fn render(&self, summary: &CatalogSummary) -> Result<Vec<PathBuf>> {
        if !self.config.charts.enabled {
            info!("chart rendering disabled");
            return Ok(Vec::new());
        }
        println!("\n{}", report::banner("CREATING VISUALIZATIONS"));
        let renderer = ChartRenderer::new(
            self.config.charts.clone(),
            self.config.ranking.timeline_start_year,
        );
        let charts = renderer.render_all(summary)?;
        for chart in &charts {
            println!("Chart saved: {}", chart.display());
        }
        Ok(charts)
    }

    pub fn write(&self, table: &CleanCatalog, summary: &CatalogSummary) -> Result<PathBuf> {
        println!("\n{}", report::banner("ANALYSIS SUMMARY"));
        print!(
            "{}",
            report::closing_summary(summary, self.config.ranking.top_genres_summary)
        );
        let path = self.config.output_path.clone();
        self.writer.write_file(table, &path)?;
        println!("\nCleaned dataset saved as '{}'", path.display());
        info!(path = %path.display(), rows = table.row_count(), "cleaned catalog written");
        Ok(path)
    }

    pub fn run(&self) -> Result<PipelineOutcome> {
        println!("Starting catalog analysis...");
        println!("{}", "=".repeat(40));
        let raw = self.load()?;
        let (cleaned, _) = self.clean(&raw);
        let summary = self.aggregate(&cleaned);
        let charts = self.render(&summary)?;
        let cleaned_path = self.write(&cleaned, &summary)?;
        println!("Analysis complete!");
        Ok(PipelineOutcome {
            rows: cleaned.row_count(),
            cleaned_path,
            charts,
            summary,
        })
    }
}

pub fn run_report_pipeline(config: ReportConfig) -> Result<PipelineOutcome> {
    config.validate()?;
    ReportPipeline::new(config).run()
}
