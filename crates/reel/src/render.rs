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

use crate::aggregate::{CatalogSummary, YearlyCounts};
use crate::config::ChartConfig;
use crate::error::{ReportError, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// Figure sizes in inches; pixel size is inches times DPI.
pub const GENRES_FIGURE: (f64, f64) = (12.0, 8.0);
pub const RATINGS_FIGURE: (f64, f64) = (15.0, 6.0);
pub const TIMELINE_FIGURE: (f64, f64) = (12.0, 6.0);

pub fn figure_pixels(inches: (f64, f64), dpi: u32) -> (u32, u32) {
    let dpi = f64::from(dpi);
    ((inches.0 * dpi).round() as u32, (inches.1 * dpi).round() as u32)
}

/// Horizontal bars, bottom to top: the most common genre ends up on top.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreBars {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl GenreBars {
    pub fn from_ranked(ranked: &[(String, usize)]) -> Self {
        let (labels, counts) = ranked.iter().rev().cloned().unzip();
        Self { labels, counts }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlices {
    pub labels: Vec<String>,
    pub sizes: Vec<f64>,
    pub percentages: Vec<f64>,
}

impl PieSlices {
    pub fn from_ranked(ranked: &[(String, usize)]) -> Self {
        let total: usize = ranked.iter().map(|(_, c)| c).sum();
        let labels = ranked.iter().map(|(label, _)| label.clone()).collect();
        let sizes: Vec<f64> = ranked.iter().map(|(_, c)| *c as f64).collect();
        let percentages = sizes
            .iter()
            .map(|s| if total == 0 { 0.0 } else { s / total as f64 * 100.0 })
            .collect();
        Self {
            labels,
            sizes,
            percentages,
        }
    }
}

/// One x position of the stacked area chart: movies fill `0..movies`,
/// TV shows fill `movies..total`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedPoint {
    pub year: i32,
    pub movies: f64,
    pub total: f64,
}

pub fn stacked_bands(timeline: &[YearlyCounts]) -> Vec<StackedPoint> {
    timeline
        .iter()
        .map(|counts| StackedPoint {
            year: counts.year,
            movies: counts.movies as f64,
            total: counts.total() as f64,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ChartRenderer {
    config: ChartConfig,
    timeline_start_year: i32,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig, timeline_start_year: i32) -> Self {
        Self {
            config,
            timeline_start_year,
        }
    }

    /// Draws the three charts and returns the paths written. Every chart is
    /// written; one with no data keeps its axes and title.
    pub fn render_all(&self, summary: &CatalogSummary) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.config.directory)
            .map_err(|e| ReportError::write_failure(&self.config.directory, e))?;

        let genres = GenreBars::from_ranked(&summary.top_genres);
        if genres.is_empty() {
            warn!("no genres to chart");
        }
        let genres_path = self.config.genres_path();
        self.draw_genres(&genres_path, &genres)?;
        info!(path = %genres_path.display(), "genre chart saved");

        if summary.ratings.is_empty() {
            warn!("no ratings to chart");
        }
        let ratings_path = self.config.ratings_path();
        self.draw_ratings(&ratings_path, &summary.ratings)?;
        info!(path = %ratings_path.display(), "ratings chart saved");

        let bands = stacked_bands(&summary.timeline);
        if bands.is_empty() {
            warn!(
                start_year = self.timeline_start_year,
                "no titles released in the timeline window"
            );
        }
        let timeline_path = self.config.timeline_path();
        self.draw_timeline(&timeline_path, &bands)?;
        info!(path = %timeline_path.display(), "timeline chart saved");

        Ok(vec![genres_path, ratings_path, timeline_path])
    }

    /// Converts a point size to pixels at the configured DPI.
    #[cfg(feature = "charts")]
    fn pt(&self, points: f64) -> f64 {
        points * f64::from(self.config.dpi) / 72.0
    }

    #[cfg(feature = "charts")]
    fn px(&self, points: f64) -> u32 {
        self.pt(points).round() as u32
    }
}

#[cfg(feature = "charts")]
mod draw {
    use super::{
        figure_pixels, ChartRenderer, GenreBars, PieSlices, StackedPoint, GENRES_FIGURE,
        RATINGS_FIGURE, TIMELINE_FIGURE,
    };
    use crate::error::{ReportError, Result};
    use plotters::element::Pie;
    use plotters::prelude::*;
    use plotters::style::text_anchor::{HPos, Pos, VPos};
    use plotters::style::Palette;
    use std::path::Path;

    type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

    const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
    const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
    const MOVIE_COLOR: RGBColor = RGBColor(247, 112, 136);
    const TV_COLOR: RGBColor = RGBColor(51, 176, 122);

    fn palette_color(index: usize) -> RGBColor {
        let (r, g, b) = Palette99::COLORS[index % Palette99::COLORS.len()];
        RGBColor(r, g, b)
    }

    impl ChartRenderer {
        pub(super) fn draw_genres(&self, path: &Path, bars: &GenreBars) -> Result<()> {
            self.genres_chart(path, bars)
                .map_err(|e| ReportError::render_failure("genres", e))
        }

        pub(super) fn draw_ratings(&self, path: &Path, ratings: &[(String, usize)]) -> Result<()> {
            self.ratings_chart(path, ratings)
                .map_err(|e| ReportError::render_failure("ratings", e))
        }

        pub(super) fn draw_timeline(&self, path: &Path, bands: &[StackedPoint]) -> Result<()> {
            self.timeline_chart(path, bands)
                .map_err(|e| ReportError::render_failure("timeline", e))
        }

        fn genres_chart(&self, path: &Path, bars: &GenreBars) -> DrawResult {
            let size = figure_pixels(GENRES_FIGURE, self.config.dpi);
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;

            let n = bars.labels.len();
            let rows = n.max(1);
            let x_max = bars.max_count() + bars.max_count() / 8 + 1;
            let gap = (x_max / 100).max(1);
            let title = ("sans-serif", self.pt(14.0))
                .into_font()
                .style(FontStyle::Bold);
            let mut chart = ChartBuilder::on(&root)
                .caption(format!("Top {n} Most Common Genres on Netflix"), title)
                .margin(self.px(10.0))
                .x_label_area_size(self.px(30.0))
                .y_label_area_size(self.px(150.0))
                .build_cartesian_2d(0usize..x_max, (0usize..rows).into_segmented())?;

            let label_for = |v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => bars.labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(rows)
                .y_label_formatter(&label_for)
                .x_desc("Number of Titles")
                .y_desc("Genres")
                .label_style(("sans-serif", self.pt(10.0)))
                .axis_desc_style(("sans-serif", self.pt(11.0)))
                .draw()?;

            let inset = self.px(3.0);
            chart.draw_series(bars.counts.iter().enumerate().map(|(i, &count)| {
                let mut bar = Rectangle::new(
                    [(0, SegmentValue::Exact(i)), (count, SegmentValue::Exact(i + 1))],
                    BAR_BLUE.filled(),
                );
                bar.set_margin(inset, inset, 0, 0);
                bar
            }))?;
            let value_style = TextStyle::from(("sans-serif", self.pt(10.0)).into_font())
                .pos(Pos::new(HPos::Left, VPos::Center));
            chart.draw_series(bars.counts.iter().enumerate().map(|(i, &count)| {
                Text::new(
                    count.to_string(),
                    (count + gap, SegmentValue::CenterOf(i)),
                    value_style.clone(),
                )
            }))?;
            root.present()?;
            Ok(())
        }

        fn ratings_chart(&self, path: &Path, ratings: &[(String, usize)]) -> DrawResult {
            let size = figure_pixels(RATINGS_FIGURE, self.config.dpi);
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;
            let (left, right) = root.split_horizontally(size.0 / 2);

            let n = ratings.len();
            let columns = n.max(1);
            let y_max = ratings.iter().map(|(_, c)| *c).max().unwrap_or(0);
            let y_max = y_max + y_max / 10 + 1;
            let gap = (y_max / 100).max(1);
            let mut chart = ChartBuilder::on(&left)
                .caption(
                    "Netflix Content Ratings - Bar Chart",
                    ("sans-serif", self.pt(12.0)),
                )
                .margin(self.px(10.0))
                .x_label_area_size(self.px(40.0))
                .y_label_area_size(self.px(45.0))
                .build_cartesian_2d((0usize..columns).into_segmented(), 0usize..y_max)?;
            let label_for = |v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => {
                    ratings.get(*i).map(|(r, _)| r.clone()).unwrap_or_default()
                }
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(columns)
                .x_label_formatter(&label_for)
                .x_desc("Rating")
                .y_desc("Count")
                .label_style(("sans-serif", self.pt(8.0)))
                .axis_desc_style(("sans-serif", self.pt(10.0)))
                .draw()?;
            let inset = self.px(2.0);
            chart.draw_series(ratings.iter().enumerate().map(|(i, (_, count))| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), *count)],
                    SKY_BLUE.filled(),
                );
                bar.set_margin(0, 0, inset, inset);
                bar
            }))?;
            let value_style = TextStyle::from(("sans-serif", self.pt(8.0)).into_font())
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(ratings.iter().enumerate().map(|(i, (_, count))| {
                Text::new(
                    count.to_string(),
                    (SegmentValue::CenterOf(i), count + gap),
                    value_style.clone(),
                )
            }))?;

            let right = right.titled(
                "Netflix Content Ratings - Distribution",
                ("sans-serif", self.pt(12.0)),
            )?;
            if ratings.is_empty() {
                root.present()?;
                return Ok(());
            }
            let slices = PieSlices::from_ranked(ratings);
            let (w, h) = right.dim_in_pixel();
            let center = ((w / 2) as i32, (h / 2) as i32);
            let radius = f64::from(w.min(h)) * 0.38;
            let colors: Vec<RGBColor> = (0..n).map(palette_color).collect();
            let mut pie = Pie::new(&center, &radius, &slices.sizes, &colors, &slices.labels);
            pie.start_angle(-90.0);
            pie.label_style(("sans-serif", self.pt(8.0)).into_font().color(&BLACK));
            pie.percentages(("sans-serif", self.pt(7.0)).into_font().color(&BLACK));
            right.draw(&pie)?;
            root.present()?;
            Ok(())
        }

        fn timeline_chart(&self, path: &Path, bands: &[StackedPoint]) -> DrawResult {
            let size = figure_pixels(TIMELINE_FIGURE, self.config.dpi);
            let root = BitMapBackend::new(path, size).into_drawing_area();
            root.fill(&WHITE)?;

            let first = bands.first().map_or(self.timeline_start_year, |p| p.year);
            let last = bands.last().map_or(first, |p| p.year).max(first + 1);
            let y_max = bands.iter().map(|p| p.total).fold(0.0, f64::max) * 1.05 + 1.0;
            let caption = format!(
                "Netflix Content Production Over Time ({}-Present)",
                self.timeline_start_year
            );
            let mut chart = ChartBuilder::on(&root)
                .caption(caption, ("sans-serif", self.pt(12.0)))
                .margin(self.px(10.0))
                .x_label_area_size(self.px(30.0))
                .y_label_area_size(self.px(45.0))
                .build_cartesian_2d(first..last, 0f64..y_max)?;
            chart
                .configure_mesh()
                .bold_line_style(BLACK.mix(0.3))
                .light_line_style(TRANSPARENT)
                .x_desc("Release Year")
                .y_desc("Number of Titles")
                .x_label_formatter(&|year| year.to_string())
                .label_style(("sans-serif", self.pt(9.0)))
                .axis_desc_style(("sans-serif", self.pt(10.0)))
                .draw()?;

            let movie_band: Vec<(i32, f64)> = bands
                .iter()
                .map(|p| (p.year, p.movies))
                .chain(bands.iter().rev().map(|p| (p.year, 0.0)))
                .collect();
            let tv_band: Vec<(i32, f64)> = bands
                .iter()
                .map(|p| (p.year, p.total))
                .chain(bands.iter().rev().map(|p| (p.year, p.movies)))
                .collect();

            if bands.is_empty() {
                root.present()?;
                return Ok(());
            }
            let legend_box = self.px(4.0) as i32;
            for (label, band, color) in [
                ("Movies", movie_band, MOVIE_COLOR.mix(0.7)),
                ("TV Shows", tv_band, TV_COLOR.mix(0.7)),
            ] {
                chart
                    .draw_series(std::iter::once(Polygon::new(band, color.filled())))?
                    .label(label)
                    .legend(move |(x, y)| {
                        Rectangle::new(
                            [(x, y - legend_box), (x + 2 * legend_box, y + legend_box)],
                            color.filled(),
                        )
                    });
            }
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font(("sans-serif", self.pt(10.0)))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
            root.present()?;
            Ok(())
        }
    }
}

#[cfg(not(feature = "charts"))]
impl ChartRenderer {
    fn draw_genres(&self, _path: &std::path::Path, _bars: &GenreBars) -> Result<()> {
        Err(Self::charts_unavailable("genres"))
    }

    fn draw_ratings(&self, _path: &std::path::Path, _ratings: &[(String, usize)]) -> Result<()> {
        Err(Self::charts_unavailable("ratings"))
    }

    fn draw_timeline(&self, _path: &std::path::Path, _bands: &[StackedPoint]) -> Result<()> {
        Err(Self::charts_unavailable("timeline"))
    }

    fn charts_unavailable(chart: &str) -> ReportError {
        ReportError::render_failure(chart, "built without the `charts` feature")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_size_scales_with_dpi() {
        assert_eq!(figure_pixels(GENRES_FIGURE, 300), (3600, 2400));
        assert_eq!(figure_pixels(RATINGS_FIGURE, 100), (1500, 600));
    }

    #[test]
    fn genre_bars_put_the_leader_on_top() {
        let ranked = vec![
            ("Dramas".to_string(), 9),
            ("Comedies".to_string(), 5),
            ("Thrillers".to_string(), 2),
        ];
        let bars = GenreBars::from_ranked(&ranked);
        assert_eq!(bars.labels, vec!["Thrillers", "Comedies", "Dramas"]);
        assert_eq!(bars.counts, vec![2, 5, 9]);
        assert_eq!(bars.max_count(), 9);
    }

    #[test]
    fn pie_percentages_cover_the_whole() {
        let ranked = vec![("TV-MA".to_string(), 3), ("PG".to_string(), 1)];
        let slices = PieSlices::from_ranked(&ranked);
        assert_eq!(slices.percentages, vec![75.0, 25.0]);
        assert_eq!(slices.sizes, vec![3.0, 1.0]);
    }

    #[test]
    fn stacked_bands_put_tv_on_top_of_movies() {
        let timeline = vec![
            YearlyCounts { year: 2001, movies: 4, tv_shows: 1 },
            YearlyCounts { year: 2002, movies: 0, tv_shows: 3 },
        ];
        let bands = stacked_bands(&timeline);
        assert_eq!(bands[0], StackedPoint { year: 2001, movies: 4.0, total: 5.0 });
        assert_eq!(bands[1], StackedPoint { year: 2002, movies: 0.0, total: 3.0 });
    }
}
