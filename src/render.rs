//! Renderer interface and the text renderer
//!
//! The animation itself is produced by an external tool. A [`Renderer`]
//! receives a [`PeriodTable`] plus a [`RenderConfig`] and either hands them
//! on (see [`crate::json_output`], [`crate::csv_output`]) or draws ranked
//! bars as text ([`TextRenderer`]). Failures surface unchanged as
//! [`RenderError`]; nothing is retried.

use crate::matrix::PeriodTable;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// Errors raised while rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Unsupported render configuration: {0}")]
    UnsupportedConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bar direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// How bars are ordered within a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
    /// Column order, no ranking
    Fixed,
}

/// Label font sizes in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub bar_label: f32,
    pub tick_label: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            bar_label: 7.0,
            tick_label: 7.0,
        }
    }
}

/// Options understood by the animation renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub orientation: Orientation,
    pub sort_order: SortOrder,

    /// Bars shown per period
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,

    /// Interpolated frames between two periods
    #[serde(default = "default_steps_per_period")]
    pub steps_per_period: u32,

    /// Time each period stays on screen
    #[serde(default = "default_period_duration_ms")]
    pub period_duration_ms: u64,

    #[serde(default = "default_color_scheme")]
    pub color_scheme: String,

    #[serde(default = "default_title")]
    pub title: String,

    pub font_sizes: FontSizes,

    /// Entities drawn with emphasis
    pub highlights: Vec<String>,
}

fn default_bar_count() -> usize {
    10
}

fn default_steps_per_period() -> u32 {
    30
}

fn default_period_duration_ms() -> u64 {
    1000
}

fn default_color_scheme() -> String {
    "dark12".to_string()
}

fn default_title() -> String {
    "Investigator Popularity".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            sort_order: SortOrder::default(),
            bar_count: default_bar_count(),
            steps_per_period: default_steps_per_period(),
            period_duration_ms: default_period_duration_ms(),
            color_scheme: default_color_scheme(),
            title: default_title(),
            font_sizes: FontSizes::default(),
            highlights: Vec::new(),
        }
    }
}

impl RenderConfig {
    /// Reject combinations no renderer can honour
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.bar_count == 0 {
            return Err(RenderError::UnsupportedConfig(
                "bar_count must be >= 1".to_string(),
            ));
        }
        if self.steps_per_period == 0 {
            return Err(RenderError::UnsupportedConfig(
                "steps_per_period must be >= 1".to_string(),
            ));
        }
        if self.period_duration_ms == 0 {
            return Err(RenderError::UnsupportedConfig(
                "period_duration_ms must be > 0".to_string(),
            ));
        }
        if self.color_scheme.trim().is_empty() {
            return Err(RenderError::UnsupportedConfig(
                "color_scheme must not be empty".to_string(),
            ));
        }
        if !(self.font_sizes.bar_label > 0.0 && self.font_sizes.tick_label > 0.0) {
            return Err(RenderError::UnsupportedConfig(format!(
                "font sizes must be positive, got bar_label={} tick_label={}",
                self.font_sizes.bar_label, self.font_sizes.tick_label
            )));
        }
        Ok(())
    }

    pub fn is_highlighted(&self, entity: &str) -> bool {
        self.highlights.iter().any(|h| h == entity)
    }
}

/// Consumer of the final matrix
pub trait Renderer {
    fn render(&mut self, table: &PeriodTable, config: &RenderConfig) -> Result<(), RenderError>;
}

/// Bars shown for one period: defined cells ordered per `sort_order`,
/// truncated to `bar_count`
pub fn rank_period<'a>(
    table: &'a PeriodTable,
    row: usize,
    config: &RenderConfig,
) -> Vec<(&'a str, f64)> {
    let Some(values) = table.row_values().get(row) else {
        return Vec::new();
    };

    let mut bars: Vec<(&str, f64)> = table
        .columns()
        .iter()
        .map(String::as_str)
        .zip(values.iter().copied())
        .filter(|(_, v)| !v.is_nan())
        .collect();

    match config.sort_order {
        SortOrder::Descending => {
            bars.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        }
        SortOrder::Ascending => {
            bars.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        }
        SortOrder::Fixed => {}
    }

    bars.truncate(config.bar_count);
    bars
}

/// Width of the longest bar in characters
const BAR_WIDTH: usize = 40;

/// Height of vertical bars in lines
const BAR_HEIGHT: usize = 10;

/// Ranked bars drawn as plain text
pub struct TextRenderer<W> {
    out: W,
    final_only: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            final_only: false,
        }
    }

    /// Draw only the last period
    pub fn final_only(mut self, final_only: bool) -> Self {
        self.final_only = final_only;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bar_len(value: f64, max: f64, scale: usize) -> usize {
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        ((value / max) * scale as f64).round() as usize
    }

    fn render_horizontal(
        &mut self,
        bars: &[(&str, f64)],
        config: &RenderConfig,
    ) -> Result<(), RenderError> {
        let max = bars.iter().map(|b| b.1).fold(0.0_f64, f64::max);
        let label_width = bars.iter().map(|b| b.0.chars().count()).max().unwrap_or(0);

        for (rank, (entity, value)) in bars.iter().enumerate() {
            let mark = if config.is_highlighted(entity) { '*' } else { ' ' };
            writeln!(
                self.out,
                "{:>3}. {:<width$}{} {} {}",
                rank + 1,
                entity,
                mark,
                "#".repeat(Self::bar_len(*value, max, BAR_WIDTH)),
                format_value(*value),
                width = label_width
            )?;
        }
        Ok(())
    }

    fn render_vertical(
        &mut self,
        bars: &[(&str, f64)],
        config: &RenderConfig,
    ) -> Result<(), RenderError> {
        let max = bars.iter().map(|b| b.1).fold(0.0_f64, f64::max);
        let heights: Vec<usize> = bars
            .iter()
            .map(|b| Self::bar_len(b.1, max, BAR_HEIGHT))
            .collect();

        for level in (1..=BAR_HEIGHT).rev() {
            let line: String = heights
                .iter()
                .map(|&h| if h >= level { " # " } else { "   " })
                .collect();
            writeln!(self.out, "{}", line.trim_end())?;
        }
        let axis: String = (1..=bars.len()).map(|r| format!("{:^3}", r)).collect();
        writeln!(self.out, "{}", axis.trim_end())?;

        for (rank, (entity, value)) in bars.iter().enumerate() {
            let mark = if config.is_highlighted(entity) { "*" } else { "" };
            writeln!(
                self.out,
                "{:>3} = {}{} ({})",
                rank + 1,
                entity,
                mark,
                format_value(*value)
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, table: &PeriodTable, config: &RenderConfig) -> Result<(), RenderError> {
        config.validate()?;

        if table.is_empty() {
            writeln!(self.out, "No periods to render.")?;
            return Ok(());
        }

        writeln!(self.out, "{}", config.title)?;
        let first = if self.final_only { table.n_rows() - 1 } else { 0 };

        for row in first..table.n_rows() {
            writeln!(self.out, "== {} ==", table.rows()[row])?;
            let bars = rank_period(table, row, config);
            if bars.is_empty() {
                writeln!(self.out, "  (no data)")?;
                continue;
            }
            match config.orientation {
                Orientation::Horizontal => self.render_horizontal(&bars, config)?,
                Orientation::Vertical => self.render_vertical(&bars, config)?,
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Integers without a fraction, everything else with two decimals
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
