//! Popularity pipeline: dedup, bucket, aggregate, gap-fill, roll
//!
//! Configuration lives in a TOML file (all sections optional):
//!
//! ```toml
//! fill_month_gaps = false
//! entities = "regex=^(Roland|Zoey)"
//!
//! [loader]
//! entity_column = "investigator_name"
//! timestamp_column = "date_creation"
//! on_malformed = "fail"
//!
//! # Six-month sums, partial from three months, doubled to decks per year
//! [[window]]
//! name = "6m"
//! granularity = "month"
//! size = 6
//! min_periods = 3
//! skip_rows = 2
//! scale = 2.0
//!
//! [render]
//! bar_count = 10
//! ```
//!
//! Without `[[window]]` entries the four reference windows are used:
//! 30 and 90 days, 3 months, and 6 months with a 3-month minimum.

use crate::bucket::{Day, Granularity, Month};
use crate::dedup::deduplicate;
use crate::filter::EntityFilter;
use crate::loader::{EventSource, LoadedEvents, LoaderConfig};
use crate::matrix::{aggregate_events, fill_gaps, rolling_sum, CountMatrix, PeriodTable, RollingWindow};
use crate::render::RenderConfig;
use crate::stats::PipelineSummary;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One rolling-sum run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Name used to select the series for rendering
    pub name: String,
    pub granularity: Granularity,
    /// Window size N in buckets
    pub size: usize,
    /// Minimum populated rows M (defaults to N)
    #[serde(default)]
    pub min_periods: Option<usize>,
    /// Leading rows dropped from the output
    #[serde(default)]
    pub skip_rows: usize,
    /// Multiplier applied to every defined cell
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl WindowSpec {
    pub fn new(name: impl Into<String>, granularity: Granularity, size: usize) -> Self {
        Self {
            name: name.into(),
            granularity,
            size,
            min_periods: None,
            skip_rows: 0,
            scale: default_scale(),
        }
    }

    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = Some(min_periods);
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn window(&self) -> RollingWindow {
        RollingWindow::with_min_periods(self.size, self.min_periods.unwrap_or(self.size))
    }

    /// Validate window parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("window name must not be empty".to_string());
        }
        self.window()
            .validate()
            .map_err(|e| format!("window '{}': {}", self.name, e))?;
        if !self.scale.is_finite() {
            return Err(format!(
                "window '{}': scale must be finite, got {}",
                self.name, self.scale
            ));
        }
        Ok(())
    }
}

/// The reference windows: (Day, 30, 30), (Day, 90, 90), (Month, 3, 3), (Month, 6, 3)
pub fn default_windows() -> Vec<WindowSpec> {
    vec![
        WindowSpec::new("30d", Granularity::Day, 30),
        WindowSpec::new("90d", Granularity::Day, 90),
        WindowSpec::new("3m", Granularity::Month, 3),
        WindowSpec::new("6m", Granularity::Month, 6).with_min_periods(3),
    ]
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub loader: LoaderConfig,

    /// Gap-fill the month matrix as well as the day matrix
    pub fill_month_gaps: bool,

    /// Entity filter expression (see [`EntityFilter::from_expr`])
    pub entities: Option<String>,

    #[serde(rename = "window", default = "default_windows")]
    pub windows: Vec<WindowSpec>,

    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            fill_month_gaps: false,
            entities: None,
            windows: default_windows(),
            render: RenderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.loader.validate()?;

        let mut names = HashSet::new();
        for spec in &self.windows {
            spec.validate()?;
            if !names.insert(spec.name.as_str()) {
                return Err(format!("duplicate window name '{}'", spec.name));
            }
        }

        self.render.validate().map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Look up a window by name
    pub fn window(&self, name: &str) -> Option<&WindowSpec> {
        self.windows.iter().find(|w| w.name == name)
    }
}

/// Output of one rolling window run, ready for a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSeries {
    pub spec: WindowSpec,
    pub table: PeriodTable,
}

/// Everything a pipeline run produces
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Gap-filled day counts
    pub day_counts: CountMatrix<Day>,
    /// Month counts (gap-filled only with `fill_month_gaps`)
    pub month_counts: CountMatrix<Month>,
    /// One entry per configured window, in config order
    pub rolling: Vec<RollingSeries>,
    pub summary: PipelineSummary,
}

impl PipelineOutput {
    /// Find a rolling series by window name
    pub fn series(&self, name: &str) -> Option<&RollingSeries> {
        self.rolling.iter().find(|s| s.spec.name == name)
    }
}

/// Configured pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    filter: EntityFilter,
}

impl Pipeline {
    /// Validate `config` and prepare the entity filter
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

        let filter = match &config.entities {
            Some(expr) => EntityFilter::from_expr(expr)?,
            None => EntityFilter::all(),
        };

        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load from `source` and run
    pub fn run_source<S: EventSource>(&self, source: &mut S) -> Result<PipelineOutput> {
        let loaded = source.load().context("Failed to load events")?;
        self.run(loaded)
    }

    /// Run every stage on already-loaded events
    pub fn run(&self, loaded: LoadedEvents) -> Result<PipelineOutput> {
        let LoadedEvents {
            events,
            rows_read,
            rows_skipped,
        } = loaded;

        let (events, dedup) = deduplicate(events);

        let day_counts = fill_gaps(&aggregate_events::<Day>(&events));
        let mut month_counts = aggregate_events::<Month>(&events);
        if self.config.fill_month_gaps {
            month_counts = fill_gaps(&month_counts);
        }

        let (day_counts, month_counts) = if self.filter.is_all() {
            (day_counts, month_counts)
        } else {
            let day = day_counts.retain_columns(|e| self.filter.matches(e));
            let month = month_counts.retain_columns(|e| self.filter.matches(e));
            tracing::debug!("Entity filter kept {} columns", day.n_columns());
            (day, month)
        };

        let mut rolling = Vec::with_capacity(self.config.windows.len());
        for spec in &self.config.windows {
            let table = match spec.granularity {
                Granularity::Day => rolling_sum(&day_counts, spec.window())
                    .map_err(|e| anyhow!(e))?
                    .skip_rows(spec.skip_rows)
                    .scaled(spec.scale)
                    .to_period_table(),
                Granularity::Month => rolling_sum(&month_counts, spec.window())
                    .map_err(|e| anyhow!(e))?
                    .skip_rows(spec.skip_rows)
                    .scaled(spec.scale)
                    .to_period_table(),
            };
            tracing::debug!(
                "Window '{}' produced {} periods x {} entities",
                spec.name,
                table.n_rows(),
                table.n_columns()
            );
            rolling.push(RollingSeries {
                spec: spec.clone(),
                table,
            });
        }

        let mut summary = PipelineSummary::from_counts(&day_counts, &month_counts);
        summary.rows_read = rows_read;
        summary.rows_skipped = rows_skipped;
        summary.duplicates_dropped = dedup.dropped;
        summary.events_kept = dedup.kept;

        tracing::info!(
            "Pipeline complete: {} decks, {} days, {} months, {} entities, {} windows",
            dedup.kept,
            day_counts.n_rows(),
            month_counts.n_rows(),
            day_counts.n_columns(),
            rolling.len()
        );

        Ok(PipelineOutput {
            day_counts,
            month_counts,
            rolling,
            summary,
        })
    }
}
