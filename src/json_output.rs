//! JSON frame bundle for the external animation renderer
//!
//! The bundle carries the render configuration next to the matrix so the
//! animation tool needs no other input. Undefined cells (rolling-window
//! warm-up) are written as `null`.

use crate::matrix::{Matrix, PeriodTable};
use crate::render::{RenderConfig, RenderError, Renderer};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Matrix plus render options, as handed to the animation tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonFrameBundle {
    pub config: RenderConfig,
    /// Period labels, oldest first
    pub periods: Vec<String>,
    /// Entity names, one per column
    pub entities: Vec<String>,
    /// One row per period, one cell per entity
    pub values: Vec<Vec<Option<f64>>>,
}

impl JsonFrameBundle {
    pub fn new(table: &PeriodTable, config: &RenderConfig) -> Self {
        Self {
            config: config.clone(),
            periods: table.rows().to_vec(),
            entities: table.columns().to_vec(),
            values: table
                .row_values()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| if v.is_nan() { None } else { Some(*v) })
                        .collect()
                })
                .collect(),
        }
    }

    /// Rebuild the period table (null cells become NaN)
    pub fn to_table(&self) -> Result<PeriodTable, String> {
        Matrix::from_parts(
            self.periods.clone(),
            self.entities.clone(),
            self.values
                .iter()
                .map(|row| row.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                .collect(),
        )
    }
}

/// Writes a [`JsonFrameBundle`] to any writer
pub struct JsonRenderer<W> {
    out: W,
    pretty: bool,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, pretty: true }
    }

    /// Emit compact single-line JSON
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, table: &PeriodTable, config: &RenderConfig) -> Result<(), RenderError> {
        config.validate()?;

        let bundle = JsonFrameBundle::new(table, config);
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &bundle)?;
        } else {
            serde_json::to_writer(&mut self.out, &bundle)?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
