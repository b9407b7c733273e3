// Dense time-by-entity matrices
//
// Rows are time buckets in ascending order, columns are entity names in
// ascending order, and every (row, column) cell holds a value. Absent
// observations are zero, never missing.
//
// Stages:
// - aggregate: count (bucket, entity) pairs and pivot into a CountMatrix
// - gap_fill: reindex rows onto the contiguous calendar span
// - rolling: sliding-window sums with a minimum-periods threshold

mod aggregate;
mod gap_fill;
mod rolling;

pub use aggregate::{aggregate, aggregate_events};
pub use gap_fill::fill_gaps;
pub use rolling::{rolling_sum, RollingWindow};

use std::fmt;

/// Numeric cell stored in a matrix
pub trait Cell: Copy + Default + PartialEq + fmt::Debug {
    fn to_f64(self) -> f64;
}

impl Cell for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Cell for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

/// Row-major dense matrix keyed by row labels and entity names
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<K, V> {
    rows: Vec<K>,
    columns: Vec<String>,
    values: Vec<Vec<V>>,
}

/// Event counts per (bucket, entity)
pub type CountMatrix<B> = Matrix<B, u64>;

/// Rolling-window sums, NaN where the window is not yet populated
pub type RollingMatrix<B> = Matrix<B, f64>;

/// Renderer-facing matrix with display labels as row keys
pub type PeriodTable = Matrix<String, f64>;

impl<K, V: Cell> Matrix<K, V> {
    /// Build a matrix from parts
    ///
    /// Fails unless there is one value row per row key and every value row
    /// has one cell per column.
    pub fn from_parts(rows: Vec<K>, columns: Vec<String>, values: Vec<Vec<V>>) -> Result<Self, String> {
        if values.len() != rows.len() {
            return Err(format!(
                "row count mismatch: {} keys, {} value rows",
                rows.len(),
                values.len()
            ));
        }
        if let Some((idx, row)) = values
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(format!(
                "row {} has {} cells, expected {}",
                idx,
                row.len(),
                columns.len()
            ));
        }
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// A matrix with no rows and no columns
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[K] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_values(&self) -> &[Vec<V>] {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of an entity column
    pub fn column_index(&self, entity: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == entity)
    }

    /// All values of one entity column in row order
    pub fn column(&self, entity: &str) -> Option<Vec<V>> {
        let idx = self.column_index(entity)?;
        Some(self.values.iter().map(|row| row[idx]).collect())
    }

    /// Value at (row index, entity)
    pub fn get(&self, row: usize, entity: &str) -> Option<V> {
        let col = self.column_index(entity)?;
        self.values.get(row).map(|r| r[col])
    }

    /// Keep only the columns accepted by `keep`, preserving order
    pub fn retain_columns<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool,
        K: Clone,
    {
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|&i| keep(&self.columns[i]))
            .collect();
        Self {
            rows: self.rows.clone(),
            columns: kept.iter().map(|&i| self.columns[i].clone()).collect(),
            values: self
                .values
                .iter()
                .map(|row| kept.iter().map(|&i| row[i]).collect())
                .collect(),
        }
    }

    /// Drop the first `n` rows
    pub fn skip_rows(&self, n: usize) -> Self
    where
        K: Clone,
    {
        let n = n.min(self.rows.len());
        Self {
            rows: self.rows[n..].to_vec(),
            columns: self.columns.clone(),
            values: self.values[n..].to_vec(),
        }
    }
}

impl<K: fmt::Display, V: Cell> Matrix<K, V> {
    /// Relabel rows by their display form and widen cells to `f64`
    pub fn to_period_table(&self) -> PeriodTable {
        Matrix {
            rows: self.rows.iter().map(|k| k.to_string()).collect(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| v.to_f64()).collect())
                .collect(),
        }
    }
}

impl<K: Clone> Matrix<K, f64> {
    /// Multiply every cell by `factor` (NaN stays NaN)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| v * factor).collect())
                .collect(),
        }
    }
}
