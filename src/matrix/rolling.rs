// Sliding-window sums over a CountMatrix
//
// For row i the window covers rows max(0, i-N+1)..=i. The cell is the sum
// of that window when at least M rows fall inside it, NaN otherwise.

use super::{CountMatrix, RollingMatrix};
use crate::bucket::TimeBucket;
use serde::{Deserialize, Serialize};

/// Window size and minimum-periods threshold, in bucket units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow {
    /// Number of rows summed (N)
    pub size: usize,
    /// Rows required before a sum is emitted (M)
    pub min_periods: usize,
}

impl RollingWindow {
    /// Full window: no output until `size` rows have accumulated
    pub fn new(size: usize) -> Self {
        Self {
            size,
            min_periods: size,
        }
    }

    /// Window that emits partial sums once `min_periods` rows exist
    pub fn with_min_periods(size: usize, min_periods: usize) -> Self {
        Self { size, min_periods }
    }

    /// Check `1 <= min_periods <= size`
    pub fn validate(&self) -> Result<(), String> {
        if self.size == 0 {
            return Err("window size must be >= 1".to_string());
        }
        if self.min_periods == 0 {
            return Err("min_periods must be >= 1".to_string());
        }
        if self.min_periods > self.size {
            return Err(format!(
                "min_periods ({}) must not exceed window size ({})",
                self.min_periods, self.size
            ));
        }
        Ok(())
    }
}

/// Per-column rolling sums
///
/// # Example
/// ```
/// use racebar::bucket::Day;
/// use racebar::matrix::{aggregate, rolling_sum, RollingWindow};
///
/// let d = |n| Day::from_ymd(2021, 1, n).unwrap();
/// let counts = aggregate([(d(1), "A"), (d(2), "A"), (d(3), "A")]);
/// let sums = rolling_sum(&counts, RollingWindow::new(2)).unwrap();
///
/// let a = sums.column("A").unwrap();
/// assert!(a[0].is_nan());
/// assert_eq!(&a[1..], &[2.0, 2.0]);
/// ```
pub fn rolling_sum<B: TimeBucket>(
    matrix: &CountMatrix<B>,
    window: RollingWindow,
) -> Result<RollingMatrix<B>, String> {
    window.validate()?;

    let n_rows = matrix.rows.len();
    let width = matrix.columns.len();
    let mut values = vec![vec![f64::NAN; width]; n_rows];

    for col in 0..width {
        let mut running: u64 = 0;
        for i in 0..n_rows {
            running += matrix.values[i][col];
            if i >= window.size {
                running -= matrix.values[i - window.size][col];
            }
            let in_window = (i + 1).min(window.size);
            if in_window >= window.min_periods {
                values[i][col] = running as f64;
            }
        }
    }

    tracing::debug!(
        "Rolling sum over {} {} rows (size={}, min_periods={})",
        n_rows,
        B::GRANULARITY,
        window.size,
        window.min_periods
    );

    Ok(RollingMatrix {
        rows: matrix.rows.clone(),
        columns: matrix.columns.clone(),
        values,
    })
}
