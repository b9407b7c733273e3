//! Run summary for --summary mode
//!
//! Reports how many rows were read, skipped and deduplicated, the calendar
//! span covered, and per-entity deck totals ranked by popularity.

use crate::bucket::{Day, Month};
use crate::matrix::CountMatrix;

/// Totals for one entity over the whole run
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTotal {
    pub entity: String,
    /// Decks built over the whole span
    pub total: u64,
    /// Percentage of all decks
    pub share: f64,
    /// Busiest day (earliest on ties)
    pub peak_day: Option<Day>,
    /// Decks built on the busiest day
    pub peak_count: u64,
}

/// Counts collected across the pipeline stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates_dropped: usize,
    pub events_kept: usize,
    pub first_day: Option<Day>,
    pub last_day: Option<Day>,
    /// Rows of the gap-filled day matrix
    pub days_spanned: usize,
    pub first_month: Option<Month>,
    pub last_month: Option<Month>,
    /// Entities sorted by total, descending (name ascending on ties)
    pub totals: Vec<EntityTotal>,
}

impl PipelineSummary {
    /// Summarize a gap-filled day matrix and the month matrix
    pub fn from_counts(day_counts: &CountMatrix<Day>, month_counts: &CountMatrix<Month>) -> Self {
        let column_totals = calculate_column_totals_with_trueno(day_counts);
        let grand_total: u64 = column_totals.iter().sum();

        let mut totals: Vec<EntityTotal> = day_counts
            .columns()
            .iter()
            .zip(&column_totals)
            .enumerate()
            .map(|(col, (entity, &total))| {
                let (peak_day, peak_count) = peak_of_column(day_counts, col);
                EntityTotal {
                    entity: entity.clone(),
                    total,
                    share: if grand_total > 0 {
                        (total as f64 / grand_total as f64) * 100.0
                    } else {
                        0.0
                    },
                    peak_day,
                    peak_count,
                }
            })
            .collect();
        totals.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.entity.cmp(&b.entity)));

        Self {
            first_day: day_counts.rows().first().copied(),
            last_day: day_counts.rows().last().copied(),
            days_spanned: day_counts.n_rows(),
            first_month: month_counts.rows().first().copied(),
            last_month: month_counts.rows().last().copied(),
            totals,
            ..Self::default()
        }
    }

    /// Total decks across all entities
    pub fn total_decks(&self) -> u64 {
        self.totals.iter().map(|t| t.total).sum()
    }

    /// Render the summary as a table
    pub fn format_table(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("rows read:          {}\n", self.rows_read));
        out.push_str(&format!("rows skipped:       {}\n", self.rows_skipped));
        out.push_str(&format!("duplicates dropped: {}\n", self.duplicates_dropped));
        out.push_str(&format!("decks counted:      {}\n", self.events_kept));

        match (self.first_day, self.last_day) {
            (Some(first), Some(last)) => out.push_str(&format!(
                "day span:           {} .. {} ({} days)\n",
                first, last, self.days_spanned
            )),
            _ => out.push_str("day span:           (empty)\n"),
        }
        if let (Some(first), Some(last)) = (self.first_month, self.last_month) {
            out.push_str(&format!("month span:         {} .. {}\n", first, last));
        }

        if self.totals.is_empty() {
            out.push_str("No decks counted.\n");
            return out;
        }

        out.push('\n');
        out.push_str("% decks      decks   peak/day  peak day    entity\n");
        out.push_str("------- ---------- ---------- ----------- ----------------\n");
        for t in &self.totals {
            out.push_str(&format!(
                "{:7.2} {:>10} {:>10} {:>11} {}\n",
                t.share,
                t.total,
                t.peak_count,
                t.peak_day.map(|d| d.to_string()).unwrap_or_default(),
                t.entity
            ));
        }
        out.push_str("------- ---------- ---------- ----------- ----------------\n");
        out.push_str(&format!(
            "{:7.2} {:>10} {:>10} {:>11} total\n",
            100.0,
            self.total_decks(),
            "",
            ""
        ));

        out
    }

    /// Print the summary to stderr
    pub fn print_summary(&self) {
        eprint!("{}", self.format_table());
    }
}

/// Largest integer every f32 partial sum can hold exactly (2^24)
const F32_EXACT_LIMIT: u64 = 1 << 24;

/// Per-column sums using Trueno for SIMD acceleration
///
/// The f32 path is exact while `rows * max_cell <= 2^24`; larger columns
/// are summed as integers.
fn calculate_column_totals_with_trueno(matrix: &CountMatrix<Day>) -> Vec<u64> {
    let n_rows = matrix.n_rows() as u64;
    (0..matrix.n_columns())
        .map(|col| {
            let column = matrix.row_values().iter().map(|row| row[col]);
            let max = column.clone().max().unwrap_or(0);
            if max == 0 {
                return 0;
            }
            if n_rows.saturating_mul(max) > F32_EXACT_LIMIT {
                return column.sum();
            }
            let values: Vec<f32> = column.map(|v| v as f32).collect();
            trueno::Vector::from_slice(&values)
                .sum()
                .unwrap_or(0.0)
                .round() as u64
        })
        .collect()
}

/// Earliest row holding the column maximum
fn peak_of_column(matrix: &CountMatrix<Day>, col: usize) -> (Option<Day>, u64) {
    let mut peak: (Option<Day>, u64) = (None, 0);
    for (day, row) in matrix.rows().iter().zip(matrix.row_values()) {
        if row[col] > peak.1 {
            peak = (Some(*day), row[col]);
        }
    }
    peak
}
