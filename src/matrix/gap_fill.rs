// Reindex a CountMatrix onto the full calendar span of its rows
//
// Every bucket from the first to the last observed row is present after
// filling; inserted rows are zero across all columns.

use super::CountMatrix;
use crate::bucket::TimeBucket;

/// Insert zero rows for every missing bucket in `[min, max]`
///
/// Row count afterwards equals the number of calendar units in the span,
/// inclusive. The column set is unchanged. An empty matrix stays empty.
pub fn fill_gaps<B: TimeBucket>(matrix: &CountMatrix<B>) -> CountMatrix<B> {
    let (Some(&first), Some(&last)) = (matrix.rows.first(), matrix.rows.last()) else {
        return matrix.clone();
    };

    let width = matrix.columns.len();
    let mut rows = Vec::with_capacity(matrix.rows.len());
    let mut values = Vec::with_capacity(matrix.rows.len());
    let mut observed = matrix.rows.iter().zip(&matrix.values).peekable();

    let mut bucket = first;
    loop {
        match observed.next_if(|(key, _)| **key == bucket) {
            Some((_, row)) => values.push(row.clone()),
            None => values.push(vec![0; width]),
        }
        rows.push(bucket);

        if bucket >= last {
            break;
        }
        let next = bucket.succ();
        if next <= bucket {
            // Calendar exhausted (succ saturated)
            break;
        }
        bucket = next;
    }

    tracing::debug!(
        "Gap-filled {} rows: {} observed, {} inserted",
        rows.len(),
        matrix.rows.len(),
        rows.len() - matrix.rows.len()
    );

    CountMatrix {
        rows,
        columns: matrix.columns.clone(),
        values,
    }
}
