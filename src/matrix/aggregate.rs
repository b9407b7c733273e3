// Count (bucket, entity) pairs and pivot them into a dense CountMatrix
//
// Rows are only the buckets with at least one observation; gap_fill makes
// the time axis contiguous afterwards. Output is independent of input order.

use super::CountMatrix;
use crate::bucket::TimeBucket;
use crate::event::Event;
use std::collections::{BTreeMap, BTreeSet};

/// Pivot `(bucket, entity)` observations into a CountMatrix
///
/// # Example
/// ```
/// use racebar::bucket::Month;
/// use racebar::matrix::aggregate;
///
/// let jan = Month::new(2021, 1).unwrap();
/// let feb = Month::new(2021, 2).unwrap();
/// let counts = aggregate([(jan, "A"), (jan, "A"), (feb, "B")]);
///
/// assert_eq!(counts.n_rows(), 2);
/// assert_eq!(counts.column("A"), Some(vec![2, 0]));
/// assert_eq!(counts.column("B"), Some(vec![0, 1]));
/// ```
pub fn aggregate<B, I, S>(pairs: I) -> CountMatrix<B>
where
    B: TimeBucket,
    I: IntoIterator<Item = (B, S)>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<B, BTreeMap<String, u64>> = BTreeMap::new();
    let mut entities: BTreeSet<String> = BTreeSet::new();

    for (bucket, entity) in pairs {
        let entity = entity.as_ref();
        let row = counts.entry(bucket).or_default();
        match row.get_mut(entity) {
            Some(count) => *count += 1,
            None => {
                row.insert(entity.to_string(), 1);
                if !entities.contains(entity) {
                    entities.insert(entity.to_string());
                }
            }
        }
    }

    let columns: Vec<String> = entities.into_iter().collect();
    let mut rows = Vec::with_capacity(counts.len());
    let mut values = Vec::with_capacity(counts.len());

    for (bucket, row_counts) in counts {
        rows.push(bucket);
        values.push(
            columns
                .iter()
                .map(|entity| row_counts.get(entity).copied().unwrap_or(0))
                .collect(),
        );
    }

    tracing::debug!(
        "Aggregated {} {} buckets x {} entities",
        rows.len(),
        B::GRANULARITY,
        columns.len()
    );

    CountMatrix {
        rows,
        columns,
        values,
    }
}

/// Bucket each event at granularity `B` and aggregate
pub fn aggregate_events<B: TimeBucket>(events: &[Event]) -> CountMatrix<B> {
    aggregate(
        events
            .iter()
            .map(|e| (B::from_timestamp(&e.created_at), e.entity_name.as_str())),
    )
}
