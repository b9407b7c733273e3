//! Duplicate deck removal
//!
//! Two events with the same `(entity_name, created_at)` are duplicates.
//! The one appearing last in input order is kept; survivors keep their
//! relative order.

use crate::event::{Event, Timestamp};
use std::collections::HashMap;

/// Outcome counts from a deduplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupReport {
    /// Events surviving deduplication
    pub kept: usize,
    /// Events dropped as earlier duplicates
    pub dropped: usize,
}

/// Remove duplicate events, keeping the last occurrence of each identity
pub fn deduplicate(events: Vec<Event>) -> (Vec<Event>, DedupReport) {
    let total = events.len();

    // Index of the last occurrence per identity
    let mut last_seen: HashMap<(&str, Timestamp), usize> = HashMap::with_capacity(total);
    for (idx, event) in events.iter().enumerate() {
        last_seen.insert(event.identity(), idx);
    }
    let mut keep = vec![false; total];
    for idx in last_seen.into_values() {
        keep[idx] = true;
    }

    let kept: Vec<Event> = events
        .into_iter()
        .zip(keep)
        .filter_map(|(event, keep)| keep.then_some(event))
        .collect();

    let report = DedupReport {
        kept: kept.len(),
        dropped: total - kept.len(),
    };
    tracing::info!("Number of duplicate decks dropped: {}", report.dropped);

    (kept, report)
}
