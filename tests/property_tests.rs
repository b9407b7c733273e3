//! Property-based tests for the popularity pipeline
//!
//! Core properties:
//! 1. Deduplication is idempotent and keeps the last record per identity
//! 2. Aggregation does not depend on input order
//! 3. Count matrices are dense with non-negative cells
//! 4. Gap-filling yields one row per calendar unit in the span
//! 5. Rolling sums agree with a naive window sum

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use racebar::bucket::{Day, TimeBucket};
use racebar::dedup::deduplicate;
use racebar::event::{Event, Timestamp};
use racebar::matrix::{aggregate, aggregate_events, fill_gaps, rolling_sum, RollingWindow};

const ENTITIES: [&str; 4] = ["Agnes Baker", "Daisy Walker", "Roland Banks", "Zoey Samaras"];

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
}

fn timestamp(day: u32, hour: u32) -> Timestamp {
    let naive = base()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
        .checked_add_signed(Duration::days(day as i64))
        .unwrap();
    Timestamp::from(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)))
}

fn arb_event() -> impl Strategy<Value = Event> {
    (0usize..ENTITIES.len(), 0u32..60, 0u32..3, 0u32..100).prop_map(|(e, day, hour, deck)| {
        Event::new(ENTITIES[e], timestamp(day, hour)).with_deck_name(format!("deck {}", deck))
    })
}

fn naive_rolling(column: &[u64], window: RollingWindow) -> Vec<f64> {
    (0..column.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window.size);
            let populated = i + 1 - start;
            if populated >= window.min_periods {
                column[start..=i].iter().sum::<u64>() as f64
            } else {
                f64::NAN
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_dedup_idempotent(events in prop::collection::vec(arb_event(), 0..80)) {
        let (once, _) = deduplicate(events);
        let (twice, report) = deduplicate(once.clone());

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(report.dropped, 0);
    }

    #[test]
    fn prop_dedup_keeps_last(events in prop::collection::vec(arb_event(), 1..80)) {
        let (kept, report) = deduplicate(events.clone());
        prop_assert_eq!(report.kept + report.dropped, events.len());

        for event in &kept {
            let last = events
                .iter()
                .rev()
                .find(|e| e.identity() == event.identity())
                .unwrap();
            prop_assert_eq!(last, event);
        }
    }

    #[test]
    fn prop_aggregation_order_independent(
        events in prop::collection::vec(arb_event(), 0..80),
        seed in any::<u64>(),
    ) {
        let mut shuffled = events.clone();
        // Deterministic Fisher-Yates driven by the seed
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            shuffled.swap(i, j);
        }

        prop_assert_eq!(aggregate_events::<Day>(&events), aggregate_events::<Day>(&shuffled));
    }

    #[test]
    fn prop_gap_fill_dense_and_complete(events in prop::collection::vec(arb_event(), 1..80)) {
        let counts = aggregate_events::<Day>(&events);
        let filled = fill_gaps(&counts);

        let first = counts.rows().first().unwrap().date();
        let last = counts.rows().last().unwrap().date();
        let span = (last - first).num_days() as usize + 1;
        prop_assert_eq!(filled.n_rows(), span);
        prop_assert_eq!(filled.columns(), counts.columns());

        for pair in filled.rows().windows(2) {
            prop_assert_eq!(pair[0].succ(), pair[1]);
        }
        for row in filled.row_values() {
            prop_assert_eq!(row.len(), filled.n_columns());
        }

        let before: u64 = counts.row_values().iter().flatten().sum();
        let after: u64 = filled.row_values().iter().flatten().sum();
        prop_assert_eq!(before, after);
        prop_assert_eq!(after as usize, events.len());
    }

    #[test]
    fn prop_rolling_matches_naive(
        column in prop::collection::vec(0u64..20, 0..50),
        size in 1usize..10,
        min_frac in 0usize..10,
    ) {
        let min_periods = 1 + min_frac % size;
        let window = RollingWindow::with_min_periods(size, min_periods);

        let days: Vec<Day> = (0..column.len() as u32)
            .map(|d| Day(base() + Duration::days(d as i64)))
            .collect();
        let pairs: Vec<(Day, &str)> = days
            .iter()
            .zip(&column)
            .flat_map(|(d, &n)| std::iter::repeat((*d, "A")).take(n as usize))
            .collect();
        let counts = fill_gaps(&aggregate(pairs));

        let rolled = rolling_sum(&counts, window).unwrap();
        let expected = naive_rolling(&counts.column("A").unwrap_or_default(), window);
        let actual = rolled.column("A").unwrap_or_default();

        prop_assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(&expected) {
            prop_assert!((a.is_nan() && e.is_nan()) || a == e, "{} != {}", a, e);
        }
    }
}
