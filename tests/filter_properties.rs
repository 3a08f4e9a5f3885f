mod common;

use std::collections::HashSet;

use proptest::prelude::*;

use tracksieve::{
    constants::ObjectNumber,
    filter_engine::{filter, filter_with_stats},
    observations::Observation,
    partition::partition,
    tracklet_filter::TrackletCriteria,
    FilterParams, ObservationTable,
};

use common::{init_tracing, synthetic_table, SurveyShape};

#[test]
fn test_filter_is_deterministic_across_worker_counts() {
    init_tracing();
    for seed in [1, 7, 42] {
        let table = synthetic_table(seed, SurveyShape::default());
        let reference = filter(&table, 2, 1.0, 90.0, 1).unwrap();
        assert!(!reference.is_empty());
        for workers in [2, 3, 4, 8, 64, 1000] {
            assert_eq!(
                filter(&table, 2, 1.0, 90.0, workers).unwrap(),
                reference,
                "seed {seed}, {workers} workers"
            );
        }
    }
}

#[test]
fn test_filter_is_idempotent() {
    let table = synthetic_table(3, SurveyShape::default());
    for (min_obs, min_arc, max_gap) in [(2, 1.0, 90.0), (3, 10.0, 30.0), (1, 0.0, 1440.0)] {
        let once = filter(&table, min_obs, min_arc, max_gap, 4).unwrap();
        let twice = filter(&once, min_obs, min_arc, max_gap, 4).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_filtered_rows_form_valid_tracklets() {
    let table = synthetic_table(11, SurveyShape::default());
    let criteria = TrackletCriteria::new(3, 5.0, 60.0).unwrap();
    let outcome = filter_with_stats(&table, &FilterParams::new(criteria, 4).unwrap()).unwrap();

    // every output tracklet passes, and is a whole tracklet of the input
    for tracklet in outcome.table.tracklets() {
        assert!(criteria.accepts(&tracklet));
        let original = table.tracklet(tracklet.object(), tracklet.night()).unwrap();
        assert_eq!(original.observations(), tracklet.observations());
    }

    let stats = outcome.stats;
    assert_eq!(stats.output_rows, outcome.table.len());
    assert_eq!(stats.tracklets_kept, outcome.table.tracklets().count());
    assert_eq!(
        stats.tracklets_rejected(),
        stats.rejected_too_few_observations
            + stats.rejected_single_detection
            + stats.rejected_arc_too_short
            + stats.rejected_gap_too_large
    );
}

fn arb_table() -> impl Strategy<Value = ObservationTable> {
    prop::collection::vec((0u32..12, 0i64..5, 0.0f64..0.3, 0.0f64..1.0), 0..120).prop_map(
        |rows| {
            let rows = rows.into_iter().map(|(id, night, frac, ra)| {
                Observation::with_night(id, ra, 0.0, 60000.55 + night as f64 + frac, night)
            });
            ObservationTable::canonicalize(rows).0
        },
    )
}

proptest! {
    #[test]
    fn prop_partitions_reassemble_the_table(table in arb_table(), n_parts in 1usize..16) {
        let parts = partition(&table, n_parts).unwrap();
        prop_assert!(!parts.is_empty() && parts.len() <= n_parts);

        let rebuilt: Vec<Observation> = parts.iter().flat_map(|p| p.rows().iter().cloned()).collect();
        prop_assert_eq!(rebuilt.as_slice(), table.as_slice());

        let mut expected_start = 0;
        for (i, p) in parts.iter().enumerate() {
            prop_assert_eq!(p.index, i);
            prop_assert_eq!(p.start, expected_start);
            expected_start += p.len();
        }
    }

    #[test]
    fn prop_no_object_spans_two_partitions(table in arb_table(), n_parts in 1usize..16) {
        let parts = partition(&table, n_parts).unwrap();
        let mut seen: HashSet<ObjectNumber> = HashSet::new();
        for p in &parts {
            let here: HashSet<ObjectNumber> = p.rows().iter().map(|o| o.object.clone()).collect();
            prop_assert!(seen.is_disjoint(&here));
            seen.extend(here);
        }
    }

    #[test]
    fn prop_partition_is_deterministic(table in arb_table(), n_parts in 1usize..16) {
        prop_assert_eq!(partition(&table, n_parts).unwrap(), partition(&table, n_parts).unwrap());
    }

    #[test]
    fn prop_filter_ignores_worker_count(
        table in arb_table(),
        workers in 2usize..10,
        min_obs in 1usize..4,
        min_arc in 0.0f64..2000.0,
    ) {
        let reference = filter(&table, min_obs, min_arc, 90.0, 1).unwrap();
        let parallel = filter(&table, min_obs, min_arc, 90.0, workers).unwrap();
        prop_assert_eq!(&parallel, &reference);
        prop_assert_eq!(filter(&reference, min_obs, min_arc, 90.0, workers).unwrap(), reference);
    }
}
