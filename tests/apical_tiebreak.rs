//! Behavioral tests for the Apical Tiebreak Temporal Memory.
//!
//! Segments are wired by hand through `basal_connections_mut` /
//! `apical_connections_mut` where a test needs a precise starting graph;
//! otherwise the memory grows its own.

use proptest::prelude::*;
use std::collections::HashSet;
use tiebreak_tm::prelude::*;

const EPSILON: f32 = 1e-5;

fn base_params() -> ApicalTiebreakParams {
    ApicalTiebreakParams {
        column_count: 4,
        cells_per_column: 4,
        basal_input_size: 64,
        apical_input_size: 64,
        activation_threshold: 2,
        reduced_basal_threshold: 2,
        min_threshold: 1,
        initial_permanence: 0.6,
        connected_permanence: 0.5,
        permanence_increment: 0.1,
        permanence_decrement: 0.1,
        sample_size: -1,
        ..Default::default()
    }
}

fn add_segment(connections: &mut SegmentConnections, cell: CellIdx, bits: &[ElemSparse], permanence: Permanence) -> Segment {
    let segment = connections.create_segments(&[cell])[0];
    connections.grow_synapses(&[segment], bits, permanence);
    segment
}

// =============================================================================
// PREDICTION
// =============================================================================

mod prediction {
    use super::*;

    fn tiebreak_memory(use_apical_tiebreak: bool) -> ApicalTiebreakTemporalMemory {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            use_apical_tiebreak,
            ..base_params()
        })
        .unwrap();

        // Column 0: cell 0 has basal and apical support, cell 1 basal only.
        add_segment(tm.basal_connections_mut(), 0, &[0, 1], 0.6);
        add_segment(tm.basal_connections_mut(), 1, &[0, 1], 0.6);
        add_segment(tm.apical_connections_mut(), 0, &[5, 6], 0.6);
        // Column 2: cell 9 basal only, no competitor.
        add_segment(tm.basal_connections_mut(), 9, &[0, 1], 0.6);
        tm
    }

    #[test]
    fn test_fully_depolarized_cell_wins_column() {
        let mut tm = tiebreak_memory(true);
        tm.depolarize_cells(&[0, 1], &[5, 6], false).unwrap();

        assert_eq!(tm.basal_predicted_cells(), vec![0, 1, 9]);
        assert_eq!(tm.apical_predicted_cells(), vec![0]);
        assert_eq!(tm.predicted_cells(), &[0, 9]);
    }

    #[test]
    fn test_tiebreak_disabled_predicts_all_basal_cells() {
        let mut tm = tiebreak_memory(false);
        tm.depolarize_cells(&[0, 1], &[5, 6], false).unwrap();

        assert_eq!(tm.predicted_cells(), &[0, 1, 9]);
    }

    #[test]
    fn test_apical_support_alone_predicts_nothing() {
        let mut tm = tiebreak_memory(true);
        tm.depolarize_cells(&[], &[5, 6], false).unwrap();

        assert_eq!(tm.apical_predicted_cells(), vec![0]);
        assert!(tm.predicted_cells().is_empty());
    }

    fn reduced_threshold_memory(use_modulation: bool) -> ApicalTiebreakTemporalMemory {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            activation_threshold: 13,
            reduced_basal_threshold: 8,
            min_threshold: 8,
            use_apical_modulation_basal_threshold: use_modulation,
            ..base_params()
        })
        .unwrap();

        let basal_bits: Vec<ElemSparse> = (0..10).collect();
        let apical_bits: Vec<ElemSparse> = (0..13).collect();
        // Cell 0 (column 0) has apical support, cell 4 (column 1) does not.
        add_segment(tm.basal_connections_mut(), 0, &basal_bits, 0.6);
        add_segment(tm.basal_connections_mut(), 4, &basal_bits, 0.6);
        add_segment(tm.apical_connections_mut(), 0, &apical_bits, 0.6);
        tm
    }

    #[test]
    fn test_reduced_threshold_applies_to_apically_supported_cell() {
        let mut tm = reduced_threshold_memory(true);
        let basal_input: Vec<ElemSparse> = (0..20).collect();
        let apical_input: Vec<ElemSparse> = (0..13).collect();

        tm.depolarize_cells(&basal_input, &apical_input, false).unwrap();

        assert_eq!(tm.active_basal_segments(), &[0]);
        assert_eq!(tm.matching_basal_segments(), &[0, 1]);
        assert_eq!(tm.predicted_cells(), &[0]);
    }

    #[test]
    fn test_reduced_threshold_ignored_while_learning() {
        let mut tm = reduced_threshold_memory(true);
        let basal_input: Vec<ElemSparse> = (0..20).collect();
        let apical_input: Vec<ElemSparse> = (0..13).collect();

        tm.depolarize_cells(&basal_input, &apical_input, true).unwrap();

        assert!(tm.active_basal_segments().is_empty());
        assert!(tm.predicted_cells().is_empty());
    }

    #[test]
    fn test_reduced_threshold_disabled() {
        let mut tm = reduced_threshold_memory(false);
        let basal_input: Vec<ElemSparse> = (0..20).collect();
        let apical_input: Vec<ElemSparse> = (0..13).collect();

        tm.depolarize_cells(&basal_input, &apical_input, false).unwrap();

        assert!(tm.active_basal_segments().is_empty());
    }

    #[test]
    fn test_depolarize_does_not_touch_connections() {
        let mut tm = tiebreak_memory(true);
        let before: Vec<Option<Permanence>> = (0..3).map(|s| tm.basal_connections().permanence(s, 0)).collect();

        tm.depolarize_cells(&[0, 1], &[5, 6], true).unwrap();

        let after: Vec<Option<Permanence>> = (0..3).map(|s| tm.basal_connections().permanence(s, 0)).collect();
        assert_eq!(before, after);
        assert_eq!(tm.basal_connections().num_synapses(), 6);
    }
}

// =============================================================================
// ACTIVATION AND LEARNING
// =============================================================================

mod learning {
    use super::*;

    #[test]
    fn test_bursting_column_has_exactly_one_winner() {
        let mut tm = ApicalTiebreakTemporalMemory::new(base_params()).unwrap();
        tm.depolarize_cells(&[], &[], true).unwrap();
        tm.activate_cells(&[0, 2, 3], &[], &[], &[40, 41], &[], true).unwrap();

        assert_eq!(tm.active_cells(), &[0, 1, 2, 3, 8, 9, 10, 11, 12, 13, 14, 15]);
        let winner_columns: Vec<ColumnIdx> = tm.winner_cells().iter().map(|&c| tm.cell_column(c)).collect();
        assert_eq!(winner_columns, vec![0, 2, 3]);
    }

    #[test]
    fn test_new_segment_synapse_count() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            sample_size: 3,
            initial_permanence: 0.21,
            ..base_params()
        })
        .unwrap();
        let growth: Vec<ElemSparse> = (10..16).collect();

        tm.depolarize_cells(&[], &[], true).unwrap();
        tm.activate_cells(&[2], &[], &[], &growth, &[], true).unwrap();

        let winner = tm.winner_cells()[0];
        let segments = tm.basal_connections().segments_for_cell(winner).to_vec();
        assert_eq!(segments.len(), 1);

        let synapses = tm.basal_connections().synapses_for_segment(segments[0]);
        assert_eq!(synapses.len(), 3);
        for &synapse in synapses {
            let data = tm.basal_connections().data_for_synapse(synapse);
            assert!((data.permanence - 0.21).abs() < EPSILON);
            assert!(growth.contains(&data.presynaptic_bit));
        }

        // Column mates of the winner got nothing.
        let column_cells = (8..12).filter(|&c| c != winner);
        for cell in column_cells {
            assert!(tm.basal_connections().segments_for_cell(cell).is_empty());
        }
    }

    #[test]
    fn test_new_segment_respects_max_synapses() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            sample_size: 10,
            max_synapses_per_segment: 2,
            ..base_params()
        })
        .unwrap();

        tm.depolarize_cells(&[], &[], true).unwrap();
        tm.activate_cells(&[1], &[], &[], &[1, 2, 3, 4, 5], &[], true).unwrap();

        let winner = tm.winner_cells()[0];
        let segment = tm.basal_connections().segments_for_cell(winner)[0];
        assert_eq!(tm.basal_connections().synapses_for_segment(segment).len(), 2);
    }

    #[test]
    fn test_correct_prediction_reinforces_segment() {
        let mut tm = ApicalTiebreakTemporalMemory::new(base_params()).unwrap();
        let segment = add_segment(tm.basal_connections_mut(), 5, &[0, 1, 7], 0.6);

        tm.depolarize_cells(&[0, 1], &[], true).unwrap();
        assert_eq!(tm.predicted_cells(), &[5]);

        tm.activate_cells(&[1], &[0, 1], &[], &[0, 1], &[], true).unwrap();

        assert_eq!(tm.active_cells(), &[5]);
        assert_eq!(tm.predicted_active_cells(), &[5]);
        assert_eq!(tm.winner_cells(), &[5]);

        let conn = tm.basal_connections();
        assert!((conn.permanence(segment, 0).unwrap() - 0.7).abs() < EPSILON);
        assert!((conn.permanence(segment, 1).unwrap() - 0.7).abs() < EPSILON);
        assert!((conn.permanence(segment, 7).unwrap() - 0.5).abs() < EPSILON);
        assert_eq!(conn.num_segments(), 1);
    }

    #[test]
    fn test_bursting_column_learns_on_best_matching_segment() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            activation_threshold: 3,
            reduced_basal_threshold: 3,
            ..base_params()
        })
        .unwrap();
        // Both below activation; cell 6 has the larger potential overlap.
        let weak = add_segment(tm.basal_connections_mut(), 4, &[0], 0.3);
        let strong = add_segment(tm.basal_connections_mut(), 6, &[0, 1], 0.3);

        tm.depolarize_cells(&[0, 1], &[], true).unwrap();
        assert!(tm.predicted_cells().is_empty());
        assert_eq!(tm.matching_basal_segments(), &[weak, strong]);

        tm.activate_cells(&[1], &[0, 1], &[], &[0, 1, 2], &[], true).unwrap();

        assert_eq!(tm.active_cells(), &[4, 5, 6, 7]);
        assert_eq!(tm.winner_cells(), &[6]);
        assert_eq!(tm.basal_connections().num_segments(), 2);
        // Grew to every remaining candidate.
        assert_eq!(tm.basal_connections().presynaptic_bits_for_segment(strong), vec![0, 1, 2]);
        assert_eq!(tm.basal_connections().presynaptic_bits_for_segment(weak), vec![0]);
    }

    #[test]
    fn test_apical_segment_grows_on_winner() {
        let mut tm = ApicalTiebreakTemporalMemory::new(base_params()).unwrap();
        tm.depolarize_cells(&[], &[], true).unwrap();
        tm.activate_cells(&[3], &[], &[], &[1, 2], &[20, 21], true).unwrap();

        let winner = tm.winner_cells()[0];
        let segments = tm.apical_connections().segments_for_cell(winner).to_vec();
        assert_eq!(segments.len(), 1);
        assert_eq!(tm.apical_connections().presynaptic_bits_for_segment(segments[0]), vec![20, 21]);
        assert_eq!(tm.apical_connections().num_segments(), 1);
    }

    #[test]
    fn test_punishes_matching_segment_in_inactive_column() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            basal_predicted_segment_decrement: 0.05,
            ..base_params()
        })
        .unwrap();
        let rewarded = add_segment(tm.basal_connections_mut(), 0, &[0, 1], 0.6);
        let punished = add_segment(tm.basal_connections_mut(), 13, &[0, 1, 5], 0.6);
        let decaying = add_segment(tm.basal_connections_mut(), 14, &[0], 0.03);

        tm.depolarize_cells(&[0, 1], &[], true).unwrap();
        tm.activate_cells(&[0], &[0, 1], &[], &[], &[], true).unwrap();

        let conn = tm.basal_connections();
        assert!((conn.permanence(punished, 0).unwrap() - 0.55).abs() < EPSILON);
        assert!((conn.permanence(punished, 1).unwrap() - 0.55).abs() < EPSILON);
        // Inactive bit is not touched by punishment.
        assert!((conn.permanence(punished, 5).unwrap() - 0.6).abs() < EPSILON);
        // Clamped at zero, which removes the synapse.
        assert_eq!(conn.permanence(decaying, 0), None);
        // The correctly predicting segment was reinforced, not punished.
        assert!((conn.permanence(rewarded, 0).unwrap() - 0.7).abs() < EPSILON);
    }

    #[test]
    fn test_no_punishment_when_decrement_is_zero() {
        let mut tm = ApicalTiebreakTemporalMemory::new(base_params()).unwrap();
        let segment = add_segment(tm.basal_connections_mut(), 13, &[0, 1], 0.6);

        tm.depolarize_cells(&[0, 1], &[], true).unwrap();
        tm.activate_cells(&[0], &[0, 1], &[], &[], &[], true).unwrap();

        assert!((tm.basal_connections().permanence(segment, 0).unwrap() - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_reset_clears_outputs() {
        let mut memory = PairMemory::new(base_params()).unwrap();
        memory.compute(&[0, 1], &[3, 4], &[5], None, None, true).unwrap();
        memory.compute(&[0, 1], &[3, 4], &[5], None, None, true).unwrap();
        assert!(!memory.active_cells().is_empty());

        memory.reset();
        assert!(memory.active_cells().is_empty());
        assert!(memory.winner_cells().is_empty());
        assert!(memory.predicted_active_cells().is_empty());

        memory.reset();
        assert!(memory.active_cells().is_empty());
    }
}

// =============================================================================
// END-TO-END SCENARIOS
// =============================================================================

mod scenarios {
    use super::*;

    fn scenario_params() -> ApicalTiebreakParams {
        ApicalTiebreakParams {
            column_count: 4,
            cells_per_column: 2,
            basal_input_size: 128,
            apical_input_size: 128,
            activation_threshold: 1,
            reduced_basal_threshold: 1,
            min_threshold: 1,
            sample_size: -1,
            initial_permanence: 0.5,
            connected_permanence: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_external_context_predicts_winners() {
        let mut memory = PairMemory::new(scenario_params()).unwrap();

        memory
            .compute(&[0, 1], &[], &[], Some(&[100, 101][..]), None, true)
            .unwrap();
        assert_eq!(memory.active_cells(), &[0, 1, 2, 3]);
        let winners = memory.winner_cells().to_vec();
        assert_eq!(winners.len(), 2);
        assert_eq!(memory.cell_column(winners[0]), 0);
        assert_eq!(memory.cell_column(winners[1]), 1);

        memory.compute(&[0, 1], &[100, 101], &[], None, None, true).unwrap();
        assert_eq!(memory.predicted_cells(), winners.as_slice());
        assert_eq!(memory.predicted_active_cells(), winners.as_slice());
        assert_eq!(memory.active_cells(), winners.as_slice());
    }

    #[test]
    fn test_disabled_apical_punishment_leaves_apical_synapses() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            apical_predicted_segment_decrement: 0.0,
            ..scenario_params()
        })
        .unwrap();

        // Matching apical segments on every cell of the inactive columns.
        let segments: Vec<Segment> = (4..8)
            .map(|cell| add_segment(tm.apical_connections_mut(), cell, &[0, 1], 0.6))
            .collect();

        for _ in 0..5 {
            tm.depolarize_cells(&[], &[0, 1], true).unwrap();
            assert_eq!(tm.matching_apical_segments(), segments.as_slice());
            tm.activate_cells(&[0, 1], &[], &[0, 1], &[], &[], true).unwrap();
        }

        for &segment in &segments {
            assert_eq!(tm.apical_connections().synapses_for_segment(segment).len(), 2);
            for bit in [0, 1] {
                assert!((tm.apical_connections().permanence(segment, bit).unwrap() - 0.6).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_enabled_apical_punishment_decays_apical_synapses() {
        let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            apical_predicted_segment_decrement: 0.1,
            ..scenario_params()
        })
        .unwrap();
        let segment = add_segment(tm.apical_connections_mut(), 6, &[0, 1], 0.6);

        tm.depolarize_cells(&[], &[0, 1], true).unwrap();
        tm.activate_cells(&[0], &[], &[0, 1], &[], &[], true).unwrap();

        assert!((tm.apical_connections().permanence(segment, 0).unwrap() - 0.5).abs() < EPSILON);
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

mod properties {
    use super::*;

    fn random_params(seed: u64) -> ApicalTiebreakParams {
        ApicalTiebreakParams {
            column_count: 16,
            cells_per_column: 4,
            basal_input_size: 64,
            apical_input_size: 32,
            activation_threshold: 2,
            reduced_basal_threshold: 1,
            min_threshold: 1,
            sample_size: 4,
            initial_permanence: 0.55,
            connected_permanence: 0.5,
            basal_predicted_segment_decrement: 0.01,
            apical_predicted_segment_decrement: 0.01,
            seed,
            ..Default::default()
        }
    }

    fn step_strategy() -> impl Strategy<Value = (Vec<u32>, Vec<u32>, Vec<u32>, bool)> {
        (
            proptest::collection::vec(0u32..16, 0..6),
            proptest::collection::vec(0u32..64, 0..12),
            proptest::collection::vec(0u32..32, 0..8),
            any::<bool>(),
        )
    }

    fn is_sorted_unique(values: &[u32]) -> bool {
        values.windows(2).all(|w| w[0] < w[1])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_predicted_cells_have_active_segments(
            steps in proptest::collection::vec(step_strategy(), 1..12),
            seed in any::<u64>()
        ) {
            let mut memory = PairMemory::new(random_params(seed)).unwrap();

            for (columns, basal, apical, learn) in steps {
                memory.compute(&columns, &basal, &apical, None, None, learn).unwrap();

                let supported: HashSet<CellIdx> = memory
                    .basal_predicted_cells()
                    .into_iter()
                    .chain(memory.apical_predicted_cells())
                    .collect();
                for cell in memory.predicted_cells() {
                    prop_assert!(supported.contains(cell));
                }

                prop_assert!(is_sorted_unique(memory.predicted_cells()));
                prop_assert!(is_sorted_unique(memory.active_cells()));
                prop_assert!(is_sorted_unique(memory.winner_cells()));
                prop_assert!(is_sorted_unique(memory.predicted_active_cells()));
            }
        }

        #[test]
        fn prop_every_active_column_has_one_winner(
            steps in proptest::collection::vec(step_strategy(), 1..12),
            seed in any::<u64>()
        ) {
            let mut memory = PairMemory::new(random_params(seed)).unwrap();

            for (columns, basal, apical, learn) in steps {
                memory.compute(&columns, &basal, &apical, None, None, learn).unwrap();

                let active_columns: HashSet<ColumnIdx> = columns.iter().copied().collect();
                let predicted_columns: HashSet<ColumnIdx> = memory
                    .predicted_active_cells()
                    .iter()
                    .map(|&c| memory.cell_column(c))
                    .collect();

                for &column in &active_columns {
                    let winners = memory
                        .winner_cells()
                        .iter()
                        .filter(|&&c| memory.cell_column(c) == column)
                        .count();
                    if !predicted_columns.contains(&column) {
                        prop_assert_eq!(winners, 1);
                    }
                    prop_assert!(winners >= 1);
                }

                // Winners and active cells only ever come from active columns.
                for &cell in memory.winner_cells().iter().chain(memory.active_cells()) {
                    prop_assert!(active_columns.contains(&memory.cell_column(cell)));
                }
            }
        }

        #[test]
        fn prop_same_seed_same_outputs(
            steps in proptest::collection::vec(step_strategy(), 1..10),
            seed in any::<u64>()
        ) {
            let mut first = PairMemory::new(random_params(seed)).unwrap();
            let mut second = PairMemory::new(random_params(seed)).unwrap();

            for (columns, basal, apical, learn) in steps {
                first.compute(&columns, &basal, &apical, None, None, learn).unwrap();
                second.compute(&columns, &basal, &apical, None, None, learn).unwrap();

                prop_assert_eq!(first.active_cells(), second.active_cells());
                prop_assert_eq!(first.winner_cells(), second.winner_cells());
                prop_assert_eq!(first.predicted_cells(), second.predicted_cells());
                prop_assert_eq!(
                    first.basal_connections().num_synapses(),
                    second.basal_connections().num_synapses()
                );
            }
        }

        #[test]
        fn prop_permanences_stay_in_unit_interval(
            steps in proptest::collection::vec(step_strategy(), 1..12),
            seed in any::<u64>()
        ) {
            let mut memory = PairMemory::new(random_params(seed)).unwrap();

            for (columns, basal, apical, learn) in steps {
                memory.compute(&columns, &basal, &apical, None, None, learn).unwrap();
            }

            for conn in [memory.basal_connections(), memory.apical_connections()] {
                for segment in conn.live_segments() {
                    for &synapse in conn.synapses_for_segment(segment) {
                        let permanence = conn.data_for_synapse(synapse).permanence;
                        prop_assert!(permanence > MIN_PERMANENCE && permanence <= MAX_PERMANENCE);
                    }
                }
            }
        }
    }
}
