//! Apical tiebreak rules.
//!
//! Apical (feedback) support influences prediction in two independent ways:
//!
//! 1. A cell with an active apical segment needs less basal evidence. Basal
//!    segments on such cells are active once their connected overlap reaches
//!    `reduced_basal_threshold` instead of `activation_threshold`.
//! 2. Within a minicolumn, a cell with both an active basal and an active
//!    apical segment (fully depolarized) inhibits every cell that has only an
//!    active basal segment (partly depolarized).

use crate::algorithms::segment_activity::{segments_where, ActivityThresholds, SegmentActivity};
use crate::algorithms::SegmentConnections;
use crate::types::{CellIdx, ElemSparse, SynapseIdx};
use crate::utils::sparse;

/// Classifies basal segments with the apical-modulated two-threshold rule.
///
/// Segments whose connected overlap lies in
/// `[reduced_basal_threshold, activation_threshold)` are active only when
/// their cell is in `reduced_threshold_cells` (sorted). Passing an empty
/// slice, or a reduced threshold equal to the activation threshold, yields
/// plain classification.
pub fn basal_segment_activity(
    connections: &SegmentConnections,
    active_input: &[ElemSparse],
    reduced_threshold_cells: &[CellIdx],
    thresholds: &ActivityThresholds,
    reduced_basal_threshold: SynapseIdx,
) -> SegmentActivity {
    let connected = connections.compute_activity(active_input, Some(thresholds.connected_permanence));
    let activation = thresholds.activation_threshold;

    let mut active = segments_where(connections, |s| connected[s as usize] >= activation);

    if reduced_basal_threshold != activation && !reduced_threshold_cells.is_empty() {
        let conditionally_active = segments_where(connections, |s| {
            let overlap = connected[s as usize];
            overlap < activation
                && overlap >= reduced_basal_threshold
                && sparse::contains(reduced_threshold_cells, connections.cell_for_segment(s))
        });
        active.extend(conditionally_active);
        active.sort_unstable();
    }

    let potential_overlaps = connections.compute_activity(active_input, None);
    let matching = segments_where(connections, |s| {
        potential_overlaps[s as usize] >= thresholds.min_threshold
    });

    SegmentActivity {
        active,
        matching,
        potential_overlaps,
    }
}

/// Derives the predicted cells from the cells with active basal and active
/// apical segments (both sorted, duplicate-free).
///
/// With `use_apical_tiebreak == false` the prediction is simply the basal
/// cells.
pub fn predicted_cells(
    basal_cells: &[CellIdx],
    apical_cells: &[CellIdx],
    cells_per_column: usize,
    use_apical_tiebreak: bool,
) -> Vec<CellIdx> {
    if !use_apical_tiebreak {
        return basal_cells.to_vec();
    }

    let fully_depolarized = sparse::intersection(basal_cells, apical_cells);
    let partly_depolarized = sparse::difference(basal_cells, &fully_depolarized);

    let winning_columns = sparse::sorted_unique(
        fully_depolarized
            .iter()
            .map(|&c| sparse::column_for_cell(c, cells_per_column))
            .collect(),
    );

    let mut predicted = fully_depolarized;
    predicted.extend(partly_depolarized.into_iter().filter(|&c| {
        !sparse::contains(&winning_columns, sparse::column_for_cell(c, cells_per_column))
    }));
    predicted.sort_unstable();
    predicted
}
