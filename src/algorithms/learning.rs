//! Learning rules shared by the basal and apical connectivity graphs.
//!
//! Basal learning decides which cells learn this step (correctly predicted
//! cells plus one winner per bursting column). Apical learning then works
//! strictly on those cells: it never adds learning cells, only apical
//! segments on cells that basal learning already chose.

use crate::algorithms::{SegmentActivity, SegmentConnections};
use crate::types::{CellIdx, ColumnIdx, ElemSparse, Int, Permanence, Segment, UNLIMITED};
use crate::utils::{sparse, Random};

/// Permanence and growth settings applied when a segment learns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthParams {
    /// Permanence of newly grown synapses.
    pub initial_permanence: Permanence,
    /// Added to synapses onto active (reinforce) bits.
    pub permanence_increment: Permanence,
    /// Subtracted from synapses onto inactive bits.
    pub permanence_decrement: Permanence,
    /// Desired active synapse count per segment, or `-1` for all candidates.
    pub sample_size: Int,
    /// Hard cap on synapses per segment, or `-1` for none.
    pub max_synapses_per_segment: Int,
}

/// Segments and cells selected by the basal learning rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasalLearning {
    /// Active segments on correctly predicted cells.
    pub active_segments: Vec<Segment>,
    /// Best matching segment of each bursting column that has one.
    pub matching_segments: Vec<Segment>,
    /// Matching segments whose column did not become active.
    pub segments_to_punish: Vec<Segment>,
    /// One cell per bursting column without a matching segment.
    pub new_segment_cells: Vec<CellIdx>,
    /// Every cell that learns this step, sorted.
    pub learning_cells: Vec<CellIdx>,
}

/// Segments and cells selected by the apical learning rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApicalLearning {
    /// Active apical segments on learning cells.
    pub active_segments: Vec<Segment>,
    /// Best matching apical segment of each learning cell without an active one.
    pub matching_segments: Vec<Segment>,
    /// Matching apical segments whose column did not become active.
    pub segments_to_punish: Vec<Segment>,
    /// Learning cells with neither an active nor a matching apical segment.
    pub new_segment_cells: Vec<CellIdx>,
}

/// Computes basal learning for one step.
///
/// `active_columns`, `bursting_columns` and `correct_predicted_cells` must be
/// sorted. Consumes one random value per bursting column without a matching
/// segment.
pub fn calculate_basal_learning(
    connections: &SegmentConnections,
    rng: &mut Random,
    active_columns: &[ColumnIdx],
    bursting_columns: &[ColumnIdx],
    correct_predicted_cells: &[CellIdx],
    basal: &SegmentActivity,
    cells_per_column: usize,
) -> BasalLearning {
    // Correctly predicted columns
    let active_segments = connections.filter_segments_by_cell(&basal.active, correct_predicted_cells);

    // Bursting columns
    let cells_for_matching = connections.map_segments_to_cells(&basal.matching);
    let matching_cells = sparse::sorted_unique(cells_for_matching.clone());
    let (matching_cells_in_bursting, bursting_without_match) =
        sparse::set_compare_by_column(&matching_cells, bursting_columns, cells_per_column);

    let matching_segments = choose_best_segment_per_column(
        connections,
        &matching_cells_in_bursting,
        basal,
        cells_per_column,
    );
    let new_segment_cells =
        cells_with_fewest_segments(connections, rng, &bursting_without_match, cells_per_column);

    let mut learning_cells = correct_predicted_cells.to_vec();
    learning_cells.extend(connections.map_segments_to_cells(&matching_segments));
    learning_cells.extend_from_slice(&new_segment_cells);
    let learning_cells = sparse::sorted_unique(learning_cells);

    // Incorrectly predicted columns
    let segments_to_punish = segments_in_inactive_columns(
        &basal.matching,
        &cells_for_matching,
        active_columns,
        cells_per_column,
    );

    BasalLearning {
        active_segments,
        matching_segments,
        segments_to_punish,
        new_segment_cells,
        learning_cells,
    }
}

/// Computes apical learning for the cells chosen by basal learning.
pub fn calculate_apical_learning(
    connections: &SegmentConnections,
    learning_cells: &[CellIdx],
    active_columns: &[ColumnIdx],
    apical: &SegmentActivity,
    cells_per_column: usize,
) -> ApicalLearning {
    // Cells with active apical segments
    let active_segments = connections.filter_segments_by_cell(&apical.active, learning_cells);

    // Cells with matching apical segments
    let cells_with_active = sparse::sorted_unique(connections.map_segments_to_cells(&active_segments));
    let without_active = sparse::difference(learning_cells, &cells_with_active);

    let cells_for_matching = connections.map_segments_to_cells(&apical.matching);
    let with_matching = sparse::intersection(
        &without_active,
        &sparse::sorted_unique(cells_for_matching.clone()),
    );
    let matching_segments = choose_best_segment_per_cell(connections, &with_matching, apical);

    // Cells that need a new apical segment
    let new_segment_cells = sparse::difference(&without_active, &with_matching);

    // Incorrectly predicted columns
    let segments_to_punish = segments_in_inactive_columns(
        &apical.matching,
        &cells_for_matching,
        active_columns,
        cells_per_column,
    );

    ApicalLearning {
        active_segments,
        matching_segments,
        segments_to_punish,
        new_segment_cells,
    }
}

/// Reinforces existing segments and grows them toward the growth candidates.
///
/// The number of new synapses per segment is `sample_size` minus the
/// segment's potential overlap (or every candidate when `sample_size` is
/// `-1`), further capped so the segment never exceeds
/// `max_synapses_per_segment`.
pub fn learn(
    connections: &mut SegmentConnections,
    rng: &mut Random,
    segments: &[Segment],
    reinforce_candidates: &[ElemSparse],
    growth_candidates: &[ElemSparse],
    activity: &SegmentActivity,
    params: &GrowthParams,
) {
    if segments.is_empty() {
        return;
    }

    connections.adjust_synapses(
        segments,
        reinforce_candidates,
        params.permanence_increment,
        -params.permanence_decrement,
    );

    let mut max_new: Vec<i64> = segments
        .iter()
        .map(|&s| {
            if params.sample_size == UNLIMITED {
                growth_candidates.len() as i64
            } else {
                i64::from(params.sample_size) - i64::from(activity.potential_overlap(s))
            }
        })
        .collect();

    if params.max_synapses_per_segment != UNLIMITED {
        let synapse_counts = connections.map_segments_to_synapse_counts(segments);
        for (limit, count) in max_new.iter_mut().zip(synapse_counts) {
            let to_reach_max = i64::from(params.max_synapses_per_segment) - count as i64;
            *limit = (*limit).min(to_reach_max);
        }
    }

    connections.grow_synapses_to_sample(
        segments,
        growth_candidates,
        &max_new,
        params.initial_permanence,
        rng,
    );
}

/// Creates one segment per cell and grows it toward the growth candidates.
///
/// Returns the new segment handles.
pub fn learn_on_new_segments(
    connections: &mut SegmentConnections,
    rng: &mut Random,
    cells: &[CellIdx],
    growth_candidates: &[ElemSparse],
    params: &GrowthParams,
) -> Vec<Segment> {
    let mut num_new = growth_candidates.len() as i64;
    if params.sample_size != UNLIMITED {
        num_new = num_new.min(i64::from(params.sample_size));
    }
    if params.max_synapses_per_segment != UNLIMITED {
        num_new = num_new.min(i64::from(params.max_synapses_per_segment));
    }

    let segments = connections.create_segments(cells);
    connections.grow_synapses_to_sample_uniform(
        &segments,
        growth_candidates,
        num_new,
        params.initial_permanence,
        rng,
    );
    segments
}

/// Picks, for each column, the matching segment with the highest potential
/// overlap among segments owned by `cells`. Ties go to the lowest handle.
/// The result is ordered by column.
pub fn choose_best_segment_per_column(
    connections: &SegmentConnections,
    cells: &[CellIdx],
    activity: &SegmentActivity,
    cells_per_column: usize,
) -> Vec<Segment> {
    let candidates = connections.filter_segments_by_cell(&activity.matching, cells);
    best_segment_per_group(connections, candidates, activity, |cell| {
        sparse::column_for_cell(cell, cells_per_column)
    })
}

/// Picks, for each cell, the matching segment with the highest potential
/// overlap. Ties go to the lowest handle. The result is ordered by cell.
pub fn choose_best_segment_per_cell(
    connections: &SegmentConnections,
    cells: &[CellIdx],
    activity: &SegmentActivity,
) -> Vec<Segment> {
    let candidates = connections.filter_segments_by_cell(&activity.matching, cells);
    best_segment_per_group(connections, candidates, activity, |cell| cell)
}

fn best_segment_per_group<F>(
    connections: &SegmentConnections,
    mut candidates: Vec<Segment>,
    activity: &SegmentActivity,
    group_of: F,
) -> Vec<Segment>
where
    F: Fn(CellIdx) -> u32,
{
    // Stable sort keeps ascending handle order inside each group.
    candidates.sort_by_key(|&s| group_of(connections.cell_for_segment(s)));

    let mut best: Vec<Segment> = Vec::new();
    let mut current_group = None;
    for segment in candidates {
        let group = group_of(connections.cell_for_segment(segment));
        match best.last_mut() {
            Some(last) if current_group == Some(group) => {
                if activity.potential_overlap(segment) > activity.potential_overlap(*last) {
                    *last = segment;
                }
            }
            _ => {
                best.push(segment);
                current_group = Some(group);
            }
        }
    }
    best
}

/// For each column, picks the cell with the fewest segments. Ties are broken
/// uniformly at random; exactly one random value is drawn per column.
pub fn cells_with_fewest_segments(
    connections: &SegmentConnections,
    rng: &mut Random,
    columns: &[ColumnIdx],
    cells_per_column: usize,
) -> Vec<CellIdx> {
    columns
        .iter()
        .map(|&column| {
            let cells = sparse::cells_for_columns(&[column], cells_per_column);
            let counts = connections.get_segment_counts(&cells);
            let fewest = counts.iter().copied().min().unwrap_or(0);

            let tied: Vec<CellIdx> = cells
                .into_iter()
                .zip(counts)
                .filter(|&(_, count)| count == fewest)
                .map(|(cell, _)| cell)
                .collect();

            tied[rng.choose_index(tied.len())]
        })
        .collect()
}

/// Matching segments (parallel to `cells_for_segments`) whose cell's column
/// is not in `active_columns`.
fn segments_in_inactive_columns(
    segments: &[Segment],
    cells_for_segments: &[CellIdx],
    active_columns: &[ColumnIdx],
    cells_per_column: usize,
) -> Vec<Segment> {
    segments
        .iter()
        .zip(cells_for_segments)
        .filter(|&(_, &cell)| {
            !sparse::contains(active_columns, sparse::column_for_cell(cell, cells_per_column))
        })
        .map(|(&segment, _)| segment)
        .collect()
}
