//! Apical Tiebreak Temporal Memory.
//!
//! The orchestrator owns the basal and apical connectivity graphs and runs
//! the two-phase step protocol:
//!
//! 1. [`depolarize_cells`](ApicalTiebreakTemporalMemory::depolarize_cells)
//!    computes segment activity and the predicted cells. It never mutates
//!    connectivity.
//! 2. [`activate_cells`](ApicalTiebreakTemporalMemory::activate_cells)
//!    takes the actual active columns, activates cells and (when learning)
//!    updates both graphs.
//!
//! `activate_cells` uses the predictions of the most recent
//! `depolarize_cells` call. Calling it without depolarizing first for the
//! same step learns from stale predictions; nothing detects this.

use crate::algorithms::learning::{self, GrowthParams};
use crate::algorithms::segment_activity::ActivityThresholds;
use crate::algorithms::tiebreak;
use crate::algorithms::{SegmentActivity, SegmentConnections};
use crate::error::{Result, TiebreakError};
use crate::types::{CellIdx, ColumnIdx, ElemSparse, Int, Permanence, Segment, UInt, UNLIMITED};
use crate::utils::{sparse, Random};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, trace};

/// Parameters for creating an Apical Tiebreak Temporal Memory.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApicalTiebreakParams {
    /// Number of minicolumns.
    pub column_count: UInt,

    /// Number of cells per minicolumn.
    pub cells_per_column: UInt,

    /// Size of the basal input space.
    pub basal_input_size: UInt,

    /// Size of the apical input space.
    pub apical_input_size: UInt,

    /// Connected overlap at which a segment becomes active.
    pub activation_threshold: UInt,

    /// Activation threshold for basal segments on cells with an active
    /// apical segment.
    pub reduced_basal_threshold: UInt,

    /// Potential overlap at which a segment becomes matching.
    pub min_threshold: UInt,

    /// Initial permanence for new synapses.
    pub initial_permanence: Permanence,

    /// Permanence threshold for connected synapses.
    pub connected_permanence: Permanence,

    /// Amount to increment permanence for active synapses.
    pub permanence_increment: Permanence,

    /// Amount to decrement permanence for inactive synapses.
    pub permanence_decrement: Permanence,

    /// Desired number of active synapses on a learning segment, or `-1` to
    /// grow to every candidate.
    pub sample_size: Int,

    /// Punishment for basal segments that predicted an inactive column.
    /// Zero disables punishment.
    pub basal_predicted_segment_decrement: Permanence,

    /// Punishment for apical segments that predicted an inactive column.
    /// Zero disables punishment.
    pub apical_predicted_segment_decrement: Permanence,

    /// Maximum synapses per segment, or `-1` for no limit.
    pub max_synapses_per_segment: Int,

    /// Random seed.
    pub seed: u64,

    /// Let fully depolarized cells inhibit partly depolarized column mates.
    pub use_apical_tiebreak: bool,

    /// Lower the basal activation threshold on cells with active apical
    /// segments (only when not learning).
    pub use_apical_modulation_basal_threshold: bool,
}

impl Default for ApicalTiebreakParams {
    fn default() -> Self {
        Self {
            column_count: 2048,
            cells_per_column: 32,
            basal_input_size: 0,
            apical_input_size: 0,
            activation_threshold: 13,
            reduced_basal_threshold: 13,
            min_threshold: 10,
            initial_permanence: 0.21,
            connected_permanence: 0.5,
            permanence_increment: 0.1,
            permanence_decrement: 0.1,
            sample_size: 20,
            basal_predicted_segment_decrement: 0.0,
            apical_predicted_segment_decrement: 0.0,
            max_synapses_per_segment: UNLIMITED,
            seed: 42,
            use_apical_tiebreak: true,
            use_apical_modulation_basal_threshold: true,
        }
    }
}

impl ApicalTiebreakParams {
    /// Checks every parameter. Values are never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.column_count == 0 {
            return Err(invalid("column_count", "Must be > 0"));
        }
        if self.cells_per_column == 0 {
            return Err(invalid("cells_per_column", "Must be > 0"));
        }
        self.column_count
            .checked_mul(self.cells_per_column)
            .ok_or_else(|| invalid("cells_per_column", "Total cell count overflows u32"))?;

        if self.activation_threshold == 0 {
            return Err(invalid("activation_threshold", "Must be > 0"));
        }
        if self.min_threshold == 0 {
            return Err(invalid("min_threshold", "Must be > 0"));
        }
        if self.reduced_basal_threshold == 0 || self.reduced_basal_threshold > self.activation_threshold {
            return Err(invalid(
                "reduced_basal_threshold",
                format!(
                    "Must be in [1, activation_threshold = {}], got {}",
                    self.activation_threshold, self.reduced_basal_threshold
                ),
            ));
        }

        for (name, value) in [
            ("initial_permanence", self.initial_permanence),
            ("connected_permanence", self.connected_permanence),
            ("permanence_increment", self.permanence_increment),
            ("permanence_decrement", self.permanence_decrement),
            ("basal_predicted_segment_decrement", self.basal_predicted_segment_decrement),
            ("apical_predicted_segment_decrement", self.apical_predicted_segment_decrement),
        ] {
            check_unit_interval(name, value)?;
        }

        if self.sample_size < UNLIMITED {
            return Err(invalid(
                "sample_size",
                format!("Must be >= 0 or -1 for unlimited, got {}", self.sample_size),
            ));
        }
        if self.max_synapses_per_segment < UNLIMITED || self.max_synapses_per_segment == 0 {
            return Err(invalid(
                "max_synapses_per_segment",
                format!(
                    "Must be > 0 or -1 for unlimited, got {}",
                    self.max_synapses_per_segment
                ),
            ));
        }

        Ok(())
    }
}

fn invalid(name: &'static str, message: impl Into<String>) -> TiebreakError {
    TiebreakError::InvalidParameter {
        name,
        message: message.into(),
    }
}

fn check_unit_interval(name: &'static str, value: Permanence) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, format!("Must be in [0, 1], got {value}")))
    }
}

/// The Apical Tiebreak Temporal Memory.
///
/// Cells are addressed as `column * cells_per_column + offset`. Basal
/// segments listen to the basal input space, apical segments to the apical
/// input space. All outputs are sorted cell indices.
///
/// # Example
///
/// ```rust
/// use tiebreak_tm::algorithms::{ApicalTiebreakParams, ApicalTiebreakTemporalMemory};
///
/// let mut tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
///     column_count: 16,
///     cells_per_column: 4,
///     basal_input_size: 64,
///     apical_input_size: 64,
///     ..Default::default()
/// })
/// .unwrap();
///
/// tm.depolarize_cells(&[], &[], true).unwrap();
/// tm.activate_cells(&[2, 7], &[], &[], &[1, 2, 3], &[], true).unwrap();
///
/// assert_eq!(tm.active_cells(), &[8, 9, 10, 11, 28, 29, 30, 31]);
/// assert_eq!(tm.winner_cells().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ApicalTiebreakTemporalMemory {
    // Configuration
    column_count: UInt,
    cells_per_column: UInt,
    basal_input_size: UInt,
    apical_input_size: UInt,
    activation_threshold: UInt,
    reduced_basal_threshold: UInt,
    min_threshold: UInt,
    initial_permanence: Permanence,
    connected_permanence: Permanence,
    permanence_increment: Permanence,
    permanence_decrement: Permanence,
    sample_size: Int,
    basal_predicted_segment_decrement: Permanence,
    apical_predicted_segment_decrement: Permanence,
    max_synapses_per_segment: Int,
    use_apical_tiebreak: bool,
    use_apical_modulation_basal_threshold: bool,

    // Connections
    basal_connections: SegmentConnections,
    apical_connections: SegmentConnections,

    // State
    active_cells: Vec<CellIdx>,
    winner_cells: Vec<CellIdx>,
    predicted_cells: Vec<CellIdx>,
    predicted_active_cells: Vec<CellIdx>,
    basal: SegmentActivity,
    apical: SegmentActivity,

    // RNG
    rng: Random,
}

impl ApicalTiebreakTemporalMemory {
    /// Creates a new memory with the given parameters.
    pub fn new(params: ApicalTiebreakParams) -> Result<Self> {
        params.validate()?;

        let num_cells = params.column_count as usize * params.cells_per_column as usize;

        debug!(
            columns = params.column_count,
            cells_per_column = params.cells_per_column,
            basal_input_size = params.basal_input_size,
            apical_input_size = params.apical_input_size,
            seed = params.seed,
            "created apical tiebreak temporal memory"
        );

        Ok(Self {
            column_count: params.column_count,
            cells_per_column: params.cells_per_column,
            basal_input_size: params.basal_input_size,
            apical_input_size: params.apical_input_size,
            activation_threshold: params.activation_threshold,
            reduced_basal_threshold: params.reduced_basal_threshold,
            min_threshold: params.min_threshold,
            initial_permanence: params.initial_permanence,
            connected_permanence: params.connected_permanence,
            permanence_increment: params.permanence_increment,
            permanence_decrement: params.permanence_decrement,
            sample_size: params.sample_size,
            basal_predicted_segment_decrement: params.basal_predicted_segment_decrement,
            apical_predicted_segment_decrement: params.apical_predicted_segment_decrement,
            max_synapses_per_segment: params.max_synapses_per_segment,
            use_apical_tiebreak: params.use_apical_tiebreak,
            use_apical_modulation_basal_threshold: params.use_apical_modulation_basal_threshold,

            basal_connections: SegmentConnections::new(num_cells, params.basal_input_size as usize),
            apical_connections: SegmentConnections::new(num_cells, params.apical_input_size as usize),

            active_cells: Vec::new(),
            winner_cells: Vec::new(),
            predicted_cells: Vec::new(),
            predicted_active_cells: Vec::new(),
            basal: SegmentActivity::default(),
            apical: SegmentActivity::default(),

            rng: Random::new(params.seed),
        })
    }

    /// Clears all per-step state. Call between independent sequences.
    pub fn reset(&mut self) {
        self.active_cells.clear();
        self.winner_cells.clear();
        self.predicted_cells.clear();
        self.predicted_active_cells.clear();
        self.basal.clear();
        self.apical.clear();
        debug!("reset temporal memory state");
    }

    /// Computes segment activity and the predicted cells for the next
    /// [`activate_cells`](Self::activate_cells) call.
    ///
    /// Does not modify connectivity. `learn` only decides whether the
    /// apical-modulated basal threshold applies (it never does while
    /// learning).
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::IndexOutOfBounds`] if an input bit lies
    /// outside its input space. State is untouched in that case.
    pub fn depolarize_cells(
        &mut self,
        basal_input: &[ElemSparse],
        apical_input: &[ElemSparse],
        learn: bool,
    ) -> Result<()> {
        let basal_input = self.normalize_basal(basal_input, "basal input")?;
        let apical_input = self.normalize_apical(apical_input, "apical input")?;
        let thresholds = self.thresholds();

        let apical = SegmentActivity::compute(&self.apical_connections, &apical_input, &thresholds);

        let reduced_threshold_cells = if learn || !self.use_apical_modulation_basal_threshold {
            Vec::new()
        } else {
            apical.active_cells(&self.apical_connections)
        };

        let basal = tiebreak::basal_segment_activity(
            &self.basal_connections,
            &basal_input,
            &reduced_threshold_cells,
            &thresholds,
            self.reduced_basal_threshold,
        );

        self.predicted_cells = tiebreak::predicted_cells(
            &basal.active_cells(&self.basal_connections),
            &apical.active_cells(&self.apical_connections),
            self.cells_per_column as usize,
            self.use_apical_tiebreak,
        );

        trace!(
            active_basal = basal.active.len(),
            matching_basal = basal.matching.len(),
            active_apical = apical.active.len(),
            matching_apical = apical.matching.len(),
            predicted = self.predicted_cells.len(),
            "depolarized cells"
        );

        self.basal = basal;
        self.apical = apical;
        Ok(())
    }

    /// Activates cells in the given columns and, when `learn` is set, learns
    /// on both connectivity graphs.
    ///
    /// Correctly predicted cells become active; columns with no predicted
    /// cell burst. Reinforce candidates are the inputs whose synapses get
    /// strengthened; growth candidates are the inputs new synapses may
    /// connect to.
    ///
    /// Precondition: [`depolarize_cells`](Self::depolarize_cells) has been
    /// called for this step.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::IndexOutOfBounds`] if a column or input bit is
    /// out of range. Validation happens before any mutation.
    pub fn activate_cells(
        &mut self,
        active_columns: &[ColumnIdx],
        basal_reinforce_candidates: &[ElemSparse],
        apical_reinforce_candidates: &[ElemSparse],
        basal_growth_candidates: &[ElemSparse],
        apical_growth_candidates: &[ElemSparse],
        learn: bool,
    ) -> Result<()> {
        let active_columns = sparse::normalize(active_columns, self.column_count as usize, "active column")?;
        let basal_reinforce = self.normalize_basal(basal_reinforce_candidates, "basal reinforce candidate")?;
        let apical_reinforce = self.normalize_apical(apical_reinforce_candidates, "apical reinforce candidate")?;
        let basal_growth = self.normalize_basal(basal_growth_candidates, "basal growth candidate")?;
        let apical_growth = self.normalize_apical(apical_growth_candidates, "apical growth candidate")?;

        let cells_per_column = self.cells_per_column as usize;

        // Calculate active cells
        let (correct_predicted_cells, bursting_columns) =
            sparse::set_compare_by_column(&self.predicted_cells, &active_columns, cells_per_column);
        let mut new_active_cells = correct_predicted_cells.clone();
        new_active_cells.extend(sparse::cells_for_columns(&bursting_columns, cells_per_column));
        new_active_cells.sort_unstable();

        // Calculate learning
        let basal_learning = learning::calculate_basal_learning(
            &self.basal_connections,
            &mut self.rng,
            &active_columns,
            &bursting_columns,
            &correct_predicted_cells,
            &self.basal,
            cells_per_column,
        );
        let apical_learning = learning::calculate_apical_learning(
            &self.apical_connections,
            &basal_learning.learning_cells,
            &active_columns,
            &self.apical,
            cells_per_column,
        );

        if learn {
            let growth = self.growth_params();

            // Learn on existing segments
            for segments in [&basal_learning.active_segments, &basal_learning.matching_segments] {
                learning::learn(
                    &mut self.basal_connections,
                    &mut self.rng,
                    segments,
                    &basal_reinforce,
                    &basal_growth,
                    &self.basal,
                    &growth,
                );
            }
            for segments in [&apical_learning.active_segments, &apical_learning.matching_segments] {
                learning::learn(
                    &mut self.apical_connections,
                    &mut self.rng,
                    segments,
                    &apical_reinforce,
                    &apical_growth,
                    &self.apical,
                    &growth,
                );
            }

            // Punish incorrect predictions
            if self.basal_predicted_segment_decrement != 0.0 {
                self.basal_connections.adjust_active_synapses(
                    &basal_learning.segments_to_punish,
                    &basal_reinforce,
                    -self.basal_predicted_segment_decrement,
                );
            }
            if self.apical_predicted_segment_decrement != 0.0 {
                self.apical_connections.adjust_active_synapses(
                    &apical_learning.segments_to_punish,
                    &apical_reinforce,
                    -self.apical_predicted_segment_decrement,
                );
            }

            // Grow new segments
            if !basal_growth.is_empty() {
                learning::learn_on_new_segments(
                    &mut self.basal_connections,
                    &mut self.rng,
                    &basal_learning.new_segment_cells,
                    &basal_growth,
                    &growth,
                );
            }
            if !apical_growth.is_empty() {
                learning::learn_on_new_segments(
                    &mut self.apical_connections,
                    &mut self.rng,
                    &apical_learning.new_segment_cells,
                    &apical_growth,
                    &growth,
                );
            }

            debug!(
                bursting_columns = bursting_columns.len(),
                new_basal_segments = if basal_growth.is_empty() { 0 } else { basal_learning.new_segment_cells.len() },
                new_apical_segments = if apical_growth.is_empty() { 0 } else { apical_learning.new_segment_cells.len() },
                punished_basal = basal_learning.segments_to_punish.len(),
                punished_apical = apical_learning.segments_to_punish.len(),
                "learned"
            );
        }

        trace!(
            active_columns = active_columns.len(),
            active_cells = new_active_cells.len(),
            predicted_active = correct_predicted_cells.len(),
            winners = basal_learning.learning_cells.len(),
            "activated cells"
        );

        self.active_cells = new_active_cells;
        self.winner_cells = basal_learning.learning_cells;
        self.predicted_active_cells = correct_predicted_cells;
        Ok(())
    }

    fn normalize_basal(&self, bits: &[ElemSparse], name: &'static str) -> Result<Vec<ElemSparse>> {
        sparse::normalize(bits, self.basal_input_size as usize, name)
    }

    pub(crate) fn normalize_apical(&self, bits: &[ElemSparse], name: &'static str) -> Result<Vec<ElemSparse>> {
        sparse::normalize(bits, self.apical_input_size as usize, name)
    }

    fn thresholds(&self) -> ActivityThresholds {
        ActivityThresholds {
            connected_permanence: self.connected_permanence,
            activation_threshold: self.activation_threshold,
            min_threshold: self.min_threshold,
        }
    }

    fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            initial_permanence: self.initial_permanence,
            permanence_increment: self.permanence_increment,
            permanence_decrement: self.permanence_decrement,
            sample_size: self.sample_size,
            max_synapses_per_segment: self.max_synapses_per_segment,
        }
    }

    /// Current configuration as a parameter struct.
    pub fn params(&self) -> ApicalTiebreakParams {
        ApicalTiebreakParams {
            column_count: self.column_count,
            cells_per_column: self.cells_per_column,
            basal_input_size: self.basal_input_size,
            apical_input_size: self.apical_input_size,
            activation_threshold: self.activation_threshold,
            reduced_basal_threshold: self.reduced_basal_threshold,
            min_threshold: self.min_threshold,
            initial_permanence: self.initial_permanence,
            connected_permanence: self.connected_permanence,
            permanence_increment: self.permanence_increment,
            permanence_decrement: self.permanence_decrement,
            sample_size: self.sample_size,
            basal_predicted_segment_decrement: self.basal_predicted_segment_decrement,
            apical_predicted_segment_decrement: self.apical_predicted_segment_decrement,
            max_synapses_per_segment: self.max_synapses_per_segment,
            seed: self.rng.seed(),
            use_apical_tiebreak: self.use_apical_tiebreak,
            use_apical_modulation_basal_threshold: self.use_apical_modulation_basal_threshold,
        }
    }

    // ========================================================================
    // Cell/Column utilities
    // ========================================================================

    /// Returns the cell index for a column and cell offset.
    ///
    /// `column` must be below the column count and `cell_offset` below
    /// `cells_per_column`.
    #[inline]
    pub fn column_cell(&self, column: ColumnIdx, cell_offset: UInt) -> CellIdx {
        debug_assert!(column < self.column_count, "column {column} out of range");
        debug_assert!(cell_offset < self.cells_per_column, "cell offset {cell_offset} out of range");
        column * self.cells_per_column + cell_offset
    }

    /// Returns the column of a cell.
    #[inline]
    pub fn cell_column(&self, cell: CellIdx) -> ColumnIdx {
        sparse::column_for_cell(cell, self.cells_per_column as usize)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Active cells of the last step, sorted.
    pub fn active_cells(&self) -> &[CellIdx] {
        &self.active_cells
    }

    /// Cells that were predicted and became active in the last step, sorted.
    pub fn predicted_active_cells(&self) -> &[CellIdx] {
        &self.predicted_active_cells
    }

    /// Cells selected for learning in the last step, sorted.
    pub fn winner_cells(&self) -> &[CellIdx] {
        &self.winner_cells
    }

    /// Cells predicted by the last `depolarize_cells`, sorted.
    pub fn predicted_cells(&self) -> &[CellIdx] {
        &self.predicted_cells
    }

    /// Distinct cells with an active basal segment, sorted.
    pub fn basal_predicted_cells(&self) -> Vec<CellIdx> {
        self.basal.active_cells(&self.basal_connections)
    }

    /// Distinct cells with an active apical segment, sorted.
    pub fn apical_predicted_cells(&self) -> Vec<CellIdx> {
        self.apical.active_cells(&self.apical_connections)
    }

    /// Active basal segments of the last depolarization.
    pub fn active_basal_segments(&self) -> &[Segment] {
        &self.basal.active
    }

    /// Matching basal segments of the last depolarization.
    pub fn matching_basal_segments(&self) -> &[Segment] {
        &self.basal.matching
    }

    /// Active apical segments of the last depolarization.
    pub fn active_apical_segments(&self) -> &[Segment] {
        &self.apical.active
    }

    /// Matching apical segments of the last depolarization.
    pub fn matching_apical_segments(&self) -> &[Segment] {
        &self.apical.matching
    }

    /// Returns the basal connectivity graph.
    pub fn basal_connections(&self) -> &SegmentConnections {
        &self.basal_connections
    }

    /// Returns the apical connectivity graph.
    pub fn apical_connections(&self) -> &SegmentConnections {
        &self.apical_connections
    }

    /// Mutable access to the basal graph, e.g. to seed segments by hand.
    pub fn basal_connections_mut(&mut self) -> &mut SegmentConnections {
        &mut self.basal_connections
    }

    /// Mutable access to the apical graph.
    pub fn apical_connections_mut(&mut self) -> &mut SegmentConnections {
        &mut self.apical_connections
    }

    /// Returns the number of columns.
    pub fn number_of_columns(&self) -> usize {
        self.column_count as usize
    }

    /// Returns the total number of cells.
    pub fn number_of_cells(&self) -> usize {
        self.column_count as usize * self.cells_per_column as usize
    }

    /// Returns the number of cells per column.
    pub fn cells_per_column(&self) -> UInt {
        self.cells_per_column
    }

    /// Returns the basal input size.
    pub fn basal_input_size(&self) -> UInt {
        self.basal_input_size
    }

    /// Returns the apical input size.
    pub fn apical_input_size(&self) -> UInt {
        self.apical_input_size
    }

    /// Returns the activation threshold.
    pub fn activation_threshold(&self) -> UInt {
        self.activation_threshold
    }

    /// Sets the activation threshold.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_activation_threshold(&mut self, value: UInt) -> Result<()> {
        ApicalTiebreakParams {
            activation_threshold: value,
            ..self.params()
        }
        .validate()?;
        self.activation_threshold = value;
        Ok(())
    }

    /// Returns the reduced basal threshold.
    pub fn reduced_basal_threshold(&self) -> UInt {
        self.reduced_basal_threshold
    }

    /// Sets the reduced basal threshold.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_reduced_basal_threshold(&mut self, value: UInt) -> Result<()> {
        ApicalTiebreakParams {
            reduced_basal_threshold: value,
            ..self.params()
        }
        .validate()?;
        self.reduced_basal_threshold = value;
        Ok(())
    }

    /// Returns the minimum threshold for matching.
    pub fn min_threshold(&self) -> UInt {
        self.min_threshold
    }

    /// Sets the minimum threshold for matching.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_min_threshold(&mut self, value: UInt) -> Result<()> {
        ApicalTiebreakParams {
            min_threshold: value,
            ..self.params()
        }
        .validate()?;
        self.min_threshold = value;
        Ok(())
    }

    /// Returns the initial permanence.
    pub fn initial_permanence(&self) -> Permanence {
        self.initial_permanence
    }

    /// Sets the initial permanence.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_initial_permanence(&mut self, value: Permanence) -> Result<()> {
        ApicalTiebreakParams {
            initial_permanence: value,
            ..self.params()
        }
        .validate()?;
        self.initial_permanence = value;
        Ok(())
    }

    /// Returns the connected permanence threshold.
    pub fn connected_permanence(&self) -> Permanence {
        self.connected_permanence
    }

    /// Sets the connected permanence threshold.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_connected_permanence(&mut self, value: Permanence) -> Result<()> {
        ApicalTiebreakParams {
            connected_permanence: value,
            ..self.params()
        }
        .validate()?;
        self.connected_permanence = value;
        Ok(())
    }

    /// Returns the permanence increment.
    pub fn permanence_increment(&self) -> Permanence {
        self.permanence_increment
    }

    /// Sets the permanence increment.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_permanence_increment(&mut self, value: Permanence) -> Result<()> {
        ApicalTiebreakParams {
            permanence_increment: value,
            ..self.params()
        }
        .validate()?;
        self.permanence_increment = value;
        Ok(())
    }

    /// Returns the permanence decrement.
    pub fn permanence_decrement(&self) -> Permanence {
        self.permanence_decrement
    }

    /// Sets the permanence decrement.
    ///
    /// # Errors
    ///
    /// Returns [`TiebreakError::InvalidParameter`] if the new value fails
    /// [`ApicalTiebreakParams::validate`]. The memory is unchanged then.
    pub fn set_permanence_decrement(&mut self, value: Permanence) -> Result<()> {
        ApicalTiebreakParams {
            permanence_decrement: value,
            ..self.params()
        }
        .validate()?;
        self.permanence_decrement = value;
        Ok(())
    }

    /// Returns the sample size.
    pub fn sample_size(&self) -> Int {
        self.sample_size
    }

    /// Returns the basal predicted segment decrement.
    pub fn basal_predicted_segment_decrement(&self) -> Permanence {
        self.basal_predicted_segment_decrement
    }

    /// Returns the apical predicted segment decrement.
    pub fn apical_predicted_segment_decrement(&self) -> Permanence {
        self.apical_predicted_segment_decrement
    }

    /// Returns the maximum synapses per segment.
    pub fn max_synapses_per_segment(&self) -> Int {
        self.max_synapses_per_segment
    }

    /// Returns whether the apical tiebreak is enabled.
    pub fn use_apical_tiebreak(&self) -> bool {
        self.use_apical_tiebreak
    }

    /// Enables or disables the apical tiebreak.
    pub fn set_use_apical_tiebreak(&mut self, value: bool) {
        self.use_apical_tiebreak = value;
    }

    /// Returns whether apical modulation of the basal threshold is enabled.
    pub fn use_apical_modulation_basal_threshold(&self) -> bool {
        self.use_apical_modulation_basal_threshold
    }

    /// Enables or disables apical modulation of the basal threshold.
    pub fn set_use_apical_modulation_basal_threshold(&mut self, value: bool) {
        self.use_apical_modulation_basal_threshold = value;
    }
}
