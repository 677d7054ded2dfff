//! Sequence memory: the basal input is the memory's own previous activity.

use crate::algorithms::{ApicalTiebreakParams, ApicalTiebreakTemporalMemory};
use crate::error::Result;
use crate::types::{CellIdx, ColumnIdx, ElemSparse};

use std::ops::{Deref, DerefMut};

use tracing::trace;

/// Learns sequences by feeding its previous active cells back as basal
/// input, with apical input buffered by one step.
///
/// The basal input space is the memory's own cell population, so
/// `basal_input_size` in the parameters is overridden with
/// `column_count * cells_per_column`.
///
/// Each [`compute`](Self::compute) first activates cells against the
/// prediction made at the end of the previous call, then depolarizes for the
/// next step. [`predicted_cells`](Self::predicted_cells) therefore reports
/// the prediction the current step was judged against, while
/// [`next_predicted_cells`](Self::next_predicted_cells) reports the one for
/// the upcoming step.
#[derive(Debug, Clone)]
pub struct SequenceMemory {
    tm: ApicalTiebreakTemporalMemory,
    prev_apical_input: Vec<ElemSparse>,
    prev_apical_growth_candidates: Vec<ElemSparse>,
    prev_predicted_cells: Vec<CellIdx>,
}

impl SequenceMemory {
    /// Creates a new sequence memory.
    pub fn new(params: ApicalTiebreakParams) -> Result<Self> {
        let basal_input_size = params.column_count.saturating_mul(params.cells_per_column);
        let tm = ApicalTiebreakTemporalMemory::new(ApicalTiebreakParams {
            basal_input_size,
            ..params
        })?;

        Ok(Self {
            tm,
            prev_apical_input: Vec::new(),
            prev_apical_growth_candidates: Vec::new(),
            prev_predicted_cells: Vec::new(),
        })
    }

    /// Clears per-step state and the buffered apical input.
    pub fn reset(&mut self) {
        self.tm.reset();
        self.prev_apical_input.clear();
        self.prev_apical_growth_candidates.clear();
        self.prev_predicted_cells.clear();
    }

    /// Performs one timestep.
    ///
    /// `apical_growth_candidates` defaults to `apical_input` when `None`.
    pub fn compute(
        &mut self,
        active_columns: &[ColumnIdx],
        apical_input: &[ElemSparse],
        apical_growth_candidates: Option<&[ElemSparse]>,
        learn: bool,
    ) -> Result<()> {
        let apical_input = self.tm.normalize_apical(apical_input, "apical input")?;
        let apical_growth = match apical_growth_candidates {
            Some(candidates) => self.tm.normalize_apical(candidates, "apical growth candidate")?,
            None => apical_input.clone(),
        };

        let prev_active_cells = self.tm.active_cells().to_vec();
        let prev_winner_cells = self.tm.winner_cells().to_vec();
        let predicted_for_this_step = self.tm.predicted_cells().to_vec();

        self.tm.activate_cells(
            active_columns,
            &prev_active_cells,
            &self.prev_apical_input,
            &prev_winner_cells,
            &self.prev_apical_growth_candidates,
            learn,
        )?;

        let active_cells = self.tm.active_cells().to_vec();
        self.tm.depolarize_cells(&active_cells, &apical_input, learn)?;

        trace!(
            predicted = predicted_for_this_step.len(),
            predicted_active = self.tm.predicted_active_cells().len(),
            next_predicted = self.tm.predicted_cells().len(),
            "sequence step"
        );

        self.prev_predicted_cells = predicted_for_this_step;
        self.prev_apical_input = apical_input;
        self.prev_apical_growth_candidates = apical_growth;
        Ok(())
    }

    /// Cells that were predicted for the step just computed, sorted.
    pub fn predicted_cells(&self) -> &[CellIdx] {
        &self.prev_predicted_cells
    }

    /// Cells predicted for the next step, sorted.
    pub fn next_predicted_cells(&self) -> &[CellIdx] {
        self.tm.predicted_cells()
    }

    /// Cells with an active basal segment for the next step, sorted.
    pub fn next_basal_predicted_cells(&self) -> Vec<CellIdx> {
        self.tm.basal_predicted_cells()
    }

    /// Cells with an active apical segment for the next step, sorted.
    pub fn next_apical_predicted_cells(&self) -> Vec<CellIdx> {
        self.tm.apical_predicted_cells()
    }

    /// Returns the wrapped memory.
    pub fn inner(&self) -> &ApicalTiebreakTemporalMemory {
        &self.tm
    }

    /// Consumes the wrapper and returns the memory.
    pub fn into_inner(self) -> ApicalTiebreakTemporalMemory {
        self.tm
    }
}

impl Deref for SequenceMemory {
    type Target = ApicalTiebreakTemporalMemory;

    fn deref(&self) -> &Self::Target {
        &self.tm
    }
}

impl DerefMut for SequenceMemory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tm
    }
}
