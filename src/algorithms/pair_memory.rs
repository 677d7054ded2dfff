//! Pair memory: basal and apical input arrive for the same timestep.

use crate::algorithms::{ApicalTiebreakParams, ApicalTiebreakTemporalMemory};
use crate::error::Result;
use crate::types::{CellIdx, ColumnIdx, ElemSparse};

use std::ops::{Deref, DerefMut};

/// Runs depolarization and activation in a single call with externally
/// supplied basal and apical input.
///
/// All getters of [`ApicalTiebreakTemporalMemory`] are reachable through
/// `Deref`.
#[derive(Debug, Clone)]
pub struct PairMemory {
    tm: ApicalTiebreakTemporalMemory,
}

impl PairMemory {
    /// Creates a new pair memory.
    pub fn new(params: ApicalTiebreakParams) -> Result<Self> {
        Ok(Self {
            tm: ApicalTiebreakTemporalMemory::new(params)?,
        })
    }

    /// Performs one timestep.
    ///
    /// Growth candidates default to the corresponding input when `None`.
    /// The basal and apical input also serve as reinforce candidates.
    pub fn compute(
        &mut self,
        active_columns: &[ColumnIdx],
        basal_input: &[ElemSparse],
        apical_input: &[ElemSparse],
        basal_growth_candidates: Option<&[ElemSparse]>,
        apical_growth_candidates: Option<&[ElemSparse]>,
        learn: bool,
    ) -> Result<()> {
        let basal_growth = basal_growth_candidates.unwrap_or(basal_input);
        let apical_growth = apical_growth_candidates.unwrap_or(apical_input);

        self.tm.depolarize_cells(basal_input, apical_input, learn)?;
        self.tm.activate_cells(
            active_columns,
            basal_input,
            apical_input,
            basal_growth,
            apical_growth,
            learn,
        )
    }

    /// Cells predicted for the step just computed, sorted.
    pub fn predicted_cells(&self) -> &[CellIdx] {
        self.tm.predicted_cells()
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

impl Deref for PairMemory {
    type Target = ApicalTiebreakTemporalMemory;

    fn deref(&self) -> &Self::Target {
        &self.tm
    }
}

impl DerefMut for PairMemory {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.tm
    }
}
