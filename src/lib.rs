//! # tiebreak-tm - Apical Tiebreak Temporal Memory in Rust
//!
//! A sequence and context memory over sparse binary cell populations. Cells are
//! grouped into minicolumns and carry two independent kinds of dendrite
//! segments:
//!
//! - **Basal segments** receive lateral/contextual input and drive sequence
//!   prediction.
//! - **Apical segments** receive top-down/feedback input and break ties between
//!   several basally predicted cells in the same minicolumn.
//!
//! ## Overview
//!
//! Every timestep is a two-phase protocol:
//!
//! 1. [`ApicalTiebreakTemporalMemory::depolarize_cells`] computes segment
//!    activity against the basal and apical inputs and derives the predicted
//!    cells.
//! 2. [`ApicalTiebreakTemporalMemory::activate_cells`] receives the actual
//!    active minicolumns, activates correctly predicted cells or bursts the
//!    column, and (when learning) grows, reinforces and punishes synapses on
//!    both connectivity graphs.
//!
//! Two thin variants are built on top of the core:
//!
//! - [`PairMemory`] takes basal and apical input for the same timestep.
//! - [`SequenceMemory`] feeds its own previous active cells back in as basal
//!   input and buffers the apical input by one step.
//!
//! ## Quick Start
//!
//! ```rust
//! use tiebreak_tm::prelude::*;
//!
//! let mut memory = PairMemory::new(ApicalTiebreakParams {
//!     column_count: 64,
//!     cells_per_column: 4,
//!     basal_input_size: 256,
//!     apical_input_size: 128,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! memory
//!     .compute(&[1, 5, 9], &[10, 20, 30], &[3, 4], None, None, true)
//!     .unwrap();
//!
//! assert_eq!(memory.active_cells().len(), 12);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`ApicalTiebreakParams`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]

pub mod types;
pub mod algorithms;
pub mod utils;

pub use algorithms::{
    ApicalTiebreakParams, ApicalTiebreakTemporalMemory, PairMemory, SegmentConnections,
    SequenceMemory,
};

/// Re-export of commonly used types and traits for convenience.
pub mod prelude {
    pub use crate::types::{
        CellIdx, ColumnIdx, ElemSparse, Permanence, Segment, Synapse, SynapseIdx,
        MAX_PERMANENCE, MIN_PERMANENCE,
    };
    pub use crate::algorithms::{
        ApicalTiebreakParams, ApicalTiebreakTemporalMemory, PairMemory, SequenceMemory,
        SegmentActivity, SegmentConnections,
    };
    pub use crate::utils::Random;
    pub use crate::error::{Result, TiebreakError};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library.
pub mod error {
    use thiserror::Error;

    /// Main error type for temporal memory operations.
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum TiebreakError {
        /// Invalid configuration value.
        #[error("Invalid parameter '{name}': {message}")]
        InvalidParameter {
            /// Name of the invalid parameter.
            name: &'static str,
            /// Description of the error.
            message: String,
        },

        /// An input index lies outside its declared space.
        #[error("{name} index {index} out of bounds (size: {size})")]
        IndexOutOfBounds {
            /// Which input the index belongs to.
            name: &'static str,
            /// The invalid index.
            index: usize,
            /// The valid size.
            size: usize,
        },
    }

    /// Result type alias using `TiebreakError`.
    pub type Result<T> = std::result::Result<T, TiebreakError>;
}

pub use error::{Result, TiebreakError};
