//! Core types for the temporal memory.
//!
//! Cells, minicolumns, segments and synapses are all addressed by plain
//! integer indices into dense arenas; this module names those index types.

mod primitives;

pub use primitives::*;
