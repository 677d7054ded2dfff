//! Temporal memory algorithms.
//!
//! This module contains the pieces of the Apical Tiebreak Temporal Memory:
//!
//! - **Connections**: The segment/synapse connectivity graph
//! - **Segment Activity**: Active and matching segment classification
//! - **Tiebreak**: Apical modulation of basal prediction
//! - **Learning**: Segment selection, reinforcement and growth
//! - **Temporal Memory**: The two-phase depolarize/activate orchestrator
//! - **Pair / Sequence Memory**: Single-call wrappers for the two usage modes

mod connections;
mod segment_activity;
pub mod tiebreak;
pub mod learning;
mod apical_tiebreak_tm;
mod pair_memory;
mod sequence_memory;

pub use connections::{SegmentConnections, SynapseData};
pub use segment_activity::{ActivityThresholds, SegmentActivity};
pub use learning::{ApicalLearning, BasalLearning, GrowthParams};
pub use apical_tiebreak_tm::{ApicalTiebreakParams, ApicalTiebreakTemporalMemory};
pub use pair_memory::PairMemory;
pub use sequence_memory::SequenceMemory;
