//! Primitive type definitions for the temporal memory.
//!
//! Every entity is an integer handle. A cell is `column * cells_per_column +
//! offset`, a segment is an index into the segment arena of one
//! [`SegmentConnections`](crate::algorithms::SegmentConnections), and an
//! input bit is an index into the presynaptic space of that arena.

/// Signed integer type, used for parameters with a `-1` sentinel.
pub type Int = i32;

/// Unsigned integer type.
pub type UInt = u32;

/// Element type for sparse bit sets (indices of active bits).
pub type ElemSparse = UInt;

/// Index of a cell in the memory.
pub type CellIdx = UInt;

/// Index of a minicolumn.
pub type ColumnIdx = UInt;

/// Handle of a segment within one connectivity arena.
pub type Segment = UInt;

/// Handle of a synapse within one connectivity arena.
pub type Synapse = UInt;

/// Count of synapses, used for overlap scores.
pub type SynapseIdx = UInt;

/// Synapse permanence value (0.0 to 1.0).
pub type Permanence = f32;

/// Minimum permanence value.
pub const MIN_PERMANENCE: Permanence = 0.0;

/// Maximum permanence value.
pub const MAX_PERMANENCE: Permanence = 1.0;

/// Sentinel for "no limit" on `sample_size` and `max_synapses_per_segment`.
pub const UNLIMITED: Int = -1;
