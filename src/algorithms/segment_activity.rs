//! Segment activity classification.
//!
//! Given a connectivity graph and the active input bits, every segment gets
//! two overlap scores: potential overlap (all synapses) and connected overlap
//! (synapses at or above the connected permanence). Segments are then
//! classified as *matching* (potential overlap `>= min_threshold`) and
//! *active* (connected overlap `>= activation_threshold`).

use crate::algorithms::SegmentConnections;
use crate::types::{CellIdx, ElemSparse, Permanence, Segment, SynapseIdx};
use crate::utils::sparse;

/// Thresholds used to classify segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityThresholds {
    /// Minimum permanence for a synapse to count as connected.
    pub connected_permanence: Permanence,
    /// Connected overlap at which a segment is active.
    pub activation_threshold: SynapseIdx,
    /// Potential overlap at which a segment is matching.
    pub min_threshold: SynapseIdx,
}

/// The active and matching segments of one connectivity graph for one step,
/// together with the potential overlaps used later to pick the best segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentActivity {
    /// Active segments, ascending by handle.
    pub active: Vec<Segment>,
    /// Matching segments, ascending by handle.
    pub matching: Vec<Segment>,
    /// Potential overlap of every segment, indexed by handle.
    pub potential_overlaps: Vec<SynapseIdx>,
}

impl SegmentActivity {
    /// Classifies every live segment against `active_input`.
    pub fn compute(
        connections: &SegmentConnections,
        active_input: &[ElemSparse],
        thresholds: &ActivityThresholds,
    ) -> Self {
        let connected = connections.compute_activity(active_input, Some(thresholds.connected_permanence));
        let potential_overlaps = connections.compute_activity(active_input, None);

        let active = segments_where(connections, |s| {
            connected[s as usize] >= thresholds.activation_threshold
        });
        let matching = segments_where(connections, |s| {
            potential_overlaps[s as usize] >= thresholds.min_threshold
        });

        Self {
            active,
            matching,
            potential_overlaps,
        }
    }

    /// Potential overlap of a segment; zero for segments created after this
    /// activity was computed.
    #[inline]
    pub fn potential_overlap(&self, segment: Segment) -> SynapseIdx {
        self.potential_overlaps
            .get(segment as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Distinct cells owning an active segment, sorted.
    pub fn active_cells(&self, connections: &SegmentConnections) -> Vec<CellIdx> {
        sparse::sorted_unique(connections.map_segments_to_cells(&self.active))
    }

    /// Clears all lists.
    pub fn clear(&mut self) {
        self.active.clear();
        self.matching.clear();
        self.potential_overlaps.clear();
    }
}

/// Live segments satisfying `keep`, ascending.
pub(crate) fn segments_where<F>(connections: &SegmentConnections, keep: F) -> Vec<Segment>
where
    F: Fn(Segment) -> bool,
{
    connections.live_segments().filter(|&s| keep(s)).collect()
}
