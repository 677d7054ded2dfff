//! SegmentConnections - sparse, growable connectivity from cells to input bits.
//!
//! Each cell owns any number of dendrite segments; each segment owns an
//! unordered set of synapses onto presynaptic input bits. Segments and
//! synapses live in dense arenas addressed by integer handles, so overlap
//! scores can be returned as a flat vector indexed by segment.
//!
//! The memory keeps two independent instances of this structure: one for
//! basal segments (lateral input) and one for apical segments (feedback input).

use crate::types::{
    CellIdx, ElemSparse, Permanence, Segment, Synapse, SynapseIdx, MAX_PERMANENCE,
    MIN_PERMANENCE,
};
use crate::utils::{sparse, Random};

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;

/// Data associated with a synapse.
#[derive(Debug, Clone, PartialEq)]
pub struct SynapseData {
    /// The presynaptic input bit this synapse listens to.
    pub presynaptic_bit: ElemSparse,

    /// The permanence strength of this synapse.
    pub permanence: Permanence,

    /// The segment this synapse belongs to.
    pub segment: Segment,
}

/// Data associated with a segment.
#[derive(Debug, Clone, PartialEq)]
struct SegmentData {
    /// The synapses on this segment.
    synapses: SmallVec<[Synapse; 32]>,

    /// The cell this segment belongs to.
    cell: CellIdx,

    destroyed: bool,
}

impl SegmentData {
    fn new(cell: CellIdx) -> Self {
        Self {
            synapses: SmallVec::new(),
            cell,
            destroyed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CellData {
    segments: SmallVec<[Segment; 8]>,
}

/// Sparse bipartite graph from `num_cells` cells to `num_inputs` input bits,
/// organized by segment.
///
/// A synapse whose permanence is adjusted down to zero is removed: zero
/// permanence and "no synapse" are the same state.
///
/// # Example
///
/// ```rust
/// use tiebreak_tm::algorithms::SegmentConnections;
///
/// let mut conn = SegmentConnections::new(8, 100);
/// let segments = conn.create_segments(&[3, 3]);
/// conn.grow_synapses(&segments[..1], &[10, 11, 12], 0.6);
///
/// let overlaps = conn.compute_activity(&[10, 12, 50], Some(0.5));
/// assert_eq!(overlaps[segments[0] as usize], 2);
/// assert_eq!(overlaps[segments[1] as usize], 0);
/// ```
#[derive(Debug, Clone)]
pub struct SegmentConnections {
    /// All cells (post-synaptic side).
    cells: Vec<CellData>,

    /// Size of the presynaptic input space.
    num_inputs: usize,

    /// All segments (indexed by Segment).
    segments: Vec<SegmentData>,

    /// Destroyed segment handles, available for reuse.
    destroyed_segments: Vec<Segment>,

    /// All synapses (indexed by Synapse).
    synapses: Vec<SynapseData>,

    /// Destroyed synapse handles, available for reuse.
    destroyed_synapses: Vec<Synapse>,

    /// Maps presynaptic bit -> every synapse listening to it.
    synapses_for_presynaptic_bit: AHashMap<ElemSparse, Vec<Synapse>>,
}

impl SegmentConnections {
    /// Creates an empty connectivity graph.
    pub fn new(num_cells: usize, num_inputs: usize) -> Self {
        Self {
            cells: vec![CellData::default(); num_cells],
            num_inputs,
            segments: Vec::new(),
            destroyed_segments: Vec::new(),
            synapses: Vec::new(),
            destroyed_synapses: Vec::new(),
            synapses_for_presynaptic_bit: AHashMap::new(),
        }
    }

    /// Returns the number of cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Returns the size of the presynaptic input space.
    #[inline]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Returns the number of live segments.
    pub fn num_segments(&self) -> usize {
        self.segments.len() - self.destroyed_segments.len()
    }

    /// Returns the number of live synapses.
    pub fn num_synapses(&self) -> usize {
        self.synapses.len() - self.destroyed_synapses.len()
    }

    /// Length of the segment arena. Overlap vectors have this length.
    pub fn segment_flat_list_length(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the handle refers to a live segment.
    #[inline]
    pub fn is_live(&self, segment: Segment) -> bool {
        self.segments
            .get(segment as usize)
            .is_some_and(|s| !s.destroyed)
    }

    /// Iterates over all live segment handles in ascending order.
    pub fn live_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.destroyed)
            .map(|(i, _)| i as Segment)
    }

    // ========================================================================
    // Segment operations
    // ========================================================================

    /// Creates one new segment per given cell, in order.
    ///
    /// The same cell may appear more than once; it then receives several
    /// segments. No per-cell limit is enforced.
    ///
    /// # Panics
    ///
    /// Panics if a cell index is out of range.
    pub fn create_segments(&mut self, cells: &[CellIdx]) -> Vec<Segment> {
        cells.iter().map(|&cell| self.create_segment(cell)).collect()
    }

    fn create_segment(&mut self, cell: CellIdx) -> Segment {
        assert!(
            (cell as usize) < self.cells.len(),
            "cell {cell} out of range ({} cells)",
            self.cells.len()
        );

        let segment = if let Some(reuse) = self.destroyed_segments.pop() {
            self.segments[reuse as usize] = SegmentData::new(cell);
            reuse
        } else {
            let segment = self.segments.len() as Segment;
            self.segments.push(SegmentData::new(cell));
            segment
        };

        self.cells[cell as usize].segments.push(segment);
        segment
    }

    /// Destroys segments and all of their synapses. Handles are recycled by
    /// later calls to [`create_segments`](Self::create_segments).
    pub fn destroy_segments(&mut self, segments: &[Segment]) {
        for &segment in segments {
            if !self.is_live(segment) {
                continue;
            }

            let synapses = self.segments[segment as usize].synapses.clone();
            for synapse in synapses {
                self.destroy_synapse(synapse);
            }

            let cell = self.segments[segment as usize].cell;
            let cell_segments = &mut self.cells[cell as usize].segments;
            if let Some(pos) = cell_segments.iter().position(|&s| s == segment) {
                cell_segments.remove(pos);
            }

            self.segments[segment as usize].destroyed = true;
            self.destroyed_segments.push(segment);
        }
    }

    /// Gets the segments owned by a cell, in creation order.
    #[inline]
    pub fn segments_for_cell(&self, cell: CellIdx) -> &[Segment] {
        &self.cells[cell as usize].segments
    }

    /// Gets the cell that owns a segment.
    #[inline]
    pub fn cell_for_segment(&self, segment: Segment) -> CellIdx {
        self.segments[segment as usize].cell
    }

    // ========================================================================
    // Synapse operations
    // ========================================================================

    fn create_synapse(&mut self, segment: Segment, presynaptic_bit: ElemSparse, permanence: Permanence) {
        let permanence = permanence.clamp(MIN_PERMANENCE, MAX_PERMANENCE);
        let data = SynapseData {
            presynaptic_bit,
            permanence,
            segment,
        };

        let synapse = if let Some(reuse) = self.destroyed_synapses.pop() {
            self.synapses[reuse as usize] = data;
            reuse
        } else {
            let synapse = self.synapses.len() as Synapse;
            self.synapses.push(data);
            synapse
        };

        self.segments[segment as usize].synapses.push(synapse);
        self.synapses_for_presynaptic_bit
            .entry(presynaptic_bit)
            .or_default()
            .push(synapse);
    }

    fn destroy_synapse(&mut self, synapse: Synapse) {
        let data = &self.synapses[synapse as usize];
        let segment = data.segment;
        let presynaptic_bit = data.presynaptic_bit;

        let segment_synapses = &mut self.segments[segment as usize].synapses;
        if let Some(pos) = segment_synapses.iter().position(|&s| s == synapse) {
            segment_synapses.swap_remove(pos);
        }

        if let Some(synapses) = self.synapses_for_presynaptic_bit.get_mut(&presynaptic_bit) {
            if let Some(pos) = synapses.iter().position(|&s| s == synapse) {
                synapses.swap_remove(pos);
            }
            if synapses.is_empty() {
                self.synapses_for_presynaptic_bit.remove(&presynaptic_bit);
            }
        }

        self.synapses[synapse as usize].permanence = -1.0;
        self.destroyed_synapses.push(synapse);
    }

    /// Sets a permanence, clamped to [0, 1]. Reaching zero removes the synapse.
    fn update_synapse_permanence(&mut self, synapse: Synapse, permanence: Permanence) {
        let permanence = permanence.clamp(MIN_PERMANENCE, MAX_PERMANENCE);
        if permanence <= MIN_PERMANENCE {
            self.destroy_synapse(synapse);
        } else {
            self.synapses[synapse as usize].permanence = permanence;
        }
    }

    /// Gets the synapses on a segment.
    #[inline]
    pub fn synapses_for_segment(&self, segment: Segment) -> &[Synapse] {
        &self.segments[segment as usize].synapses
    }

    /// Gets the synapse data.
    #[inline]
    pub fn data_for_synapse(&self, synapse: Synapse) -> &SynapseData {
        &self.synapses[synapse as usize]
    }

    /// Gets the presynaptic bits of a segment, sorted.
    pub fn presynaptic_bits_for_segment(&self, segment: Segment) -> Vec<ElemSparse> {
        sparse::sorted_unique(
            self.synapses_for_segment(segment)
                .iter()
                .map(|&s| self.synapses[s as usize].presynaptic_bit)
                .collect(),
        )
    }

    /// Permanence of the synapse from `presynaptic_bit` onto `segment`, if any.
    pub fn permanence(&self, segment: Segment, presynaptic_bit: ElemSparse) -> Option<Permanence> {
        self.synapses_for_segment(segment)
            .iter()
            .map(|&s| &self.synapses[s as usize])
            .find(|d| d.presynaptic_bit == presynaptic_bit)
            .map(|d| d.permanence)
    }

    // ========================================================================
    // Activity computation
    // ========================================================================

    /// Counts, for every segment, the synapses whose presynaptic bit is active.
    ///
    /// With `permanence_threshold = None` every synapse counts (potential
    /// overlap). With `Some(p)` only synapses with permanence `>= p` count
    /// (connected overlap). `active_bits` must be sorted and free of
    /// duplicates; a repeated bit would be counted twice. Debug builds assert
    /// this.
    ///
    /// The result is indexed by segment handle and has length
    /// [`segment_flat_list_length`](Self::segment_flat_list_length).
    pub fn compute_activity(
        &self,
        active_bits: &[ElemSparse],
        permanence_threshold: Option<Permanence>,
    ) -> Vec<SynapseIdx> {
        debug_assert!(
            active_bits.windows(2).all(|pair| pair[0] < pair[1]),
            "active bits must be sorted and unique"
        );
        let mut overlaps = vec![0 as SynapseIdx; self.segments.len()];

        for bit in active_bits {
            let Some(synapses) = self.synapses_for_presynaptic_bit.get(bit) else {
                continue;
            };
            for &synapse in synapses {
                let data = &self.synapses[synapse as usize];
                if permanence_threshold.map_or(true, |p| data.permanence >= p) {
                    overlaps[data.segment as usize] += 1;
                }
            }
        }

        overlaps
    }

    // ========================================================================
    // Learning operations
    // ========================================================================

    /// Adds `active_delta` to every synapse on the given segments whose
    /// presynaptic bit is active, and `inactive_delta` to every other synapse.
    /// Permanences are clamped to [0, 1].
    pub fn adjust_synapses(
        &mut self,
        segments: &[Segment],
        active_bits: &[ElemSparse],
        active_delta: Permanence,
        inactive_delta: Permanence,
    ) {
        self.adjust(segments, active_bits, active_delta, inactive_delta);
    }

    /// Adds `delta` only to synapses whose presynaptic bit is active.
    pub fn adjust_active_synapses(
        &mut self,
        segments: &[Segment],
        active_bits: &[ElemSparse],
        delta: Permanence,
    ) {
        self.adjust(segments, active_bits, delta, 0.0);
    }

    /// Adds `delta` only to synapses whose presynaptic bit is inactive.
    pub fn adjust_inactive_synapses(
        &mut self,
        segments: &[Segment],
        active_bits: &[ElemSparse],
        delta: Permanence,
    ) {
        self.adjust(segments, active_bits, 0.0, delta);
    }

    fn adjust(
        &mut self,
        segments: &[Segment],
        active_bits: &[ElemSparse],
        active_delta: Permanence,
        inactive_delta: Permanence,
    ) {
        let active: AHashSet<ElemSparse> = active_bits.iter().copied().collect();

        for &segment in segments {
            let synapses = self.segments[segment as usize].synapses.clone();
            for synapse in synapses {
                let data = &self.synapses[synapse as usize];
                let delta = if active.contains(&data.presynaptic_bit) {
                    active_delta
                } else {
                    inactive_delta
                };
                if delta != 0.0 {
                    let new_perm = data.permanence + delta;
                    self.update_synapse_permanence(synapse, new_perm);
                }
            }
        }
    }

    /// Grows a synapse from every candidate bit not already wired to each
    /// segment.
    pub fn grow_synapses(
        &mut self,
        segments: &[Segment],
        candidates: &[ElemSparse],
        initial_permanence: Permanence,
    ) {
        let candidates = sparse::sorted_unique(candidates.to_vec());
        for &segment in segments {
            for bit in self.unwired_candidates(segment, &candidates) {
                self.create_synapse(segment, bit, initial_permanence);
            }
        }
    }

    /// Grows up to `max_new[i]` synapses on `segments[i]`, choosing a uniform
    /// random subset of the candidate bits not already wired to that segment.
    ///
    /// A non-positive limit grows nothing. The chosen subset does not depend
    /// on the order of `candidates`.
    ///
    /// # Panics
    ///
    /// Panics if `segments` and `max_new` differ in length.
    pub fn grow_synapses_to_sample(
        &mut self,
        segments: &[Segment],
        candidates: &[ElemSparse],
        max_new: &[i64],
        initial_permanence: Permanence,
        rng: &mut Random,
    ) {
        assert_eq!(
            segments.len(),
            max_new.len(),
            "one growth limit is required per segment"
        );

        if candidates.is_empty() {
            return;
        }

        let candidates = sparse::sorted_unique(candidates.to_vec());
        for (&segment, &limit) in segments.iter().zip(max_new) {
            if limit <= 0 {
                continue;
            }

            let available = self.unwired_candidates(segment, &candidates);
            let chosen = rng.sample(available, limit as usize);
            for bit in chosen {
                self.create_synapse(segment, bit, initial_permanence);
            }
        }
    }

    /// Like [`grow_synapses_to_sample`](Self::grow_synapses_to_sample) with
    /// the same limit for every segment.
    pub fn grow_synapses_to_sample_uniform(
        &mut self,
        segments: &[Segment],
        candidates: &[ElemSparse],
        max_new: i64,
        initial_permanence: Permanence,
        rng: &mut Random,
    ) {
        let limits = vec![max_new; segments.len()];
        self.grow_synapses_to_sample(segments, candidates, &limits, initial_permanence, rng);
    }

    /// Candidates (sorted) with no synapse on the segment yet.
    fn unwired_candidates(&self, segment: Segment, candidates: &[ElemSparse]) -> Vec<ElemSparse> {
        let existing = self.presynaptic_bits_for_segment(segment);
        sparse::difference(candidates, &existing)
    }

    // ========================================================================
    // Segment / cell mapping
    // ========================================================================

    /// Owning cell of each segment.
    pub fn map_segments_to_cells(&self, segments: &[Segment]) -> Vec<CellIdx> {
        segments.iter().map(|&s| self.cell_for_segment(s)).collect()
    }

    /// The segments (in their given order) whose owning cell is in `cells`.
    pub fn filter_segments_by_cell(&self, segments: &[Segment], cells: &[CellIdx]) -> Vec<Segment> {
        let cells: AHashSet<CellIdx> = cells.iter().copied().collect();
        segments
            .iter()
            .copied()
            .filter(|&s| cells.contains(&self.cell_for_segment(s)))
            .collect()
    }

    /// Number of synapses on each segment.
    pub fn map_segments_to_synapse_counts(&self, segments: &[Segment]) -> Vec<usize> {
        segments
            .iter()
            .map(|&s| self.segments[s as usize].synapses.len())
            .collect()
    }

    /// Number of segments owned by each cell.
    pub fn get_segment_counts(&self, cells: &[CellIdx]) -> Vec<usize> {
        cells
            .iter()
            .map(|&c| self.cells[c as usize].segments.len())
            .collect()
    }
}
