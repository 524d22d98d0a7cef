//! Nearest-first candidate queue for strip resolution.
//!
//! Candidates are resolved in order of distance from the epipole, so the mesh
//! grows monotonically outward along each epipolar ray. Ties break toward the
//! lower identifier, which keeps pop order fully deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use visual_hull_core::Real;

/// A candidate crossing: an opaque identifier plus its distance from the
/// epipole along the epipolar ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDistancePair {
    /// Candidate identifier; encoding is up to the caller.
    pub id: usize,
    /// Distance key, `Real::INFINITY` never enters the queue.
    pub distance: Real,
}

#[derive(Debug, Clone, Copy)]
struct Entry(EdgeDistancePair);

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the std max-heap behaves as a min-queue; total_cmp keeps
        // the order total even for pathological floats.
        other
            .0
            .distance
            .total_cmp(&self.0.distance)
            .then_with(|| other.0.id.cmp(&self.0.id))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue over [`EdgeDistancePair`].
#[derive(Debug, Default)]
pub struct EdgeDistanceQueue {
    heap: BinaryHeap<Entry>,
}

impl EdgeDistanceQueue {
    /// Empty queue with reserved capacity.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(n),
        }
    }

    /// Insert a candidate.
    pub fn push(&mut self, id: usize, distance: Real) {
        self.heap.push(Entry(EdgeDistancePair { id, distance }));
    }

    /// Remove and return the nearest pending candidate.
    pub fn pop(&mut self) -> Option<EdgeDistancePair> {
        self.heap.pop().map(|e| e.0)
    }

    /// Number of pending candidates.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// `true` when no candidate is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
