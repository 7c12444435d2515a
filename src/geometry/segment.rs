//! Oriented boundary segments of a tentative cell polygon
//!
//! During clipping every cell owns a doubly-linked chain of oriented
//! segments. Links are plain indices into a per-cell arena, so segments can
//! be split and relinked freely and the whole chain is reclaimed by dropping
//! the arena after the cell is finalized.

use glam::DVec2;

/// Index of a segment within its owning [`SegmentArena`]
pub type SegId = usize;

/// One oriented piece of a cell boundary
///
/// `flag >= 0` is the index of the neighboring site across this segment;
/// `flag < 0` encodes `-(edge)-1` for a segment lying on clip boundary edge
/// `edge`. `prev`/`next` thread the segments into a circular chain around
/// one site; a missing link marks the open gap of an unbounded dual chain.
#[derive(Debug, Clone)]
pub struct DualSegment {
    pub source: DVec2,
    pub target: DVec2,
    pub flag: i32,
    pub prev: Option<SegId>,
    pub next: Option<SegId>,
}

impl DualSegment {
    pub fn new(source: DVec2, target: DVec2, flag: i32) -> Self {
        Self {
            source,
            target,
            flag,
            prev: None,
            next: None,
        }
    }

    pub fn length(&self) -> f64 {
        self.source.distance(self.target)
    }
}

/// Index-addressed storage for one cell's segments
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    segs: Vec<DualSegment>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, seg: DualSegment) -> SegId {
        self.segs.push(seg);
        self.segs.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }
}

impl std::ops::Index<SegId> for SegmentArena {
    type Output = DualSegment;

    #[inline]
    fn index(&self, id: SegId) -> &DualSegment {
        &self.segs[id]
    }
}

impl std::ops::IndexMut<SegId> for SegmentArena {
    #[inline]
    fn index_mut(&mut self, id: SegId) -> &mut DualSegment {
        &mut self.segs[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_link() {
        let mut arena = SegmentArena::new();
        let a = arena.alloc(DualSegment::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            5,
        ));
        let b = arena.alloc(DualSegment::new(
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            -1,
        ));

        arena[a].next = Some(b);
        arena[b].prev = Some(a);

        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a].next, Some(b));
        assert_eq!(arena[b].prev, Some(a));
        assert_eq!(arena[a].flag, 5);
        assert!((arena[a].length() - 1.0).abs() < 1e-12);
    }
}
