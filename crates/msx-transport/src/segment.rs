//! Arena-allocated water-quality segments (spec §4.5, §9 "Linked segment
//! lists").
//!
//! A [`Segment`] stores two unordered neighbor slots rather than directional
//! prev/next pointers, so [`crate::link_segments::LinkSegments::reorient`]
//! can reverse a pipe's flow direction by swapping two `Option<SegId>`
//! fields on the list header instead of walking and flipping every node.

use msx_core::SegId;

#[derive(Debug, Clone)]
pub struct Segment {
    pub volume: f64,
    /// Dense, indexed by `SpeciesId`.
    pub concentrations: Vec<f64>,
    link: [Option<SegId>; 2],
}

impl Segment {
    fn new(volume: f64, concentrations: Vec<f64>) -> Self {
        Self {
            volume,
            concentrations,
            link: [None, None],
        }
    }

    /// The neighbor reached by NOT coming from `came_from`. For an end
    /// segment (one slot empty) this correctly returns the sole populated
    /// neighbor regardless of which slot holds it.
    pub(crate) fn other(&self, came_from: Option<SegId>) -> Option<SegId> {
        if self.link[0] == came_from {
            self.link[1]
        } else {
            self.link[0]
        }
    }

    pub(crate) fn add_neighbor(&mut self, new: SegId) {
        if self.link[0].is_none() {
            self.link[0] = Some(new);
        } else {
            debug_assert!(self.link[1].is_none(), "segment already has two neighbors");
            self.link[1] = Some(new);
        }
    }

    pub(crate) fn replace_neighbor(&mut self, old: Option<SegId>, new: Option<SegId>) {
        if self.link[0] == old {
            self.link[0] = new;
        } else if self.link[1] == old {
            self.link[1] = new;
        }
    }
}

/// A process-wide arena of segments with a free list, recycling removed
/// segments to avoid heap churn (spec §4.5 "a process-wide free list
/// recycles removed segments").
#[derive(Debug, Clone, Default)]
pub struct SegmentArena {
    slots: Vec<Option<Segment>>,
    free: Vec<SegId>,
}

impl SegmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop from the free list if non-empty, else grow the backing pool
    /// (spec §4.5 "new-segment").
    pub fn alloc(&mut self, volume: f64, concentrations: Vec<f64>) -> SegId {
        let seg = Segment::new(volume, concentrations);
        if let Some(id) = self.free.pop() {
            self.slots[id.index_usize()] = Some(seg);
            id
        } else {
            let id = SegId::from_index(self.slots.len() as u32);
            self.slots.push(Some(seg));
            id
        }
    }

    pub fn free(&mut self, id: SegId) {
        self.slots[id.index_usize()] = None;
        self.free.push(id);
    }

    pub fn get(&self, id: SegId) -> &Segment {
        self.slots[id.index_usize()]
            .as_ref()
            .expect("segment id refers to a live segment")
    }

    pub fn get_mut(&mut self, id: SegId) -> &mut Segment {
        self.slots[id.index_usize()]
            .as_mut()
            .expect("segment id refers to a live segment")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_recycles_from_free_list() {
        let mut arena = SegmentArena::new();
        let a = arena.alloc(1.0, vec![0.0]);
        arena.free(a);
        let b = arena.alloc(2.0, vec![1.0]);
        assert_eq!(a, b);
        assert_eq!(arena.get(b).volume, 2.0);
    }
}
