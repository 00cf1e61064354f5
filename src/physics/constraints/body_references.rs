use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::vector::VectorI;

/// Body references for a bundle of two body constraints.
///
/// One pair of body indices per lane. The indices address the external body storage;
/// the scheduler guarantees that no two bundles referencing the same body are solved
/// concurrently, so the solver itself never inspects these beyond gathering state.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoBodyReferences {
    pub index_a: VectorI,
    pub index_b: VectorI,
}

impl TwoBodyReferences {
    /// Writes a body index pair into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(&mut self, body_a: i32, body_b: i32, slot_index: usize) {
        GatherScatter::set_i32(&mut self.index_a, slot_index, body_a);
        GatherScatter::set_i32(&mut self.index_b, slot_index, body_b);
    }

    /// Reads the body index pair stored in one lane of the bundle.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> (i32, i32) {
        (
            GatherScatter::get_i32(&self.index_a, slot_index),
            GatherScatter::get_i32(&self.index_b, slot_index),
        )
    }
}
