use crate::utilities::vector::LANE_COUNT;

/// Mask value such that `x & VECTOR_MASK` computes `x % LANE_COUNT`.
pub const VECTOR_MASK: usize = LANE_COUNT - 1;

/// Shift value such that `x >> VECTOR_SHIFT` divides `x` by `LANE_COUNT`.
pub const VECTOR_SHIFT: usize = LANE_COUNT.trailing_zeros() as usize;

const _: () = assert!(LANE_COUNT.is_power_of_two());

/// Some helpers for indexing into vector bundles.
pub struct BundleIndexing;

impl BundleIndexing {
    /// Splits a linear constraint index into a bundle index and an index within the bundle.
    #[inline(always)]
    pub fn get_bundle_indices(linear_index: usize) -> (usize, usize) {
        (linear_index >> VECTOR_SHIFT, linear_index & VECTOR_MASK)
    }

    /// Gets the number of bundles required to hold the given number of elements.
    #[inline(always)]
    pub fn get_bundle_count(element_count: usize) -> usize {
        (element_count + VECTOR_MASK) >> VECTOR_SHIFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_indices_round_trip() {
        for linear in 0..64 {
            let (bundle, inner) = BundleIndexing::get_bundle_indices(linear);
            assert_eq!(bundle * LANE_COUNT + inner, linear);
            assert!(inner < LANE_COUNT);
        }
    }

    #[test]
    fn bundle_count_rounds_up() {
        assert_eq!(BundleIndexing::get_bundle_count(0), 0);
        assert_eq!(BundleIndexing::get_bundle_count(1), 1);
        assert_eq!(BundleIndexing::get_bundle_count(LANE_COUNT), 1);
        assert_eq!(BundleIndexing::get_bundle_count(LANE_COUNT + 1), 2);
    }
}
