use crate::utilities::vector::{Vector, VectorI, LANE_COUNT};

/// Per-lane access into wide values.
///
/// Constraint descriptions are scalar; bundle storage is wide. These helpers move one
/// lane's worth of data between the two representations without disturbing the other
/// lanes of the bundle.
pub struct GatherScatter;

impl GatherScatter {
    /// Reads a single lane of a wide value.
    #[inline(always)]
    pub fn get(vector: &Vector, inner_index: usize) -> f32 {
        debug_assert!(inner_index < LANE_COUNT);
        vector.as_array_ref()[inner_index]
    }

    /// Writes a single lane of a wide value, leaving the other lanes untouched.
    #[inline(always)]
    pub fn set(vector: &mut Vector, inner_index: usize, value: f32) {
        debug_assert!(inner_index < LANE_COUNT);
        vector.as_array_mut()[inner_index] = value;
    }

    /// Reads a single lane of a wide integer value.
    #[inline(always)]
    pub fn get_i32(vector: &VectorI, inner_index: usize) -> i32 {
        debug_assert!(inner_index < LANE_COUNT);
        vector.as_array_ref()[inner_index]
    }

    /// Writes a single lane of a wide integer value, leaving the other lanes untouched.
    #[inline(always)]
    pub fn set_i32(vector: &mut VectorI, inner_index: usize, value: i32) {
        debug_assert!(inner_index < LANE_COUNT);
        vector.as_array_mut()[inner_index] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_touches_only_the_target_lane() {
        let mut v = Vector::splat(3.0);
        GatherScatter::set(&mut v, 2, -1.0);
        let lanes = v.to_array();
        assert_eq!(lanes, [3.0, 3.0, -1.0, 3.0]);
        assert_eq!(GatherScatter::get(&v, 2), -1.0);
    }
}
