use crate::physics::constraints::spring_settings::SpringSettingsWide;
use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::vector::Vector;
use crate::utilities::vector2_wide::Vector2Wide;
use crate::utilities::vector3_wide::Vector3Wide;

/// SIMD-bundled prestep data for a convex manifold with `N` contacts.
///
/// NOTE: the memory layout is relied upon by the constraint descriptions for more
/// efficient setting and getting, and it matches the execution order of the prestep so
/// the function accesses it sequentially and the prefetcher can do its job. The field
/// order is part of the storage format contract; any change invalidates persisted
/// type batch data.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ContactPrestep<const N: usize> {
    /// Offsets from the center of body A to each contact position.
    pub offset_a: [Vector3Wide; N],
    /// Offset from the center of body A to the center of body B.
    pub offset_b: Vector3Wide,
    pub friction_coefficient: Vector,
    //In a convex manifold, all contacts share the same normal and tangents.
    pub normal: Vector3Wide,
    //All contacts also share the spring settings.
    pub spring_settings: SpringSettingsWide,
    pub maximum_recovery_velocity: Vector,
    /// Signed penetration depth of each contact. Negative depths are speculative.
    pub penetration_depth: [Vector; N],
}

impl<const N: usize> Default for ContactPrestep<N> {
    fn default() -> Self {
        Self {
            offset_a: [Vector3Wide::ZERO; N],
            offset_b: Vector3Wide::ZERO,
            friction_coefficient: Vector::ZERO,
            normal: Vector3Wide::ZERO,
            spring_settings: SpringSettingsWide::default(),
            maximum_recovery_velocity: Vector::ZERO,
            penetration_depth: [Vector::ZERO; N],
        }
    }
}

/// Accumulated impulses for a convex manifold with `N` contacts: the only solver state
/// that survives across iterations and frames. Mutated in place by every solve and
/// reapplied by the next step's warm start.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ContactImpulses<const N: usize> {
    pub tangent: Vector2Wide,
    pub penetration: [Vector; N],
    pub twist: Vector,
}

impl<const N: usize> Default for ContactImpulses<N> {
    fn default() -> Self {
        Self {
            tangent: Vector2Wide::ZERO,
            penetration: [Vector::ZERO; N],
            twist: Vector::ZERO,
        }
    }
}

impl<const N: usize> ContactImpulses<N> {
    /// Sums the accumulated normal impulses across the manifold's contacts.
    #[inline(always)]
    pub fn total_normal_impulse(&self) -> Vector {
        let mut sum = self.penetration[0];
        for i in 1..N {
            sum = sum + self.penetration[i];
        }
        sum
    }

    /// Reads one lane of the bundle into a scalar view.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> ContactImpulsesLane<N> {
        let mut lane = ContactImpulsesLane {
            tangent: glam::Vec2::new(
                GatherScatter::get(&self.tangent.x, slot_index),
                GatherScatter::get(&self.tangent.y, slot_index),
            ),
            penetration: [0.0; N],
            twist: GatherScatter::get(&self.twist, slot_index),
        };
        for i in 0..N {
            lane.penetration[i] = GatherScatter::get(&self.penetration[i], slot_index);
        }
        lane
    }

    /// Writes a scalar view into one lane of the bundle, leaving other lanes untouched.
    #[inline(always)]
    pub fn write_slot(&mut self, lane: &ContactImpulsesLane<N>, slot_index: usize) {
        GatherScatter::set(&mut self.tangent.x, slot_index, lane.tangent.x);
        GatherScatter::set(&mut self.tangent.y, slot_index, lane.tangent.y);
        for i in 0..N {
            GatherScatter::set(&mut self.penetration[i], slot_index, lane.penetration[i]);
        }
        GatherScatter::set(&mut self.twist, slot_index, lane.twist);
    }
}

/// Scalar view of one lane of a [`ContactImpulses`] bundle, used when compacting
/// batches and by inspection tooling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactImpulsesLane<const N: usize> {
    pub tangent: glam::Vec2,
    pub penetration: [f32; N],
    pub twist: f32,
}

impl<const N: usize> Default for ContactImpulsesLane<N> {
    fn default() -> Self {
        Self {
            tangent: glam::Vec2::ZERO,
            penetration: [0.0; N],
            twist: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn prestep_field_order_is_the_storage_contract() {
        //Offsets, then shared fields, then depths. Marshalling and the prestep both
        //traverse the struct in this sequence; reordering breaks persisted batches.
        type Prestep4 = ContactPrestep<4>;
        let field_offsets = [
            offset_of!(Prestep4, offset_a),
            offset_of!(Prestep4, offset_b),
            offset_of!(Prestep4, friction_coefficient),
            offset_of!(Prestep4, normal),
            offset_of!(Prestep4, spring_settings),
            offset_of!(Prestep4, maximum_recovery_velocity),
            offset_of!(Prestep4, penetration_depth),
        ];
        assert!(field_offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn impulse_lane_round_trip() {
        let mut bundle = ContactImpulses::<3>::default();
        let lane = ContactImpulsesLane::<3> {
            tangent: glam::Vec2::new(0.25, -0.5),
            penetration: [1.0, 2.0, 3.0],
            twist: -0.125,
        };
        bundle.write_slot(&lane, 3);
        assert_eq!(bundle.read_slot(3), lane);
        assert_eq!(bundle.read_slot(0), ContactImpulsesLane::default());
    }
}
