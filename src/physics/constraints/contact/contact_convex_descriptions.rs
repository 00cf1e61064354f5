use crate::physics::constraints::contact::contact_convex_common::ContactPrestep;
use crate::physics::constraints::contact::contact_convex_types::{
    ContactConstraintFunctions, ConvexContactFunctions,
};
use crate::physics::constraints::spring_settings::SpringSettings;
use crate::utilities::gather_scatter::GatherScatter;
use glam::Vec3;

/// Per-contact data for convex constraint descriptions (narrow/scalar form).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstraintContactData {
    pub offset_a: Vec3,
    pub penetration_depth: f32,
}

/// Material properties shared by every contact of a collision pair, as produced by the
/// narrow phase.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PairMaterialProperties {
    /// Coefficient of friction to apply for the constraint. Maximum friction force is
    /// the normal force times this coefficient.
    pub friction_coefficient: f32,
    /// Maximum relative velocity along the contact normal at which the collision
    /// constraint will recover from penetration. Clamps the velocity goal created from
    /// the spring settings.
    pub maximum_recovery_velocity: f32,
    /// Defines the constraint's penetration recovery spring properties.
    pub spring_settings: SpringSettings,
}

impl PairMaterialProperties {
    /// Constructs a pair's material properties.
    pub fn new(
        friction_coefficient: f32,
        maximum_recovery_velocity: f32,
        spring_settings: SpringSettings,
    ) -> Self {
        Self {
            friction_coefficient,
            maximum_recovery_velocity,
            spring_settings,
        }
    }
}

/// Scalar, per-instance description of a convex manifold constraint with `N` contacts:
/// the externally visible, non-batched form of [`ContactPrestep`].
///
/// All contacts share one normal and one material; that is what makes the manifold
/// convex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactDescription<const N: usize> {
    pub contacts: [ConstraintContactData; N],
    pub offset_b: Vec3,
    pub friction_coefficient: f32,
    pub normal: Vec3,
    pub spring_settings: SpringSettings,
    pub maximum_recovery_velocity: f32,
}

impl<const N: usize> Default for ContactDescription<N> {
    fn default() -> Self {
        Self {
            contacts: [ConstraintContactData::default(); N],
            offset_b: Vec3::ZERO,
            friction_coefficient: 0.0,
            normal: Vec3::ZERO,
            spring_settings: SpringSettings::default(),
            maximum_recovery_velocity: 0.0,
        }
    }
}

/// One contact point description.
pub type Contact1 = ContactDescription<1>;
/// Two contact point description.
pub type Contact2 = ContactDescription<2>;
/// Three contact point description.
pub type Contact3 = ContactDescription<3>;
/// Four contact point description.
pub type Contact4 = ContactDescription<4>;

impl<const N: usize> ContactDescription<N> {
    /// Stable type identifier of the batches this description marshals into.
    pub const CONSTRAINT_TYPE_ID: i32 = <ConvexContactFunctions<N>>::BATCH_TYPE_ID;
    /// Number of contacts in the described manifold.
    pub const CONTACT_COUNT: usize = N;

    /// Scatters this description into one lane of a prestep bundle, leaving the other
    /// lanes untouched. The targeted lane must be quiescent: not mid-solve on another
    /// worker.
    ///
    /// Field writes follow the prestep layout order so the access pattern matches the
    /// storage format contract.
    pub fn apply_description(&self, target: &mut ContactPrestep<N>, inner_index: usize) {
        for i in 0..N {
            target.offset_a[i].write_slot(self.contacts[i].offset_a, inner_index);
            GatherScatter::set(
                &mut target.penetration_depth[i],
                inner_index,
                self.contacts[i].penetration_depth,
            );
        }
        target.offset_b.write_slot(self.offset_b, inner_index);
        GatherScatter::set(
            &mut target.friction_coefficient,
            inner_index,
            self.friction_coefficient,
        );
        target.normal.write_slot(self.normal, inner_index);
        target
            .spring_settings
            .write_slot(&self.spring_settings, inner_index);
        GatherScatter::set(
            &mut target.maximum_recovery_velocity,
            inner_index,
            self.maximum_recovery_velocity,
        );
    }

    /// Gathers one lane of a prestep bundle back into a scalar description. The inverse
    /// of [`apply_description`](Self::apply_description), bit for bit.
    pub fn build_description(source: &ContactPrestep<N>, inner_index: usize) -> Self {
        let mut description = Self::default();
        for i in 0..N {
            description.contacts[i].offset_a = source.offset_a[i].read_slot(inner_index);
            description.contacts[i].penetration_depth =
                GatherScatter::get(&source.penetration_depth[i], inner_index);
        }
        description.offset_b = source.offset_b.read_slot(inner_index);
        description.friction_coefficient =
            GatherScatter::get(&source.friction_coefficient, inner_index);
        description.normal = source.normal.read_slot(inner_index);
        description.spring_settings = source.spring_settings.read_slot(inner_index);
        description.maximum_recovery_velocity =
            GatherScatter::get(&source.maximum_recovery_velocity, inner_index);
        description
    }

    /// Copies the manifold-wide properties shared by every contact (offset to body B,
    /// normal, material) into this description. Per-contact fields are assembled
    /// separately from the collision system's manifold.
    #[inline(always)]
    pub fn copy_manifold_wide_properties(
        &mut self,
        offset_b: Vec3,
        normal: Vec3,
        material: &PairMaterialProperties,
    ) {
        self.offset_b = offset_b;
        self.friction_coefficient = material.friction_coefficient;
        self.normal = normal;
        self.spring_settings = material.spring_settings;
        self.maximum_recovery_velocity = material.maximum_recovery_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::LANE_COUNT;

    fn test_description<const N: usize>() -> ContactDescription<N> {
        let mut description = ContactDescription::<N>::default();
        for i in 0..N {
            description.contacts[i] = ConstraintContactData {
                offset_a: Vec3::new(i as f32 + 0.125, -(i as f32) * 0.5, 3.0 + i as f32),
                penetration_depth: 0.01 * i as f32 - 0.005,
            };
        }
        description.copy_manifold_wide_properties(
            Vec3::new(0.0, -2.0, 0.25),
            Vec3::new(0.0, 1.0, 0.0),
            &PairMaterialProperties::new(0.8, 2.0, SpringSettings::new(30.0, 1.0)),
        );
        description
    }

    fn round_trip_lane<const N: usize>() {
        let description = test_description::<N>();
        let mut bundle = ContactPrestep::<N>::default();
        let untouched = ContactDescription::<N>::build_description(&bundle, 0);
        let target_lane = 2;
        description.apply_description(&mut bundle, target_lane);
        //The targeted lane reproduces the description exactly.
        let rebuilt = ContactDescription::<N>::build_description(&bundle, target_lane);
        assert_eq!(rebuilt, description);
        //Every other lane still reads as the untouched default.
        for lane in (0..LANE_COUNT).filter(|&lane| lane != target_lane) {
            let other = ContactDescription::<N>::build_description(&bundle, lane);
            assert_eq!(other, untouched);
        }
    }

    #[test]
    fn round_trip_is_bit_exact_and_lane_isolated() {
        round_trip_lane::<1>();
        round_trip_lane::<2>();
        round_trip_lane::<3>();
        round_trip_lane::<4>();
    }

    #[test]
    fn type_ids_are_stable() {
        assert_eq!(Contact1::CONSTRAINT_TYPE_ID, 4);
        assert_eq!(Contact2::CONSTRAINT_TYPE_ID, 5);
        assert_eq!(Contact3::CONSTRAINT_TYPE_ID, 6);
        assert_eq!(Contact4::CONSTRAINT_TYPE_ID, 7);
    }
}
