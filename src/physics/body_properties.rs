use crate::utilities::symmetric3x3_wide::{Symmetric3x3, Symmetric3x3Wide};
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;
use glam::Vec3;

/// Linear and angular velocity for a body (narrow/scalar form).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyVelocity {
    /// Linear velocity associated with the body.
    pub linear: Vec3,
    /// Angular velocity associated with the body.
    pub angular: Vec3,
}

impl BodyVelocity {
    /// Creates a velocity with the given linear component and zero angular velocity.
    #[inline(always)]
    pub fn from_linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

/// Inverse mass and inverse inertia for a body (narrow/scalar form).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyInertia {
    /// Inverse of the body's inertia tensor.
    pub inverse_inertia_tensor: Symmetric3x3,
    /// Inverse of the body's mass.
    pub inverse_mass: f32,
}

/// Linear and angular velocities for a bundle of bodies.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyVelocityWide {
    /// Linear velocities of the bundle.
    pub linear: Vector3Wide,
    /// Angular velocities of the bundle.
    pub angular: Vector3Wide,
}

/// Inverse mass and inertia for a bundle of bodies.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyInertiaWide {
    /// Inverse of the bundle's inertia tensors.
    pub inverse_inertia_tensor: Symmetric3x3Wide,
    /// Inverse of the bundle's masses.
    pub inverse_mass: Vector,
}

impl BodyVelocityWide {
    /// Fills every lane with the given narrow velocity.
    #[inline(always)]
    pub fn broadcast(source: &BodyVelocity) -> Self {
        Self {
            linear: Vector3Wide::broadcast(source.linear),
            angular: Vector3Wide::broadcast(source.angular),
        }
    }

    /// Writes a narrow velocity into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(&mut self, source: &BodyVelocity, slot_index: usize) {
        self.linear.write_slot(source.linear, slot_index);
        self.angular.write_slot(source.angular, slot_index);
    }

    /// Reads one lane of the bundle into a narrow velocity.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> BodyVelocity {
        BodyVelocity {
            linear: self.linear.read_slot(slot_index),
            angular: self.angular.read_slot(slot_index),
        }
    }
}

impl BodyInertiaWide {
    /// Fills every lane with the given narrow inertia.
    #[inline(always)]
    pub fn broadcast(source: &BodyInertia) -> Self {
        let mut wide = Self::default();
        for slot in 0..crate::utilities::vector::LANE_COUNT {
            wide.write_slot(source, slot);
        }
        wide
    }

    /// Writes a narrow inertia into one lane of the bundle.
    #[inline(always)]
    pub fn write_slot(&mut self, source: &BodyInertia, slot_index: usize) {
        self.inverse_inertia_tensor
            .write_slot(&source.inverse_inertia_tensor, slot_index);
        crate::utilities::gather_scatter::GatherScatter::set(
            &mut self.inverse_mass,
            slot_index,
            source.inverse_mass,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_lane_round_trip() {
        let mut bundle = BodyVelocityWide::default();
        let velocity = BodyVelocity {
            linear: Vec3::new(1.0, -2.0, 3.0),
            angular: Vec3::new(0.25, 0.0, -0.5),
        };
        bundle.write_slot(&velocity, 3);
        assert_eq!(bundle.read_slot(3), velocity);
        assert_eq!(bundle.read_slot(0), BodyVelocity::default());
    }

    #[test]
    fn inertia_broadcast_fills_every_lane() {
        let inertia = BodyInertia {
            inverse_inertia_tensor: Symmetric3x3::from_diagonal(2.5, 2.5, 2.5),
            inverse_mass: 1.0,
        };
        let wide = BodyInertiaWide::broadcast(&inertia);
        for slot in 0..crate::utilities::vector::LANE_COUNT {
            assert_eq!(
                wide.inverse_inertia_tensor.read_slot(slot),
                inertia.inverse_inertia_tensor
            );
            assert_eq!(wide.inverse_mass.to_array()[slot], 1.0);
        }
    }
}
