use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::vector::Vector;
use glam::Vec3;
use std::ops::{Add, Mul, Neg, Sub};

/// Three dimensional vector with SIMD lanes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3Wide {
    /// First component of the vector.
    pub x: Vector,
    /// Second component of the vector.
    pub y: Vector,
    /// Third component of the vector.
    pub z: Vector,
}

impl Vector3Wide {
    /// Vector with all lanes of all components set to zero.
    pub const ZERO: Self = Self {
        x: Vector::ZERO,
        y: Vector::ZERO,
        z: Vector::ZERO,
    };

    /// Creates a vector by populating each component with the given lane values.
    #[inline(always)]
    pub fn new(x: Vector, y: Vector, z: Vector) -> Self {
        Self { x, y, z }
    }

    /// Multiplies every component of a vector by the given lane values.
    #[inline(always)]
    pub fn scale(vector: &Self, scalar: &Vector) -> Self {
        Self {
            x: vector.x * *scalar,
            y: vector.y * *scalar,
            z: vector.z * *scalar,
        }
    }

    /// Computes the inner product between two vectors.
    #[inline(always)]
    pub fn dot(a: &Self, b: &Self) -> Vector {
        a.x * b.x + a.y * b.y + a.z * b.z
    }

    /// Computes the cross product between two vectors.
    #[inline(always)]
    pub fn cross(a: &Self, b: &Self) -> Self {
        Self {
            x: a.y * b.z - a.z * b.y,
            y: a.z * b.x - a.x * b.z,
            z: a.x * b.y - a.y * b.x,
        }
    }

    #[inline(always)]
    pub fn length_squared(&self) -> Vector {
        Self::dot(self, self)
    }

    #[inline(always)]
    pub fn length(&self) -> Vector {
        self.length_squared().sqrt()
    }

    /// Computes the per-lane distance between two vectors.
    #[inline(always)]
    pub fn distance(a: &Self, b: &Self) -> Vector {
        (*b - *a).length()
    }

    /// Fills every lane of the wide vector with the given narrow value.
    #[inline(always)]
    pub fn broadcast(source: Vec3) -> Self {
        Self {
            x: Vector::splat(source.x),
            y: Vector::splat(source.y),
            z: Vector::splat(source.z),
        }
    }

    /// Reads one lane of the wide vector into a narrow vector.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> Vec3 {
        Vec3::new(
            GatherScatter::get(&self.x, slot_index),
            GatherScatter::get(&self.y, slot_index),
            GatherScatter::get(&self.z, slot_index),
        )
    }

    /// Writes a narrow vector into one lane of the wide vector, leaving other lanes untouched.
    #[inline(always)]
    pub fn write_slot(&mut self, source: Vec3, slot_index: usize) {
        GatherScatter::set(&mut self.x, slot_index, source.x);
        GatherScatter::set(&mut self.y, slot_index, source.y);
        GatherScatter::set(&mut self.z, slot_index, source.z);
    }
}

impl Add for Vector3Wide {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vector3Wide {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Mul<Vector> for Vector3Wide {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Vector) -> Self {
        Self::scale(&self, &rhs)
    }
}

impl Neg for Vector3Wide {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_matches_narrow_cross() {
        let a = Vector3Wide::broadcast(Vec3::new(1.0, 2.0, 3.0));
        let b = Vector3Wide::broadcast(Vec3::new(-4.0, 0.5, 2.0));
        let wide = Vector3Wide::cross(&a, &b);
        let narrow = Vec3::new(1.0, 2.0, 3.0).cross(Vec3::new(-4.0, 0.5, 2.0));
        assert_relative_eq!(wide.read_slot(0).x, narrow.x);
        assert_relative_eq!(wide.read_slot(3).y, narrow.y);
        assert_relative_eq!(wide.read_slot(1).z, narrow.z);
    }

    #[test]
    fn write_slot_leaves_other_lanes_untouched() {
        let mut v = Vector3Wide::broadcast(Vec3::ONE);
        v.write_slot(Vec3::new(5.0, 6.0, 7.0), 1);
        assert_eq!(v.read_slot(0), Vec3::ONE);
        assert_eq!(v.read_slot(1), Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(v.read_slot(2), Vec3::ONE);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Vector3Wide::broadcast(Vec3::new(1.0, 0.0, 0.0));
        let b = Vector3Wide::broadcast(Vec3::new(0.0, 1.0, 0.0));
        let d0 = Vector3Wide::distance(&a, &b).to_array()[0];
        let d1 = Vector3Wide::distance(&b, &a).to_array()[0];
        assert_relative_eq!(d0, 2.0f32.sqrt());
        assert_relative_eq!(d0, d1);
    }
}
