use crate::utilities::gather_scatter::GatherScatter;
use crate::utilities::matrix2x3_wide::Matrix2x3Wide;
use crate::utilities::symmetric2x2_wide::Symmetric2x2Wide;
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;

/// Stores the lower left triangle (including diagonal) of a 3x3 matrix with SIMD lanes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Symmetric3x3Wide {
    pub xx: Vector,
    pub yx: Vector,
    pub yy: Vector,
    pub zx: Vector,
    pub zy: Vector,
    pub zz: Vector,
}

impl Symmetric3x3Wide {
    /// Broadcasts a diagonal matrix into every lane.
    #[inline(always)]
    pub fn broadcast_diagonal(xx: f32, yy: f32, zz: f32) -> Self {
        Self {
            xx: Vector::splat(xx),
            yx: Vector::ZERO,
            yy: Vector::splat(yy),
            zx: Vector::ZERO,
            zy: Vector::ZERO,
            zz: Vector::splat(zz),
        }
    }

    /// Transforms a vector by the symmetric matrix: v * M.
    #[inline(always)]
    pub fn transform(v: &Vector3Wide, m: &Self) -> Vector3Wide {
        Vector3Wide {
            x: v.x * m.xx + v.y * m.yx + v.z * m.zx,
            y: v.x * m.yx + v.y * m.yy + v.z * m.zy,
            z: v.x * m.zx + v.y * m.zy + v.z * m.zz,
        }
    }

    /// Computes v * M * transpose(v) for a symmetric matrix M.
    #[inline(always)]
    pub fn vector_sandwich(v: &Vector3Wide, m: &Self) -> Vector {
        let x = v.x * m.xx + v.y * m.yx + v.z * m.zx;
        let y = v.x * m.yx + v.y * m.yy + v.z * m.zy;
        let z = v.x * m.zx + v.y * m.zy + v.z * m.zz;
        x * v.x + y * v.y + z * v.z
    }

    /// Computes m * t * transpose(m) for a 2x3 matrix m and symmetric 3x3 matrix t.
    #[inline(always)]
    pub fn matrix_sandwich(m: &Matrix2x3Wide, t: &Self) -> Symmetric2x2Wide {
        let ixx = m.x.x * t.xx + m.x.y * t.yx + m.x.z * t.zx;
        let ixy = m.x.x * t.yx + m.x.y * t.yy + m.x.z * t.zy;
        let ixz = m.x.x * t.zx + m.x.y * t.zy + m.x.z * t.zz;
        let iyx = m.y.x * t.xx + m.y.y * t.yx + m.y.z * t.zx;
        let iyy = m.y.x * t.yx + m.y.y * t.yy + m.y.z * t.zy;
        let iyz = m.y.x * t.zx + m.y.y * t.zy + m.y.z * t.zz;
        Symmetric2x2Wide {
            xx: ixx * m.x.x + ixy * m.x.y + ixz * m.x.z,
            yx: iyx * m.x.x + iyy * m.x.y + iyz * m.x.z,
            yy: iyx * m.y.x + iyy * m.y.y + iyz * m.y.z,
        }
    }

    /// Writes a scalar symmetric matrix into one lane of the wide matrix.
    #[inline(always)]
    pub fn write_slot(&mut self, source: &Symmetric3x3, slot_index: usize) {
        GatherScatter::set(&mut self.xx, slot_index, source.xx);
        GatherScatter::set(&mut self.yx, slot_index, source.yx);
        GatherScatter::set(&mut self.yy, slot_index, source.yy);
        GatherScatter::set(&mut self.zx, slot_index, source.zx);
        GatherScatter::set(&mut self.zy, slot_index, source.zy);
        GatherScatter::set(&mut self.zz, slot_index, source.zz);
    }

    /// Reads one lane of the wide matrix into a scalar symmetric matrix.
    #[inline(always)]
    pub fn read_slot(&self, slot_index: usize) -> Symmetric3x3 {
        Symmetric3x3 {
            xx: GatherScatter::get(&self.xx, slot_index),
            yx: GatherScatter::get(&self.yx, slot_index),
            yy: GatherScatter::get(&self.yy, slot_index),
            zx: GatherScatter::get(&self.zx, slot_index),
            zy: GatherScatter::get(&self.zy, slot_index),
            zz: GatherScatter::get(&self.zz, slot_index),
        }
    }
}

/// Scalar form of a symmetric 3x3 matrix (lower left triangle including diagonal).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Symmetric3x3 {
    pub xx: f32,
    pub yx: f32,
    pub yy: f32,
    pub zx: f32,
    pub zy: f32,
    pub zz: f32,
}

impl Symmetric3x3 {
    /// Creates a diagonal matrix.
    #[inline(always)]
    pub fn from_diagonal(xx: f32, yy: f32, zz: f32) -> Self {
        Self {
            xx,
            yy,
            zz,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn vector_sandwich_matches_transform_then_dot() {
        let m = Symmetric3x3Wide {
            xx: Vector::splat(2.0),
            yx: Vector::splat(0.5),
            yy: Vector::splat(3.0),
            zx: Vector::splat(-0.25),
            zy: Vector::splat(1.0),
            zz: Vector::splat(4.0),
        };
        let v = Vector3Wide::broadcast(Vec3::new(1.0, -2.0, 3.0));
        let transformed = Symmetric3x3Wide::transform(&v, &m);
        let expected = Vector3Wide::dot(&transformed, &v).to_array()[0];
        let sandwich = Symmetric3x3Wide::vector_sandwich(&v, &m).to_array()[0];
        assert_relative_eq!(sandwich, expected, epsilon = 1e-5);
    }
}
