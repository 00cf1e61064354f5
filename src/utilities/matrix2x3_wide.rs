use crate::utilities::vector2_wide::Vector2Wide;
use crate::utilities::vector3_wide::Vector3Wide;

/// A 2x3 matrix with SIMD lanes, stored as two wide row vectors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Matrix2x3Wide {
    /// First row of the matrix.
    pub x: Vector3Wide,
    /// Second row of the matrix.
    pub y: Vector3Wide,
}

impl Matrix2x3Wide {
    /// Transforms a 2d vector by the matrix: v * M.
    #[inline(always)]
    pub fn transform(v: &Vector2Wide, m: &Self) -> Vector3Wide {
        Vector3Wide {
            x: v.x * m.x.x + v.y * m.y.x,
            y: v.x * m.x.y + v.y * m.y.y,
            z: v.x * m.x.z + v.y * m.y.z,
        }
    }

    /// Transforms a 3d vector by the transpose of the matrix: v * transpose(M).
    #[inline(always)]
    pub fn transform_by_transpose(v: &Vector3Wide, m: &Self) -> Vector2Wide {
        Vector2Wide {
            x: Vector3Wide::dot(v, &m.x),
            y: Vector3Wide::dot(v, &m.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::vector::Vector;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn transform_then_transpose_transform_is_gram_matrix() {
        let m = Matrix2x3Wide {
            x: Vector3Wide::broadcast(Vec3::new(1.0, 0.0, 0.0)),
            y: Vector3Wide::broadcast(Vec3::new(0.0, 1.0, 0.0)),
        };
        let v = Vector2Wide {
            x: Vector::splat(3.0),
            y: Vector::splat(-2.0),
        };
        let world = Matrix2x3Wide::transform(&v, &m);
        let back = Matrix2x3Wide::transform_by_transpose(&world, &m);
        assert_relative_eq!(back.x.to_array()[0], 3.0);
        assert_relative_eq!(back.y.to_array()[0], -2.0);
    }
}
