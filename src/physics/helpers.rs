use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;
use glam::Vec3;
use wide::CmpLt;

/// Shared miscellaneous helper functions.
pub struct Helpers;

impl Helpers {
    /// Builds an orthonormal basis from a unit normal vector (wide/SIMD version).
    ///
    /// Callers that need the same basis across multiple phases must regenerate it from
    /// the same normal rather than caching it; the computation is deterministic, so
    /// regeneration guarantees bit-identical tangents in every phase.
    #[inline(always)]
    pub fn build_orthonormal_basis(normal: &Vector3Wide) -> (Vector3Wide, Vector3Wide) {
        // This could probably be improved.
        let neg_one = Vector::splat(-1.0);
        let one = Vector::ONE;
        let zero = Vector::ZERO;

        let sign = normal.z.cmp_lt(zero).blend(neg_one, one);

        // This has a discontinuity at z==0. Raw frisvad has only one discontinuity,
        // though that region is more unpredictable than the revised version.
        let scale = neg_one / (sign + normal.z);
        let t1 = Vector3Wide {
            x: normal.x * normal.y * scale,
            y: sign + normal.y * normal.y * scale,
            z: -normal.y,
        };
        let t2 = Vector3Wide {
            x: one + sign * normal.x * normal.x * scale,
            y: sign * t1.x,
            z: -sign * normal.x,
        };
        (t1, t2)
    }

    /// Builds an orthonormal basis from a unit normal vector (scalar version).
    #[inline(always)]
    pub fn build_orthonormal_basis_scalar(normal: Vec3) -> (Vec3, Vec3) {
        let sign = if normal.z < 0.0 { -1.0f32 } else { 1.0f32 };
        let scale = -1.0 / (sign + normal.z);
        let t1 = Vec3::new(
            normal.x * normal.y * scale,
            sign + normal.y * normal.y * scale,
            -normal.y,
        );
        let t2 = Vec3::new(
            1.0 + sign * normal.x * normal.x * scale,
            sign * t1.x,
            -sign * normal.x,
        );
        (t1, t2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_basis(normal: Vec3) {
        let wide_normal = Vector3Wide::broadcast(normal);
        let (x, z) = Helpers::build_orthonormal_basis(&wide_normal);
        let x0 = x.read_slot(0);
        let z0 = z.read_slot(0);
        assert_relative_eq!(x0.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(z0.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(x0.dot(z0), 0.0, epsilon = 1e-5);
        assert_relative_eq!(x0.dot(normal), 0.0, epsilon = 1e-5);
        assert_relative_eq!(z0.dot(normal), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn basis_is_orthonormal() {
        check_basis(Vec3::new(0.0, 1.0, 0.0));
        check_basis(Vec3::new(0.0, 0.0, -1.0));
        check_basis(Vec3::new(0.6, 0.0, 0.8));
        check_basis(Vec3::new(-0.36, 0.48, 0.8));
    }

    #[test]
    fn wide_and_scalar_versions_agree() {
        let normal = Vec3::new(0.6, 0.8, 0.0);
        let (x_scalar, z_scalar) = Helpers::build_orthonormal_basis_scalar(normal);
        let (x_wide, z_wide) = Helpers::build_orthonormal_basis(&Vector3Wide::broadcast(normal));
        assert_eq!(x_wide.read_slot(2), x_scalar);
        assert_eq!(z_wide.read_slot(2), z_scalar);
    }
}
