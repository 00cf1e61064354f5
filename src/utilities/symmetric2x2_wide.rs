use crate::utilities::matrix2x3_wide::Matrix2x3Wide;
use crate::utilities::vector::Vector;
use crate::utilities::vector2_wide::Vector2Wide;
use std::ops::Add;

/// Stores the lower left triangle (including diagonal) of a 2x2 matrix with SIMD lanes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Symmetric2x2Wide {
    pub xx: Vector,
    pub yx: Vector,
    pub yy: Vector,
}

impl Symmetric2x2Wide {
    /// Computes m * scale * transpose(m).
    /// This is a peculiar operation, but it's useful for computing linear effective mass
    /// contributions in 2DOF constraints.
    #[inline(always)]
    pub fn sandwich_scale(m: &Matrix2x3Wide, scale: &Vector) -> Self {
        Self {
            xx: *scale * (m.x.x * m.x.x + m.x.y * m.x.y + m.x.z * m.x.z),
            yx: *scale * (m.y.x * m.x.x + m.y.y * m.x.y + m.y.z * m.x.z),
            yy: *scale * (m.y.x * m.y.x + m.y.y * m.y.y + m.y.z * m.y.z),
        }
    }

    /// Inverts the symmetric matrix.
    #[inline(always)]
    pub fn invert(m: &Self) -> Self {
        let denom = Vector::ONE / (m.yx * m.yx - m.xx * m.yy);
        Self {
            xx: -m.yy * denom,
            yx: m.yx * denom,
            yy: -m.xx * denom,
        }
    }

    /// Transforms a 2d vector by the symmetric matrix: v * M.
    #[inline(always)]
    pub fn transform(v: &Vector2Wide, m: &Self) -> Vector2Wide {
        Vector2Wide {
            x: v.x * m.xx + v.y * m.yx,
            y: v.x * m.yx + v.y * m.yy,
        }
    }
}

impl Add for Symmetric2x2Wide {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            xx: self.xx + rhs.xx,
            yx: self.yx + rhs.yx,
            yy: self.yy + rhs.yy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn invert_times_original_is_identity() {
        let m = Symmetric2x2Wide {
            xx: Vector::splat(4.0),
            yx: Vector::splat(1.0),
            yy: Vector::splat(3.0),
        };
        let inverse = Symmetric2x2Wide::invert(&m);
        let v = Vector2Wide {
            x: Vector::splat(2.0),
            y: Vector::splat(-5.0),
        };
        let round_tripped = Symmetric2x2Wide::transform(&Symmetric2x2Wide::transform(&v, &m), &inverse);
        assert_relative_eq!(round_tripped.x.to_array()[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(round_tripped.y.to_array()[0], -5.0, epsilon = 1e-5);
    }
}
