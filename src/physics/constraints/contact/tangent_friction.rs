use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::utilities::matrix2x3_wide::Matrix2x3Wide;
use crate::utilities::symmetric2x2_wide::Symmetric2x2Wide;
use crate::utilities::symmetric3x3_wide::Symmetric3x3Wide;
use crate::utilities::vector::Vector;
use crate::utilities::vector2_wide::Vector2Wide;
use crate::utilities::vector3_wide::Vector3Wide;

/// Handles the two axis tangent friction implementation for convex contact manifolds.
pub struct TangentFriction;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct TangentFrictionJacobians {
    pub linear_a: Matrix2x3Wide,
    pub angular_a: Matrix2x3Wide,
    pub angular_b: Matrix2x3Wide,
}

/// Step-local data cached by the tangent friction prestep.
///
/// Jacobians are regenerated from the shared tangent basis and these offsets on every
/// warm start and solve; only the offsets and the effective mass are worth caching.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct TangentFrictionProjection {
    pub offset_a: Vector3Wide,
    pub offset_b: Vector3Wide,
    pub effective_mass: Symmetric2x2Wide,
}

impl TangentFriction {
    //Since this is an unshared specialized implementation, the jacobian calculation is
    //kept in here rather than in the batch.
    #[inline(always)]
    pub fn compute_jacobians(
        tangent_x: &Vector3Wide,
        tangent_y: &Vector3Wide,
        offset_a: &Vector3Wide,
        offset_b: &Vector3Wide,
    ) -> TangentFrictionJacobians {
        //Two velocity constraints:
        //dot(velocity(p, A), tangentX) = dot(velocity(p, B), tangentX)
        //dot(velocity(p, A), tangentY) = dot(velocity(p, B), tangentY)
        //jLinearA = [ tangentX ]
        //           [ tangentY ]
        //jAngularA = [ offsetA x tangentX ]
        //            [ offsetA x tangentY ]
        //jLinearB = [ -tangentX ]
        //           [ -tangentY ]
        //jAngularB = [ tangentX x offsetB ]
        //            [ tangentY x offsetB ]
        TangentFrictionJacobians {
            linear_a: Matrix2x3Wide {
                x: *tangent_x,
                y: *tangent_y,
            },
            angular_a: Matrix2x3Wide {
                x: Vector3Wide::cross(offset_a, tangent_x),
                y: Vector3Wide::cross(offset_a, tangent_y),
            },
            angular_b: Matrix2x3Wide {
                x: Vector3Wide::cross(tangent_x, offset_b),
                y: Vector3Wide::cross(tangent_y, offset_b),
            },
        }
    }

    /// Computes the effective mass for the tangent constraint and caches it alongside
    /// the friction application offsets.
    #[inline(always)]
    pub fn prestep(
        tangent_x: &Vector3Wide,
        tangent_y: &Vector3Wide,
        offset_a: &Vector3Wide,
        offset_b: &Vector3Wide,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
    ) -> TangentFrictionProjection {
        let jacobians = Self::compute_jacobians(tangent_x, tangent_y, offset_a, offset_b);
        let linear_contribution_a =
            Symmetric2x2Wide::sandwich_scale(&jacobians.linear_a, &inertia_a.inverse_mass);
        let linear_contribution_b =
            Symmetric2x2Wide::sandwich_scale(&jacobians.linear_a, &inertia_b.inverse_mass);
        let angular_contribution_a =
            Symmetric3x3Wide::matrix_sandwich(&jacobians.angular_a, &inertia_a.inverse_inertia_tensor);
        let angular_contribution_b =
            Symmetric3x3Wide::matrix_sandwich(&jacobians.angular_b, &inertia_b.inverse_inertia_tensor);

        //No softening; the friction constraint is rigid. (It supports a maximum force,
        //but that is distinct from a proper damping ratio/natural frequency.)
        let inverse_effective_mass = linear_contribution_a
            + linear_contribution_b
            + angular_contribution_a
            + angular_contribution_b;
        TangentFrictionProjection {
            offset_a: *offset_a,
            offset_b: *offset_b,
            effective_mass: Symmetric2x2Wide::invert(&inverse_effective_mass),
        }
    }

    /// Transforms an impulse from constraint space to world space, uses it to modify the
    /// cached world space velocities of the bodies.
    #[inline(always)]
    pub fn apply_impulse(
        jacobians: &TangentFrictionJacobians,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        corrective_impulse: &Vector2Wide,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let linear_impulse_a = Matrix2x3Wide::transform(corrective_impulse, &jacobians.linear_a);
        let angular_impulse_a = Matrix2x3Wide::transform(corrective_impulse, &jacobians.angular_a);
        let angular_impulse_b = Matrix2x3Wide::transform(corrective_impulse, &jacobians.angular_b);

        let corrective_velocity_a_linear =
            Vector3Wide::scale(&linear_impulse_a, &inertia_a.inverse_mass);
        let corrective_velocity_a_angular =
            Symmetric3x3Wide::transform(&angular_impulse_a, &inertia_a.inverse_inertia_tensor);
        let corrective_velocity_b_linear =
            Vector3Wide::scale(&linear_impulse_a, &inertia_b.inverse_mass);
        let corrective_velocity_b_angular =
            Symmetric3x3Wide::transform(&angular_impulse_b, &inertia_b.inverse_inertia_tensor);

        wsv_a.linear = wsv_a.linear + corrective_velocity_a_linear;
        wsv_a.angular = wsv_a.angular + corrective_velocity_a_angular;
        //Note subtract; we based it on the LinearA jacobian.
        wsv_b.linear = wsv_b.linear - corrective_velocity_b_linear;
        wsv_b.angular = wsv_b.angular + corrective_velocity_b_angular;
    }

    /// Computes the corrective impulse for the current velocities, accumulates it, and
    /// scales the accumulated impulse back onto the friction disc bounded by
    /// `maximum_impulse`.
    #[inline(always)]
    pub fn compute_corrective_impulse(
        wsv_a: &BodyVelocityWide,
        wsv_b: &BodyVelocityWide,
        effective_mass: &Symmetric2x2Wide,
        jacobians: &TangentFrictionJacobians,
        maximum_impulse: &Vector,
        accumulated_impulse: &mut Vector2Wide,
    ) -> Vector2Wide {
        let csva_linear = Matrix2x3Wide::transform_by_transpose(&wsv_a.linear, &jacobians.linear_a);
        let csva_angular =
            Matrix2x3Wide::transform_by_transpose(&wsv_a.angular, &jacobians.angular_a);
        let csvb_linear = Matrix2x3Wide::transform_by_transpose(&wsv_b.linear, &jacobians.linear_a);
        let csvb_angular =
            Matrix2x3Wide::transform_by_transpose(&wsv_b.angular, &jacobians.angular_b);
        //Note that the velocity in constraint space is (csvaLinear - csvbLinear + csvaAngular + csvbAngular).
        //The subtraction there is due to sharing the linear jacobian between both bodies.
        //In the following, we need the constraint space *violating* velocity, which is
        //the negation of the above: (csvbLinear - csvaLinear - (csvaAngular + csvbAngular)).
        let csv = (csvb_linear - csva_linear) - (csva_angular + csvb_angular);
        let csi = Symmetric2x2Wide::transform(&csv, effective_mass);

        let previous_accumulated = *accumulated_impulse;
        *accumulated_impulse = previous_accumulated + csi;
        //The maximum force of friction depends upon the normal impulse. The maximum is
        //supplied per iteration.
        let accumulated_magnitude = accumulated_impulse.length();
        //Note division by zero guard.
        let scale = Vector::ONE
            .min(*maximum_impulse / accumulated_magnitude.max(Vector::splat(1e-16)));
        *accumulated_impulse = Vector2Wide::scale(accumulated_impulse, &scale);

        *accumulated_impulse - previous_accumulated
    }

    #[inline(always)]
    pub fn warm_start(
        tangent_x: &Vector3Wide,
        tangent_y: &Vector3Wide,
        projection: &TangentFrictionProjection,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        accumulated_impulse: &Vector2Wide,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let jacobians = Self::compute_jacobians(
            tangent_x,
            tangent_y,
            &projection.offset_a,
            &projection.offset_b,
        );
        Self::apply_impulse(
            &jacobians,
            inertia_a,
            inertia_b,
            accumulated_impulse,
            wsv_a,
            wsv_b,
        );
    }

    #[inline(always)]
    pub fn solve(
        tangent_x: &Vector3Wide,
        tangent_y: &Vector3Wide,
        projection: &TangentFrictionProjection,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        maximum_impulse: &Vector,
        accumulated_impulse: &mut Vector2Wide,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let jacobians = Self::compute_jacobians(
            tangent_x,
            tangent_y,
            &projection.offset_a,
            &projection.offset_b,
        );
        //Note that friction constraints have no bias velocity. They target zero velocity.
        let corrective_csi = Self::compute_corrective_impulse(
            wsv_a,
            wsv_b,
            &projection.effective_mass,
            &jacobians,
            maximum_impulse,
            accumulated_impulse,
        );
        Self::apply_impulse(&jacobians, inertia_a, inertia_b, &corrective_csi, wsv_a, wsv_b);
    }
}
