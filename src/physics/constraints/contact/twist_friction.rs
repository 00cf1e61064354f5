use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::utilities::symmetric3x3_wide::Symmetric3x3Wide;
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;
use wide::CmpEq;

/// Handles the torsional friction implementation for convex contact manifolds.
pub struct TwistFriction;

/// Step-local data cached by the twist friction prestep.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct TwistFrictionProjection {
    pub effective_mass: Vector,
}

impl TwistFriction {
    /// Computes the angular effective mass of the twist constraint about the manifold
    /// normal.
    #[inline(always)]
    pub fn prestep(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
    ) -> TwistFrictionProjection {
        //Compute effective mass matrix contributions. No linear contributions for the
        //twist constraint.
        //Note that we use angularJacobianA (that is, the normal) for both bodies despite
        //angularJacobianB = -angularJacobianA; J * M * JT is positive regardless.
        let angular_a = Symmetric3x3Wide::vector_sandwich(normal, &inertia_a.inverse_inertia_tensor);
        let angular_b = Symmetric3x3Wide::vector_sandwich(normal, &inertia_b.inverse_inertia_tensor);

        //Note that we have to guard against two bodies with infinite inertias. This is a
        //valid state! (We do not have to do such guarding on constraints with linear
        //jacobians; dynamic bodies cannot have zero *mass*.)
        let inverse_effective_mass = angular_a + angular_b;
        let inverse_is_zero = inverse_effective_mass.cmp_eq(Vector::ZERO);
        TwistFrictionProjection {
            effective_mass: inverse_is_zero.blend(Vector::ZERO, Vector::ONE / inverse_effective_mass),
        }
    }

    /// Transforms an impulse from constraint space to world space, uses it to modify the
    /// cached world space velocities of the bodies.
    #[inline(always)]
    pub fn apply_impulse(
        angular_jacobian_a: &Vector3Wide,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        corrective_impulse: &Vector,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let world_corrective_impulse = Vector3Wide::scale(angular_jacobian_a, corrective_impulse);
        let corrective_velocity_a =
            Symmetric3x3Wide::transform(&world_corrective_impulse, &inertia_a.inverse_inertia_tensor);
        let corrective_velocity_b =
            Symmetric3x3Wide::transform(&world_corrective_impulse, &inertia_b.inverse_inertia_tensor);
        wsv_a.angular = wsv_a.angular + corrective_velocity_a;
        wsv_b.angular = wsv_b.angular - corrective_velocity_b;
    }

    /// Computes the corrective twist impulse for the current velocities and accumulates
    /// it, clamped to `[-maximum_impulse, maximum_impulse]`.
    #[inline(always)]
    pub fn compute_corrective_impulse(
        angular_jacobian_a: &Vector3Wide,
        effective_mass: &Vector,
        wsv_a: &BodyVelocityWide,
        wsv_b: &BodyVelocityWide,
        maximum_impulse: &Vector,
        accumulated_impulse: &mut Vector,
    ) -> Vector {
        let csv_a = Vector3Wide::dot(&wsv_a.angular, angular_jacobian_a);
        let negated_csv_b = Vector3Wide::dot(&wsv_b.angular, angular_jacobian_a);
        //Since there is no bias or softness to give us the negative, we just do it when
        //we apply to the accumulated impulse.
        let negated_csi = (csv_a - negated_csv_b) * *effective_mass;

        let previous_accumulated = *accumulated_impulse;
        *accumulated_impulse = (previous_accumulated - negated_csi)
            .min(*maximum_impulse)
            .max(-*maximum_impulse);
        *accumulated_impulse - previous_accumulated
    }

    #[inline(always)]
    pub fn warm_start(
        normal: &Vector3Wide,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        accumulated_impulse: &Vector,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        Self::apply_impulse(normal, inertia_a, inertia_b, accumulated_impulse, wsv_a, wsv_b);
    }

    #[inline(always)]
    pub fn solve(
        normal: &Vector3Wide,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        projection: &TwistFrictionProjection,
        maximum_impulse: &Vector,
        accumulated_impulse: &mut Vector,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        //Note that friction constraints have no bias velocity. They target zero velocity.
        let corrective_csi = Self::compute_corrective_impulse(
            normal,
            &projection.effective_mass,
            wsv_a,
            wsv_b,
            maximum_impulse,
            accumulated_impulse,
        );
        Self::apply_impulse(normal, inertia_a, inertia_b, &corrective_csi, wsv_a, wsv_b);
    }
}
