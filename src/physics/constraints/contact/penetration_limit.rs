use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::physics::constraints::contact::contact_convex_common::ContactPrestep;
use crate::physics::constraints::spring_settings::SpringSettingsWide;
use crate::utilities::symmetric3x3_wide::Symmetric3x3Wide;
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;

/// Handles the penetration limit implementation for all contacts of a convex manifold.
pub struct PenetrationLimit;

/// Step-local data cached by the penetration limit prestep for one contact.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PenetrationContactProjection {
    pub angular_a: Vector3Wide,
    pub angular_b: Vector3Wide,
    pub bias_velocity: Vector,
    pub effective_mass: Vector,
}

/// Step-local data cached by the penetration limit prestep. One entry per contact plus
/// the softness scale shared by the manifold's spring settings.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PenetrationLimitProjection<const N: usize> {
    pub contacts: [PenetrationContactProjection; N],
    pub softness_impulse_scale: Vector,
}

impl<const N: usize> Default for PenetrationLimitProjection<N> {
    fn default() -> Self {
        Self {
            contacts: [PenetrationContactProjection::default(); N],
            softness_impulse_scale: Vector::ZERO,
        }
    }
}

impl PenetrationLimit {
    /// Derives the per contact softness, bias velocity, and effective mass from the
    /// manifold's spring settings and penetration depths.
    #[inline(always)]
    pub fn prestep<const N: usize>(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        prestep: &ContactPrestep<N>,
        dt: f32,
        inverse_dt: f32,
    ) -> PenetrationLimitProjection<N> {
        let (position_error_to_velocity, effective_mass_cfm_scale, softness_impulse_scale) =
            SpringSettingsWide::compute_springiness(&prestep.spring_settings, dt);
        //Linear effective mass contribution notes:
        //1) J * M^-1 * JT can be reordered to J * JT * M^-1 for the linear components,
        //   since M^-1 is a scalar and dot(n * scalar, n) = dot(n, n) * scalar.
        //2) dot(normal, normal) == 1, so the contribution from each body is just its
        //   inverse mass.
        let linear = inertia_a.inverse_mass + inertia_b.inverse_mass;
        let inverse_dt_wide = Vector::splat(inverse_dt);
        let mut projection = PenetrationLimitProjection {
            contacts: [PenetrationContactProjection::default(); N],
            softness_impulse_scale,
        };
        for i in 0..N {
            let contact_offset_b = prestep.offset_a[i] - prestep.offset_b;
            let angular_a = Vector3Wide::cross(&prestep.offset_a[i], &prestep.normal);
            let angular_b = Vector3Wide::cross(&prestep.normal, &contact_offset_b);
            let angular_contribution_a =
                Symmetric3x3Wide::vector_sandwich(&angular_a, &inertia_a.inverse_inertia_tensor);
            let angular_contribution_b =
                Symmetric3x3Wide::vector_sandwich(&angular_b, &inertia_b.inverse_inertia_tensor);
            let effective_mass =
                effective_mass_cfm_scale / (linear + angular_contribution_a + angular_contribution_b);
            //Note that we leave the penetration depth as is, even when it's negative.
            //Speculative contacts! If depth is negative, the bias velocity will permit
            //motion up until the depth hits zero. This works because
            //positionErrorToVelocity * dt will always be <= 1.
            let depth = prestep.penetration_depth[i];
            let bias_velocity = (depth * inverse_dt_wide).min(
                (depth * position_error_to_velocity).min(prestep.maximum_recovery_velocity),
            );
            projection.contacts[i] = PenetrationContactProjection {
                angular_a,
                angular_b,
                bias_velocity,
                effective_mass,
            };
        }
        projection
    }

    /// Transforms an impulse from constraint space to world space, uses it to modify the
    /// cached world space velocities of the bodies.
    #[inline(always)]
    pub fn apply_impulse(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        angular_a: &Vector3Wide,
        angular_b: &Vector3Wide,
        corrective_impulse: &Vector,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let linear_velocity_change_a = *corrective_impulse * inertia_a.inverse_mass;
        let corrective_velocity_a_linear = Vector3Wide::scale(normal, &linear_velocity_change_a);
        let corrective_angular_impulse_a = Vector3Wide::scale(angular_a, corrective_impulse);
        let corrective_velocity_a_angular = Symmetric3x3Wide::transform(
            &corrective_angular_impulse_a,
            &inertia_a.inverse_inertia_tensor,
        );

        let linear_velocity_change_b = *corrective_impulse * inertia_b.inverse_mass;
        let corrective_velocity_b_linear = Vector3Wide::scale(normal, &linear_velocity_change_b);
        let corrective_angular_impulse_b = Vector3Wide::scale(angular_b, corrective_impulse);
        let corrective_velocity_b_angular = Symmetric3x3Wide::transform(
            &corrective_angular_impulse_b,
            &inertia_b.inverse_inertia_tensor,
        );

        wsv_a.linear = wsv_a.linear + corrective_velocity_a_linear;
        wsv_a.angular = wsv_a.angular + corrective_velocity_a_angular;
        //Note subtract; normal = -jacobianLinearB.
        wsv_b.linear = wsv_b.linear - corrective_velocity_b_linear;
        wsv_b.angular = wsv_b.angular + corrective_velocity_b_angular;
    }

    /// Computes the corrective impulse for one contact and accumulates it, clamping the
    /// accumulated impulse to be nonnegative.
    #[inline(always)]
    pub fn compute_corrective_impulse(
        wsv_a: &BodyVelocityWide,
        wsv_b: &BodyVelocityWide,
        normal: &Vector3Wide,
        contact: &PenetrationContactProjection,
        softness_impulse_scale: &Vector,
        accumulated_impulse: &mut Vector,
    ) -> Vector {
        //Note that we do NOT use pretransformed jacobians here; the linear jacobian
        //sharing (normal) meant that we had the effective mass anyway.
        let csva_linear = Vector3Wide::dot(&wsv_a.linear, normal);
        let csva_angular = Vector3Wide::dot(&wsv_a.angular, &contact.angular_a);
        let negated_csvb_linear = Vector3Wide::dot(&wsv_b.linear, normal);
        let csvb_angular = Vector3Wide::dot(&wsv_b.angular, &contact.angular_b);
        //Compute the negated version to avoid the need for an explicit negate.
        let negated_csi = *accumulated_impulse * *softness_impulse_scale
            + (csva_linear - negated_csvb_linear + csva_angular + csvb_angular
                - contact.bias_velocity)
                * contact.effective_mass;

        let previous_accumulated = *accumulated_impulse;
        *accumulated_impulse = (previous_accumulated - negated_csi).max(Vector::ZERO);
        *accumulated_impulse - previous_accumulated
    }

    #[inline(always)]
    pub fn warm_start<const N: usize>(
        projection: &PenetrationLimitProjection<N>,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        accumulated_impulses: &[Vector; N],
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        for i in 0..N {
            Self::apply_impulse(
                inertia_a,
                inertia_b,
                normal,
                &projection.contacts[i].angular_a,
                &projection.contacts[i].angular_b,
                &accumulated_impulses[i],
                wsv_a,
                wsv_b,
            );
        }
    }

    #[inline(always)]
    pub fn solve<const N: usize>(
        projection: &PenetrationLimitProjection<N>,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        normal: &Vector3Wide,
        accumulated_impulses: &mut [Vector; N],
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        for i in 0..N {
            let corrective_csi = Self::compute_corrective_impulse(
                wsv_a,
                wsv_b,
                normal,
                &projection.contacts[i],
                &projection.softness_impulse_scale,
                &mut accumulated_impulses[i],
            );
            Self::apply_impulse(
                inertia_a,
                inertia_b,
                normal,
                &projection.contacts[i].angular_a,
                &projection.contacts[i].angular_b,
                &corrective_csi,
                wsv_a,
                wsv_b,
            );
        }
    }

    /// Estimates the change in penetration depth produced by the unconstrained motion of
    /// the bodies over a substep and folds it into the stored depth.
    #[inline(always)]
    pub fn update_penetration_depth(
        dt: &Vector,
        contact_offset_a: &Vector3Wide,
        offset_b: &Vector3Wide,
        normal: &Vector3Wide,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
        penetration_depth: &mut Vector,
    ) {
        //The normal is calibrated to point from B to A. Any movement of A along N
        //results in a decrease in depth; any movement of B along N increases it.
        //estimatedDepthChange =
        //  dot(normal, velocityA.Linear + velocityA.Angular x contactOffsetA)
        //  - dot(normal, velocityB.Linear + velocityB.Angular x contactOffsetB)
        let contact_velocity_a =
            Vector3Wide::cross(&velocity_a.angular, contact_offset_a) + velocity_a.linear;
        let contact_offset_b = *contact_offset_a - *offset_b;
        let contact_velocity_b =
            Vector3Wide::cross(&velocity_b.angular, &contact_offset_b) + velocity_b.linear;
        let estimated_depth_change_velocity =
            Vector3Wide::dot(normal, &(contact_velocity_a - contact_velocity_b));
        *penetration_depth = *penetration_depth - estimated_depth_change_velocity * *dt;
    }
}
