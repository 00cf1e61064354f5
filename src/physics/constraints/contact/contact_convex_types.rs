use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::physics::constraints::contact::contact_convex_common::{ContactImpulses, ContactPrestep};
use crate::physics::constraints::contact::penetration_limit::{
    PenetrationLimit, PenetrationLimitProjection,
};
use crate::physics::constraints::contact::tangent_friction::{
    TangentFriction, TangentFrictionProjection,
};
use crate::physics::constraints::contact::twist_friction::{TwistFriction, TwistFrictionProjection};
use crate::physics::helpers::Helpers;
use crate::utilities::vector::Vector;
use crate::utilities::vector3_wide::Vector3Wide;
use wide::{CmpEq, CmpLt};

/// Step-local cache derived from prestep data and body inertias for a convex manifold
/// with `N` contacts. Created fresh by every prestep and discarded after the step's
/// warm start and solve calls complete; never persisted.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ContactProjection<const N: usize> {
    pub inertia_a: BodyInertiaWide,
    pub inertia_b: BodyInertiaWide,
    /// Friction coefficient divided by the contact count; friction capacity is shared
    /// across the manifold's contacts.
    pub premultiplied_friction_coefficient: Vector,
    pub normal: Vector3Wide,
    pub tangent: TangentFrictionProjection,
    pub penetration: PenetrationLimitProjection<N>,
    //Lever arms aren't included in the twist projection because the number of arms
    //required varies independently of the twist projection itself.
    pub lever_arm: [Vector; N],
    pub twist: TwistFrictionProjection,
}

impl<const N: usize> Default for ContactProjection<N> {
    fn default() -> Self {
        Self {
            inertia_a: BodyInertiaWide::default(),
            inertia_b: BodyInertiaWide::default(),
            premultiplied_friction_coefficient: Vector::ZERO,
            normal: Vector3Wide::ZERO,
            tangent: TangentFrictionProjection::default(),
            penetration: PenetrationLimitProjection::default(),
            lever_arm: [Vector::ZERO; N],
            twist: TwistFrictionProjection::default(),
        }
    }
}

/// The convex manifold solver pipeline for `N` contacts, `N` in 1..=4.
///
/// The four manifold sizes share this one implementation; the per-size differences are
/// only the lengths of the inline per-contact arrays. See [`Contact1Functions`] through
/// [`Contact4Functions`] for the instantiations the scheduler dispatches to.
pub struct ConvexContactFunctions<const N: usize>;

impl<const N: usize> ConvexContactFunctions<N> {
    /// Computes the offset at which tangential and twist friction are considered to
    /// act, relative to body A.
    ///
    /// Contacts with negative depth are speculative and carry zero weight: if something
    /// is holding the inactive side up and swinging it around, a speculative contact
    /// included in the center would make friction fight the free swinging. When every
    /// contact is speculative, the weights fall back to uniform so the result stays
    /// defined instead of dividing zero by zero.
    #[inline(always)]
    pub fn compute_friction_center(
        offset_a: &[Vector3Wide; N],
        depth: &[Vector; N],
    ) -> Vector3Wide {
        //A single contact is its own friction center; no weighting required.
        if N == 1 {
            return offset_a[0];
        }
        //This can sometimes cause a weird center of friction. That's a bit strange, but
        //the alternative is often stranger.
        let zero = Vector::ZERO;
        let one = Vector::ONE;
        let mut weights = [Vector::ZERO; N];
        let mut weight_sum = Vector::ZERO;
        for i in 0..N {
            weights[i] = depth[i].cmp_lt(zero).blend(zero, one);
            weight_sum = weight_sum + weights[i];
        }
        let use_fallback = weight_sum.cmp_eq(zero);
        let weight_sum = use_fallback.blend(Vector::splat(N as f32), weight_sum);
        let inverse_weight_sum = one / weight_sum;
        let mut center = Vector3Wide::ZERO;
        for i in 0..N {
            let weight = use_fallback.blend(inverse_weight_sum, weights[i] * inverse_weight_sum);
            center = center + Vector3Wide::scale(&offset_a[i], &weight);
        }
        center
    }

    /// Derives the step-local projection from the prestep data and the bodies' inertia.
    #[inline(always)]
    pub fn prestep(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        dt: f32,
        inverse_dt: f32,
        prestep: &ContactPrestep<N>,
    ) -> ContactProjection<N> {
        //Be careful about the execution order here. It should be aligned with the
        //prestep data layout to ensure prefetching works well.
        let offset_to_manifold_center_a =
            Self::compute_friction_center(&prestep.offset_a, &prestep.penetration_depth);
        let offset_to_manifold_center_b = offset_to_manifold_center_a - prestep.offset_b;
        let premultiplied_friction_coefficient =
            Vector::splat(1.0 / N as f32) * prestep.friction_coefficient;
        //The tangent basis is not cached; warm start and solve rebuild it from the same
        //normal, so all three phases see bit-identical tangents.
        let (x, z) = Helpers::build_orthonormal_basis(&prestep.normal);
        let tangent = TangentFriction::prestep(
            &x,
            &z,
            &offset_to_manifold_center_a,
            &offset_to_manifold_center_b,
            inertia_a,
            inertia_b,
        );
        let penetration = PenetrationLimit::prestep(inertia_a, inertia_b, prestep, dt, inverse_dt);
        //Just assume the lever arms for B are the same. It's a good guess. (The only
        //reason we computed the offset B is that we didn't want to go into world space.)
        //For N == 1 the center is the contact itself, so the lever arm is zero.
        let mut lever_arm = [Vector::ZERO; N];
        for i in 0..N {
            lever_arm[i] =
                Vector3Wide::distance(&prestep.offset_a[i], &offset_to_manifold_center_a);
        }
        let twist = TwistFriction::prestep(inertia_a, inertia_b, &prestep.normal);
        ContactProjection {
            inertia_a: *inertia_a,
            inertia_b: *inertia_b,
            premultiplied_friction_coefficient,
            normal: prestep.normal,
            tangent,
            penetration,
            lever_arm,
            twist,
        }
    }

    /// Applies the previously accumulated impulses to the body velocities: tangential,
    /// then per contact normal, then twist.
    ///
    /// Must be called exactly once per step per bundle, before any solve; the stored
    /// impulses are applied in full on every call, so a second call with the same
    /// impulses double-applies them.
    #[inline(always)]
    pub fn warm_start(
        projection: &ContactProjection<N>,
        accumulated_impulses: &ContactImpulses<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let (x, z) = Helpers::build_orthonormal_basis(&projection.normal);
        TangentFriction::warm_start(
            &x,
            &z,
            &projection.tangent,
            &projection.inertia_a,
            &projection.inertia_b,
            &accumulated_impulses.tangent,
            wsv_a,
            wsv_b,
        );
        PenetrationLimit::warm_start(
            &projection.penetration,
            &projection.inertia_a,
            &projection.inertia_b,
            &projection.normal,
            &accumulated_impulses.penetration,
            wsv_a,
            wsv_b,
        );
        TwistFriction::warm_start(
            &projection.normal,
            &projection.inertia_a,
            &projection.inertia_b,
            &accumulated_impulses.twist,
            wsv_a,
            wsv_b,
        );
    }

    /// Runs one sequential impulse correction pass, mutating the body velocities and the
    /// accumulated impulses in place. Zero calls per step is valid; more calls improve
    /// convergence at linear cost.
    #[inline(always)]
    pub fn solve(
        projection: &ContactProjection<N>,
        accumulated_impulses: &mut ContactImpulses<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        let (x, z) = Helpers::build_orthonormal_basis(&projection.normal);
        //The friction cone radius tracks the current normal impulse estimate rather
        //than the previous step's, so friction responds within the iteration to a
        //changing normal load.
        let maximum_tangent_impulse = projection.premultiplied_friction_coefficient
            * accumulated_impulses.total_normal_impulse();
        TangentFriction::solve(
            &x,
            &z,
            &projection.tangent,
            &projection.inertia_a,
            &projection.inertia_b,
            &maximum_tangent_impulse,
            &mut accumulated_impulses.tangent,
            wsv_a,
            wsv_b,
        );
        //Note that we solve the penetration constraints after the friction constraints.
        //This makes the penetration constraints more authoritative at the cost of the
        //first iteration of the first frame of an impact lacking friction influence.
        //It's a pretty minor effect either way.
        PenetrationLimit::solve(
            &projection.penetration,
            &projection.inertia_a,
            &projection.inertia_b,
            &projection.normal,
            &mut accumulated_impulses.penetration,
            wsv_a,
            wsv_b,
        );
        //Torsional friction capacity scales with the normal load and with how far that
        //load acts from the friction center.
        let mut twist_bound = Vector::ZERO;
        for i in 0..N {
            twist_bound =
                twist_bound + accumulated_impulses.penetration[i] * projection.lever_arm[i];
        }
        let maximum_twist_impulse = projection.premultiplied_friction_coefficient * twist_bound;
        TwistFriction::solve(
            &projection.normal,
            &projection.inertia_a,
            &projection.inertia_b,
            &projection.twist,
            &maximum_twist_impulse,
            &mut accumulated_impulses.twist,
            wsv_a,
            wsv_b,
        );
    }

    /// Refreshes the stored penetration depths with the depth change implied by the
    /// bodies' unconstrained motion over a substep.
    #[inline(always)]
    pub fn incrementally_update_for_substep(
        dt: &Vector,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
        prestep: &mut ContactPrestep<N>,
    ) {
        for i in 0..N {
            PenetrationLimit::update_penetration_depth(
                dt,
                &prestep.offset_a[i],
                &prestep.offset_b,
                &prestep.normal,
                velocity_a,
                velocity_b,
                &mut prestep.penetration_depth[i],
            );
        }
    }
}

/// Uniform call contract shared by the four contact count specializations. The batch
/// scheduler routes a manifold's storage and solve calls through this interface using
/// the stable [`BATCH_TYPE_ID`](ContactConstraintFunctions::BATCH_TYPE_ID).
pub trait ContactConstraintFunctions {
    /// Number of contacts in this manifold type.
    const CONTACT_COUNT: usize;
    /// Stable identifier for this constraint type. Persisted constraint batches encode
    /// these ids; they must never be renumbered.
    const BATCH_TYPE_ID: i32;
    type Prestep;
    type Projection;
    type AccumulatedImpulses;

    fn prestep(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        dt: f32,
        inverse_dt: f32,
        prestep: &Self::Prestep,
    ) -> Self::Projection;
    fn warm_start(
        projection: &Self::Projection,
        accumulated_impulses: &Self::AccumulatedImpulses,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    );
    fn solve(
        projection: &Self::Projection,
        accumulated_impulses: &mut Self::AccumulatedImpulses,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    );
    fn incrementally_update_for_substep(
        dt: &Vector,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
        prestep: &mut Self::Prestep,
    );
}

impl<const N: usize> ContactConstraintFunctions for ConvexContactFunctions<N> {
    const CONTACT_COUNT: usize = N;
    //Matches the external manifold-type-as-constraint-type numbering; ids 0..=3 belong
    //to the one body variants.
    const BATCH_TYPE_ID: i32 = N as i32 + 3;
    type Prestep = ContactPrestep<N>;
    type Projection = ContactProjection<N>;
    type AccumulatedImpulses = ContactImpulses<N>;

    #[inline(always)]
    fn prestep(
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        dt: f32,
        inverse_dt: f32,
        prestep: &ContactPrestep<N>,
    ) -> ContactProjection<N> {
        Self::prestep(inertia_a, inertia_b, dt, inverse_dt, prestep)
    }

    #[inline(always)]
    fn warm_start(
        projection: &ContactProjection<N>,
        accumulated_impulses: &ContactImpulses<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        Self::warm_start(projection, accumulated_impulses, wsv_a, wsv_b)
    }

    #[inline(always)]
    fn solve(
        projection: &ContactProjection<N>,
        accumulated_impulses: &mut ContactImpulses<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        Self::solve(projection, accumulated_impulses, wsv_a, wsv_b)
    }

    #[inline(always)]
    fn incrementally_update_for_substep(
        dt: &Vector,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
        prestep: &mut ContactPrestep<N>,
    ) {
        Self::incrementally_update_for_substep(dt, velocity_a, velocity_b, prestep)
    }
}

/// Handles the solve iterations of a bunch of 1-contact two body manifold constraints.
pub type Contact1Functions = ConvexContactFunctions<1>;
/// Handles the solve iterations of a bunch of 2-contact two body manifold constraints.
pub type Contact2Functions = ConvexContactFunctions<2>;
/// Handles the solve iterations of a bunch of 3-contact two body manifold constraints.
pub type Contact3Functions = ConvexContactFunctions<3>;
/// Handles the solve iterations of a bunch of 4-contact two body manifold constraints.
pub type Contact4Functions = ConvexContactFunctions<4>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body_properties::{BodyInertia, BodyVelocity};
    use crate::physics::constraints::spring_settings::SpringSettings;
    use crate::utilities::symmetric3x3_wide::Symmetric3x3;
    use crate::utilities::vector::LANE_COUNT;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn sphere_inertia(radius: f32) -> BodyInertiaWide {
        //Solid sphere of unit mass: I = 2/5 r^2.
        let inverse = 1.0 / (0.4 * radius * radius);
        BodyInertiaWide::broadcast(&BodyInertia {
            inverse_inertia_tensor: Symmetric3x3::from_diagonal(inverse, inverse, inverse),
            inverse_mass: 1.0,
        })
    }

    fn kinematic_inertia() -> BodyInertiaWide {
        BodyInertiaWide::default()
    }

    fn make_prestep<const N: usize>(
        offsets: &[Vec3; N],
        depths: &[f32; N],
        offset_b: Vec3,
        normal: Vec3,
        friction_coefficient: f32,
    ) -> ContactPrestep<N> {
        let mut prestep = ContactPrestep::<N>::default();
        for i in 0..N {
            prestep.offset_a[i] = Vector3Wide::broadcast(offsets[i]);
            prestep.penetration_depth[i] = Vector::splat(depths[i]);
        }
        prestep.offset_b = Vector3Wide::broadcast(offset_b);
        prestep.friction_coefficient = Vector::splat(friction_coefficient);
        prestep.normal = Vector3Wide::broadcast(normal);
        let spring_settings = SpringSettings::new(30.0, 1.0);
        for slot in 0..LANE_COUNT {
            prestep.spring_settings.write_slot(&spring_settings, slot);
        }
        prestep.maximum_recovery_velocity = Vector::splat(2.0);
        prestep
    }

    fn centroid<const N: usize>(offsets: &[Vec3; N]) -> Vec3 {
        offsets.iter().sum::<Vec3>() / N as f32
    }

    #[test]
    fn friction_center_of_symmetric_active_contacts_is_the_centroid() {
        let offsets = [
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
        ];
        let depths = [Vector::splat(0.02); 4];
        let wide_offsets = offsets.map(Vector3Wide::broadcast);
        let center = ConvexContactFunctions::<4>::compute_friction_center(&wide_offsets, &depths);
        let expected = centroid(&offsets);
        for lane in 0..LANE_COUNT {
            assert_relative_eq!(center.read_slot(lane).x, expected.x, epsilon = 1e-6);
            assert_relative_eq!(center.read_slot(lane).y, expected.y, epsilon = 1e-6);
            assert_relative_eq!(center.read_slot(lane).z, expected.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn all_speculative_manifold_falls_back_to_the_centroid() {
        let offsets = [
            Vec3::new(2.0, 0.5, 0.0),
            Vec3::new(-1.0, 0.25, 1.0),
            Vec3::new(0.5, -0.5, -2.0),
        ];
        let depths = [
            Vector::splat(-0.1),
            Vector::splat(-0.2),
            Vector::splat(-0.05),
        ];
        let wide_offsets = offsets.map(Vector3Wide::broadcast);
        let center = ConvexContactFunctions::<3>::compute_friction_center(&wide_offsets, &depths);
        let result = center.read_slot(0);
        assert!(result.is_finite());
        let expected = centroid(&offsets);
        assert_relative_eq!(result.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(result.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(result.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn speculative_contacts_are_excluded_from_the_friction_center() {
        //Two active contacts, two speculative: the center is the midpoint of the
        //active pair only.
        let offsets = [
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, -1.0),
        ];
        let depths = [
            Vector::splat(0.05),
            Vector::splat(0.0),
            Vector::splat(-0.01),
            Vector::splat(-0.5),
        ];
        let wide_offsets = offsets.map(Vector3Wide::broadcast);
        let center = ConvexContactFunctions::<4>::compute_friction_center(&wide_offsets, &depths);
        let expected = (offsets[0] + offsets[1]) * 0.5;
        let result = center.read_slot(1);
        assert_relative_eq!(result.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(result.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(result.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn single_contact_lever_arm_is_exactly_zero() {
        let prestep = make_prestep(
            &[Vec3::new(0.3, -0.5, 0.1)],
            &[0.02],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.8,
        );
        let projection = ConvexContactFunctions::<1>::prestep(
            &sphere_inertia(0.5),
            &sphere_inertia(0.5),
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        assert_eq!(projection.lever_arm[0].to_array(), [0.0; LANE_COUNT]);
    }

    #[test]
    fn warm_starting_twice_equals_warm_starting_doubled_impulses() {
        let prestep = make_prestep(
            &[Vec3::new(0.5, -0.5, 0.0), Vec3::new(-0.5, -0.5, 0.0)],
            &[0.01, 0.01],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.8,
        );
        let inertia = sphere_inertia(0.5);
        let projection = ConvexContactFunctions::<2>::prestep(
            &inertia,
            &inertia,
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        let mut impulses = ContactImpulses::<2>::default();
        impulses.tangent.x = Vector::splat(0.3);
        impulses.tangent.y = Vector::splat(-0.2);
        impulses.penetration = [Vector::splat(1.0), Vector::splat(0.5)];
        impulses.twist = Vector::splat(0.1);
        let mut doubled = impulses;
        doubled.tangent.x = doubled.tangent.x * Vector::splat(2.0);
        doubled.tangent.y = doubled.tangent.y * Vector::splat(2.0);
        doubled.penetration = [Vector::splat(2.0), Vector::splat(1.0)];
        doubled.twist = doubled.twist * Vector::splat(2.0);

        let (mut twice_a, mut twice_b) = (BodyVelocityWide::default(), BodyVelocityWide::default());
        ConvexContactFunctions::<2>::warm_start(&projection, &impulses, &mut twice_a, &mut twice_b);
        ConvexContactFunctions::<2>::warm_start(&projection, &impulses, &mut twice_a, &mut twice_b);
        let (mut once_a, mut once_b) = (BodyVelocityWide::default(), BodyVelocityWide::default());
        ConvexContactFunctions::<2>::warm_start(&projection, &doubled, &mut once_a, &mut once_b);

        for lane in 0..LANE_COUNT {
            let twice = twice_a.linear.read_slot(lane);
            let once = once_a.linear.read_slot(lane);
            assert_relative_eq!(twice.x, once.x, epsilon = 1e-6);
            assert_relative_eq!(twice.y, once.y, epsilon = 1e-6);
            assert_relative_eq!(twice.z, once.z, epsilon = 1e-6);
            let twice = twice_b.angular.read_slot(lane);
            let once = once_b.angular.read_slot(lane);
            assert_relative_eq!(twice.x, once.x, epsilon = 1e-6);
            assert_relative_eq!(twice.y, once.y, epsilon = 1e-6);
            assert_relative_eq!(twice.z, once.z, epsilon = 1e-6);
        }
    }

    /// Drives a sliding, compressing two-contact manifold and checks the friction cone
    /// bounds after every iteration.
    #[test]
    fn friction_impulses_stay_inside_the_cone() {
        let prestep = make_prestep(
            &[Vec3::new(0.5, -0.5, 0.2), Vec3::new(-0.5, -0.5, -0.2)],
            &[0.01, 0.005],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.9,
        );
        let inertia_a = sphere_inertia(0.5);
        let inertia_b = kinematic_inertia();
        let projection = ConvexContactFunctions::<2>::prestep(
            &inertia_a,
            &inertia_b,
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        let mut impulses = ContactImpulses::<2>::default();
        let mut wsv_a = BodyVelocityWide::default();
        let mut wsv_b = BodyVelocityWide::default();
        wsv_a.linear = Vector3Wide::broadcast(Vec3::new(1.0, -0.2, 0.3));
        wsv_a.angular = Vector3Wide::broadcast(Vec3::new(0.1, 0.4, -0.1));
        ConvexContactFunctions::<2>::warm_start(&projection, &impulses, &mut wsv_a, &mut wsv_b);
        for _ in 0..8 {
            //The tangent clamp reads the normal impulse estimate at the start of the
            //iteration; the penetration solve then refines it. Either sum bounds the
            //stored tangent impulse.
            let normal_sum_before = impulses.total_normal_impulse().to_array();
            ConvexContactFunctions::<2>::solve(&projection, &mut impulses, &mut wsv_a, &mut wsv_b);
            let premultiplied = projection.premultiplied_friction_coefficient.to_array();
            for lane in 0..LANE_COUNT {
                let normal_sum = impulses.total_normal_impulse().to_array()[lane];
                let tangent_magnitude = impulses.tangent.length().to_array()[lane];
                assert!(normal_sum >= 0.0);
                let cone_radius = premultiplied[lane] * normal_sum.max(normal_sum_before[lane]);
                assert!(
                    tangent_magnitude <= cone_radius + 1e-4,
                    "tangent {tangent_magnitude} exceeded cone {cone_radius}"
                );
                let twist_capacity: f32 = (0..2)
                    .map(|i| {
                        impulses.penetration[i].to_array()[lane]
                            * projection.lever_arm[i].to_array()[lane]
                    })
                    .sum();
                let twist_magnitude = impulses.twist.to_array()[lane].abs();
                assert!(
                    twist_magnitude <= premultiplied[lane] * twist_capacity + 1e-4,
                    "twist {twist_magnitude} exceeded bound {}",
                    premultiplied[lane] * twist_capacity
                );
            }
        }
    }

    #[test]
    fn zero_friction_coefficient_leaves_friction_impulses_at_zero() {
        let prestep = make_prestep(
            &[
                Vec3::new(0.5, -0.5, 0.5),
                Vec3::new(-0.5, -0.5, 0.5),
                Vec3::new(0.0, -0.5, -0.5),
            ],
            &[0.02, 0.02, 0.01],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.0,
        );
        let inertia_a = sphere_inertia(0.5);
        let inertia_b = kinematic_inertia();
        let projection = ConvexContactFunctions::<3>::prestep(
            &inertia_a,
            &inertia_b,
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        let mut impulses = ContactImpulses::<3>::default();
        let mut wsv_a = BodyVelocityWide::default();
        let mut wsv_b = BodyVelocityWide::default();
        wsv_a.linear = Vector3Wide::broadcast(Vec3::new(2.0, -1.0, -0.7));
        wsv_a.angular = Vector3Wide::broadcast(Vec3::new(0.0, 3.0, 0.0));
        ConvexContactFunctions::<3>::warm_start(&projection, &impulses, &mut wsv_a, &mut wsv_b);
        for _ in 0..4 {
            ConvexContactFunctions::<3>::solve(&projection, &mut impulses, &mut wsv_a, &mut wsv_b);
        }
        assert!(impulses.total_normal_impulse().to_array()[0] > 0.0);
        assert_eq!(impulses.tangent.x.to_array(), [0.0; LANE_COUNT]);
        assert_eq!(impulses.tangent.y.to_array(), [0.0; LANE_COUNT]);
        assert_eq!(impulses.twist.to_array(), [0.0; LANE_COUNT]);
    }

    /// Two unit mass spheres stacked along Y, touching at depth zero. Gravity has been
    /// applied to the upper body between steps; one solve must produce a nonnegative
    /// normal impulse and keep the approach velocity inside the recovery bound.
    #[test]
    fn resting_contact_produces_no_pulling_impulse() {
        let radius = 0.5;
        let prestep = make_prestep(
            &[Vec3::new(0.0, -radius, 0.0)],
            &[0.0],
            Vec3::new(0.0, -2.0 * radius, 0.0),
            Vec3::Y,
            0.5,
        );
        let inertia = sphere_inertia(radius);
        let projection = ConvexContactFunctions::<1>::prestep(
            &inertia,
            &inertia,
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        let gravity_dt = 9.81 / 60.0;
        let mut wsv_a = BodyVelocityWide::broadcast(&BodyVelocity::from_linear(Vec3::new(
            0.0,
            -gravity_dt,
            0.0,
        )));
        let mut wsv_b = BodyVelocityWide::default();

        let mut impulses = ContactImpulses::<1>::default();
        ConvexContactFunctions::<1>::warm_start(&projection, &impulses, &mut wsv_a, &mut wsv_b);
        //Warm starting with zero impulses is a no-op.
        assert_eq!(wsv_a.linear.read_slot(0), Vec3::new(0.0, -gravity_dt, 0.0));
        ConvexContactFunctions::<1>::solve(&projection, &mut impulses, &mut wsv_a, &mut wsv_b);

        let normal_impulse = impulses.penetration[0].to_array()[0];
        assert!(normal_impulse >= 0.0, "contact pulled: {normal_impulse}");
        let relative_normal_velocity =
            (wsv_a.linear.read_slot(0) - wsv_b.linear.read_slot(0)).dot(Vec3::Y);
        let maximum_recovery_velocity = prestep.maximum_recovery_velocity.to_array()[0];
        assert!(relative_normal_velocity >= -maximum_recovery_velocity);
        //The solve removed most of the approach velocity.
        assert!(relative_normal_velocity > -gravity_dt);
        assert!(relative_normal_velocity < 1e-3);
    }

    #[test]
    fn solve_accumulates_rather_than_resets() {
        let prestep = make_prestep(
            &[Vec3::new(0.0, -0.5, 0.0)],
            &[0.0],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.5,
        );
        let inertia_a = sphere_inertia(0.5);
        let inertia_b = kinematic_inertia();
        let projection = ConvexContactFunctions::<1>::prestep(
            &inertia_a,
            &inertia_b,
            1.0 / 60.0,
            60.0,
            &prestep,
        );
        let mut impulses = ContactImpulses::<1>::default();
        let mut wsv_a = BodyVelocityWide::default();
        let mut wsv_b = BodyVelocityWide::default();
        wsv_a.linear = Vector3Wide::broadcast(Vec3::new(0.0, -1.0, 0.0));
        ConvexContactFunctions::<1>::warm_start(&projection, &impulses, &mut wsv_a, &mut wsv_b);
        let mut previous = 0.0;
        for _ in 0..6 {
            ConvexContactFunctions::<1>::solve(&projection, &mut impulses, &mut wsv_a, &mut wsv_b);
            let total = impulses.penetration[0].to_array()[0];
            //The running total converges from below; it never snaps back to zero.
            assert!(total >= previous - 1e-5);
            previous = total;
        }
        assert!(previous > 0.0);
    }

    #[test]
    fn incremental_substep_update_tracks_approach_velocity() {
        let mut prestep = make_prestep(
            &[Vec3::new(0.0, -0.5, 0.0)],
            &[0.1],
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::Y,
            0.5,
        );
        let mut velocity_a = BodyVelocityWide::default();
        //A moving up along the normal separates the pair; depth decreases.
        velocity_a.linear = Vector3Wide::broadcast(Vec3::new(0.0, 2.0, 0.0));
        let velocity_b = BodyVelocityWide::default();
        ConvexContactFunctions::<1>::incrementally_update_for_substep(
            &Vector::splat(0.5),
            &velocity_a,
            &velocity_b,
            &mut prestep,
        );
        assert_relative_eq!(
            prestep.penetration_depth[0].to_array()[0],
            0.1 - 2.0 * 0.5,
            epsilon = 1e-6
        );
    }
}
