use crate::physics::body_properties::{BodyInertiaWide, BodyVelocityWide};
use crate::physics::constraints::body_references::TwoBodyReferences;
use crate::physics::constraints::contact::contact_convex_common::{
    ContactImpulses, ContactImpulsesLane, ContactPrestep,
};
use crate::physics::constraints::contact::contact_convex_descriptions::ContactDescription;
use crate::physics::constraints::contact::contact_convex_types::{
    ContactConstraintFunctions, ContactProjection, ConvexContactFunctions,
};
use crate::utilities::bundle_indexing::BundleIndexing;
use crate::utilities::vector::Vector;

/// Persistent bundle storage for every convex contact constraint of one contact count.
///
/// Prestep data, accumulated impulses, and body references are the only state that
/// survives across steps; projections are derived fresh each step and never stored
/// here. A manifold whose contact count changes must be removed and re-added through a
/// batch of the new count; lanes are never resized in place.
#[derive(Debug)]
pub struct ContactTypeBatch<const N: usize> {
    type_id: i32,
    constraint_count: usize,
    body_references: Vec<TwoBodyReferences>,
    prestep_data: Vec<ContactPrestep<N>>,
    accumulated_impulses: Vec<ContactImpulses<N>>,
}

impl<const N: usize> ContactTypeBatch<N> {
    /// Stable type identifier of the batch; see
    /// [`ContactConstraintFunctions::BATCH_TYPE_ID`].
    pub const TYPE_ID: i32 = <ConvexContactFunctions<N>>::BATCH_TYPE_ID;

    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty batch with room for the given number of constraints.
    pub fn with_capacity(constraint_capacity: usize) -> Self {
        let bundle_capacity = BundleIndexing::get_bundle_count(constraint_capacity);
        log::debug!(
            "created contact type batch: type id {}, {} contacts, capacity {}",
            Self::TYPE_ID,
            N,
            constraint_capacity
        );
        Self {
            type_id: Self::TYPE_ID,
            constraint_count: 0,
            body_references: Vec::with_capacity(bundle_capacity),
            prestep_data: Vec::with_capacity(bundle_capacity),
            accumulated_impulses: Vec::with_capacity(bundle_capacity),
        }
    }

    /// The batch's declared type identifier.
    #[inline(always)]
    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    /// Number of contacts per constraint in this batch.
    #[inline(always)]
    pub fn contact_count(&self) -> usize {
        N
    }

    /// Number of constraints currently stored.
    #[inline(always)]
    pub fn constraint_count(&self) -> usize {
        self.constraint_count
    }

    /// Number of bundles currently stored. The final bundle may be partially filled;
    /// its trailing lanes hold inert data.
    #[inline(always)]
    pub fn bundle_count(&self) -> usize {
        BundleIndexing::get_bundle_count(self.constraint_count)
    }

    /// Prestep bundles, for the scheduler's prestep and incremental update phases.
    #[inline(always)]
    pub fn prestep_data(&self) -> &[ContactPrestep<N>] {
        &self.prestep_data
    }

    /// Body reference bundles, for the scheduler's gather/scatter of body state.
    #[inline(always)]
    pub fn body_references(&self) -> &[TwoBodyReferences] {
        &self.body_references
    }

    /// Adds a constraint, returning its index within the batch. The new lane's
    /// accumulated impulses start at zero; the first warm start applies nothing.
    pub fn allocate(
        &mut self,
        body_a: i32,
        body_b: i32,
        description: &ContactDescription<N>,
    ) -> usize {
        let index = self.constraint_count;
        self.constraint_count += 1;
        let (bundle_index, inner_index) = BundleIndexing::get_bundle_indices(index);
        if bundle_index == self.prestep_data.len() {
            self.body_references.push(TwoBodyReferences::default());
            self.prestep_data.push(ContactPrestep::default());
            self.accumulated_impulses.push(ContactImpulses::default());
        }
        self.body_references[bundle_index].write_slot(body_a, body_b, inner_index);
        self.accumulated_impulses[bundle_index]
            .write_slot(&ContactImpulsesLane::default(), inner_index);
        description.apply_description(&mut self.prestep_data[bundle_index], inner_index);
        index
    }

    /// Removes the constraint at the given index, moving the last constraint into the
    /// vacated lane to keep the batch densely packed.
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < self.constraint_count);
        let last = self.constraint_count - 1;
        let (last_bundle, last_inner) = BundleIndexing::get_bundle_indices(last);
        if index != last {
            let (bundle_index, inner_index) = BundleIndexing::get_bundle_indices(index);
            let moved_description =
                ContactDescription::build_description(&self.prestep_data[last_bundle], last_inner);
            let moved_impulses = self.accumulated_impulses[last_bundle].read_slot(last_inner);
            let (moved_a, moved_b) = self.body_references[last_bundle].read_slot(last_inner);
            moved_description.apply_description(&mut self.prestep_data[bundle_index], inner_index);
            self.accumulated_impulses[bundle_index].write_slot(&moved_impulses, inner_index);
            self.body_references[bundle_index].write_slot(moved_a, moved_b, inner_index);
        }
        //Clear the vacated lane's impulses so the trailing lane stays inert if the
        //bundle is solved before the slot is reused.
        self.accumulated_impulses[last_bundle]
            .write_slot(&ContactImpulsesLane::default(), last_inner);
        self.constraint_count = last;
        let bundles = self.bundle_count();
        self.body_references.truncate(bundles);
        self.prestep_data.truncate(bundles);
        self.accumulated_impulses.truncate(bundles);
    }

    /// Scatters a description into the lane holding the constraint at `index`.
    ///
    /// The description's declared type must match the batch's. The targeted lane must
    /// be quiescent; the other lanes of the bundle are untouched.
    pub fn apply_description(&mut self, index: usize, description: &ContactDescription<N>) {
        debug_assert!(
            self.type_id == ContactDescription::<N>::CONSTRAINT_TYPE_ID,
            "The type batch passed to the description must match the description's expected type."
        );
        debug_assert!(index < self.constraint_count);
        let (bundle_index, inner_index) = BundleIndexing::get_bundle_indices(index);
        description.apply_description(&mut self.prestep_data[bundle_index], inner_index);
    }

    /// Gathers the constraint at `index` back into a scalar description.
    pub fn build_description(&self, index: usize) -> ContactDescription<N> {
        debug_assert!(
            self.type_id == ContactDescription::<N>::CONSTRAINT_TYPE_ID,
            "The type batch passed to the description must match the description's expected type."
        );
        debug_assert!(index < self.constraint_count);
        let (bundle_index, inner_index) = BundleIndexing::get_bundle_indices(index);
        ContactDescription::build_description(&self.prestep_data[bundle_index], inner_index)
    }

    /// Reads the accumulated impulses of the constraint at `index`, for inspection
    /// tooling.
    pub fn accumulated_impulses(&self, index: usize) -> ContactImpulsesLane<N> {
        debug_assert!(index < self.constraint_count);
        let (bundle_index, inner_index) = BundleIndexing::get_bundle_indices(index);
        self.accumulated_impulses[bundle_index].read_slot(inner_index)
    }

    /// Derives the step-local projection for one bundle. Called once per step per
    /// bundle, before the warm start.
    #[inline(always)]
    pub fn prestep_bundle(
        &self,
        bundle_index: usize,
        inertia_a: &BodyInertiaWide,
        inertia_b: &BodyInertiaWide,
        dt: f32,
        inverse_dt: f32,
    ) -> ContactProjection<N> {
        ConvexContactFunctions::<N>::prestep(
            inertia_a,
            inertia_b,
            dt,
            inverse_dt,
            &self.prestep_data[bundle_index],
        )
    }

    /// Applies one bundle's accumulated impulses to the gathered body velocities.
    /// Called exactly once per step per bundle, before any solve.
    #[inline(always)]
    pub fn warm_start_bundle(
        &self,
        bundle_index: usize,
        projection: &ContactProjection<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        ConvexContactFunctions::<N>::warm_start(
            projection,
            &self.accumulated_impulses[bundle_index],
            wsv_a,
            wsv_b,
        );
    }

    /// Runs one solve iteration over one bundle, mutating the gathered body velocities
    /// and the bundle's accumulated impulses.
    #[inline(always)]
    pub fn solve_bundle(
        &mut self,
        bundle_index: usize,
        projection: &ContactProjection<N>,
        wsv_a: &mut BodyVelocityWide,
        wsv_b: &mut BodyVelocityWide,
    ) {
        ConvexContactFunctions::<N>::solve(
            projection,
            &mut self.accumulated_impulses[bundle_index],
            wsv_a,
            wsv_b,
        );
    }

    /// Refreshes one bundle's penetration depths from the bodies' unconstrained motion
    /// over a substep.
    #[inline(always)]
    pub fn incrementally_update_bundle(
        &mut self,
        bundle_index: usize,
        dt: &Vector,
        velocity_a: &BodyVelocityWide,
        velocity_b: &BodyVelocityWide,
    ) {
        ConvexContactFunctions::<N>::incrementally_update_for_substep(
            dt,
            velocity_a,
            velocity_b,
            &mut self.prestep_data[bundle_index],
        );
    }
}
