//Centralised constraint-type registration for the convex contact family.
//
//The outer batch/scheduler system routes a manifold's storage and solve calls by a
//small integer type identifier. Those identifiers are encoded into persisted
//constraint batch snapshots, so the numbering here is permanent.

use crate::physics::constraints::type_batch::ContactTypeBatch;

/// First type identifier of the two body convex contact family; ids 0..=3 belong to
/// the one body variants in the wider engine's numbering.
pub const TWO_BODY_CONVEX_CONTACT_BASE_TYPE_ID: i32 = 4;

/// Maps a manifold contact count (1..=4) to the stable constraint type identifier used
/// by the batch scheduler.
#[inline(always)]
pub const fn contact_constraint_type_id(contact_count: usize) -> i32 {
    assert!(contact_count >= 1 && contact_count <= 4);
    contact_count as i32 - 1 + TWO_BODY_CONVEX_CONTACT_BASE_TYPE_ID
}

/// Maps a constraint type identifier back to its manifold contact count, if the id
/// belongs to the two body convex contact family.
#[inline(always)]
pub const fn contact_count_of_type(type_id: i32) -> Option<usize> {
    let offset = type_id - TWO_BODY_CONVEX_CONTACT_BASE_TYPE_ID;
    if offset >= 0 && offset < 4 {
        Some(offset as usize + 1)
    } else {
        None
    }
}

/// A convex contact type batch of any contact count: the closed set of manifold sizes
/// the collision system can produce, routed by contact count at creation and by type
/// identifier thereafter.
#[derive(Debug)]
pub enum ConvexContactBatch {
    Contact1(ContactTypeBatch<1>),
    Contact2(ContactTypeBatch<2>),
    Contact3(ContactTypeBatch<3>),
    Contact4(ContactTypeBatch<4>),
}

impl ConvexContactBatch {
    /// Creates a batch for manifolds of the given contact count (1..=4).
    pub fn for_contact_count(contact_count: usize, constraint_capacity: usize) -> Self {
        match contact_count {
            1 => Self::Contact1(ContactTypeBatch::with_capacity(constraint_capacity)),
            2 => Self::Contact2(ContactTypeBatch::with_capacity(constraint_capacity)),
            3 => Self::Contact3(ContactTypeBatch::with_capacity(constraint_capacity)),
            4 => Self::Contact4(ContactTypeBatch::with_capacity(constraint_capacity)),
            _ => panic!("convex manifolds have 1 to 4 contacts, got {contact_count}"),
        }
    }

    /// Creates a batch for the given persisted type identifier, if it belongs to the
    /// convex contact family.
    pub fn for_type_id(type_id: i32, constraint_capacity: usize) -> Option<Self> {
        contact_count_of_type(type_id)
            .map(|count| Self::for_contact_count(count, constraint_capacity))
    }

    /// The batch's stable type identifier.
    #[inline(always)]
    pub fn type_id(&self) -> i32 {
        match self {
            Self::Contact1(batch) => batch.type_id(),
            Self::Contact2(batch) => batch.type_id(),
            Self::Contact3(batch) => batch.type_id(),
            Self::Contact4(batch) => batch.type_id(),
        }
    }

    /// Number of contacts per constraint in the batch.
    #[inline(always)]
    pub fn contact_count(&self) -> usize {
        match self {
            Self::Contact1(batch) => batch.contact_count(),
            Self::Contact2(batch) => batch.contact_count(),
            Self::Contact3(batch) => batch.contact_count(),
            Self::Contact4(batch) => batch.contact_count(),
        }
    }

    /// Number of constraints currently stored in the batch.
    #[inline(always)]
    pub fn constraint_count(&self) -> usize {
        match self {
            Self::Contact1(batch) => batch.constraint_count(),
            Self::Contact2(batch) => batch.constraint_count(),
            Self::Contact3(batch) => batch.constraint_count(),
            Self::Contact4(batch) => batch.constraint_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_never_change() {
        //Persisted constraint batches encode these; renumbering them corrupts every
        //existing snapshot.
        assert_eq!(contact_constraint_type_id(1), 4);
        assert_eq!(contact_constraint_type_id(2), 5);
        assert_eq!(contact_constraint_type_id(3), 6);
        assert_eq!(contact_constraint_type_id(4), 7);
    }

    #[test]
    fn type_id_mapping_round_trips() {
        for count in 1..=4 {
            assert_eq!(contact_count_of_type(contact_constraint_type_id(count)), Some(count));
        }
        assert_eq!(contact_count_of_type(3), None);
        assert_eq!(contact_count_of_type(8), None);
    }

    #[test]
    fn batches_route_by_count_and_id() {
        for count in 1..=4 {
            let batch = ConvexContactBatch::for_contact_count(count, 16);
            assert_eq!(batch.contact_count(), count);
            assert_eq!(batch.type_id(), contact_constraint_type_id(count));
            let by_id = ConvexContactBatch::for_type_id(batch.type_id(), 0).unwrap();
            assert_eq!(by_id.contact_count(), count);
        }
        assert!(ConvexContactBatch::for_type_id(11, 0).is_none());
    }
}
