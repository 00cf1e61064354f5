//! Convex contact constraint solving core.
//!
//! Turns a detected collision manifold (1-4 contact points between two convex bodies,
//! a shared normal, and per-contact penetration depths) into corrective impulses
//! applied to body velocities over a warm-started sequential impulse solve.
//!
//! Constraint instances are processed in SIMD-width bundles with a
//! structure-of-arrays layout; see [`physics::constraints::contact`] for the solver
//! pipeline and [`physics::constraints::type_batch`] for the persistent bundle
//! storage and its marshalling to and from scalar descriptions.
//!
//! The crate performs no locking, allocation, or I/O on the solve path. Partitioning
//! constraints so that no two bundles touching the same body execute concurrently is
//! the responsibility of the enclosing scheduler.

pub mod physics;
pub mod utilities;
