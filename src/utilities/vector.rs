use wide::{f32x4, i32x4};

/// Lane type for all wide math in the crate.
///
/// The solver processes `LANE_COUNT` independent constraint instances side by side,
/// every field stored as a structure of arrays over these lanes. Backed by
/// [`wide::f32x4`] so the crate builds on stable toolchains; the alias keeps lane
/// width a single-point decision.
pub type Vector = f32x4;

/// Integer companion of [`Vector`], used for per-lane body references.
pub type VectorI = i32x4;

/// Number of constraint lanes in one bundle.
pub const LANE_COUNT: usize = 4;

const _: () = assert!(core::mem::size_of::<Vector>() == LANE_COUNT * core::mem::size_of::<f32>());
