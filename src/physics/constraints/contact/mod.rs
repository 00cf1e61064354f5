pub mod contact_convex_common;
pub mod contact_convex_descriptions;
pub mod contact_convex_types;
pub mod penetration_limit;
pub mod tangent_friction;
pub mod twist_friction;
