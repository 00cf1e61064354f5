pub mod body_properties;
pub mod constraints;
pub mod helpers;
