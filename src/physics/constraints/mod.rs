pub mod body_references;
pub mod constraint_type_registration;
pub mod contact;
pub mod spring_settings;
pub mod type_batch;
