//! Pure builders for the objects the operator manages.

pub mod args;
pub mod compare;
pub mod container;
pub mod deployment;

pub use args::engine_args;
pub use compare::requires_update;
pub use container::primary_container;
pub use deployment::{deployment_name, desired_deployment, owner_reference, with_owner};
