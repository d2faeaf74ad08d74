//! Core business logic for resolveit-rs.

pub mod permissions;
pub mod services;

pub use permissions::{Action, RolePermissions};
pub use services::*;
