//! Common utilities and shared types for resolveit-rs.
//!
//! This crate provides foundational components used across all resolveit-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Auth tokens**: JWT issuing and validation via [`JwtKeys`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]

pub mod auth;
pub mod config;
pub mod error;
pub mod id;

pub use auth::{Claims, JwtKeys};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
