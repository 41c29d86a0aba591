//! Adflow Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! pure workflow logic (lifecycle state machines, approval aggregation, and
//! the role/permission matrix) shared across all Adflow components. It
//! performs no I/O; persistence lives in `adflow-db` and the HTTP surface in
//! `adflow-api`.

pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod permissions;
pub mod review;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use permissions::{role_grants, Permission};
