//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod activity;
mod agency;
mod approval;
mod campaign;
mod client;
mod creator;
mod deliverable;
mod email_config;
mod membership;
mod payment;
mod project;
mod social_job;
mod user;

// Re-export all models for convenient imports
pub use activity::*;
pub use agency::*;
pub use approval::*;
pub use campaign::*;
pub use client::*;
pub use creator::*;
pub use deliverable::*;
pub use email_config::*;
pub use membership::*;
pub use payment::*;
pub use project::*;
pub use social_job::*;
pub use user::*;
