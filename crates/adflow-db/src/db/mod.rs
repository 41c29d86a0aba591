//! Database repositories for data access layer
//!
//! This module contains all repository implementations for database
//! operations. Each repository is responsible for a specific domain entity
//! and provides the queries the workflow core needs, and only those:
//! append-only entities (approvals, activity log) deliberately expose no
//! update or delete statements, and the payment repository's only path to
//! `paid` is a one-way compare-and-set.

pub mod activity_log;
pub mod agency;
pub mod approval;
pub mod campaign;
pub mod client;
pub mod creator;
pub mod deliverable;
pub mod email_config;
pub mod membership;
pub mod payment;
pub mod project;
pub mod social_job;
pub mod user;

pub use activity_log::ActivityLogRepository;
pub use agency::AgencyRepository;
pub use approval::ApprovalRepository;
pub use campaign::CampaignRepository;
pub use client::ClientRepository;
pub use creator::CreatorRepository;
pub use deliverable::DeliverableRepository;
pub use email_config::EmailConfigRepository;
pub use membership::MembershipRepository;
pub use payment::PaymentRepository;
pub use project::ProjectRepository;
pub use social_job::SocialJobRepository;
pub use user::UserRepository;
