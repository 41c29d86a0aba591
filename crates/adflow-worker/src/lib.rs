//! Background dispatch of social-data fetch jobs.
//!
//! The API writes job rows (the outbox); this crate delivers them to the
//! external fetch worker asynchronously. Delivery is at-least-once with the
//! job id as the idempotency key on the receiving side; the triggering
//! mutation never waits for a dispatch.

pub mod dispatcher;

pub use dispatcher::{DispatchPayload, DispatcherConfig, JobDispatcher, SnapshotDispatchPayload};
