//! Lifecycle state machines.
//!
//! Two independent finite-state machines with explicit allowed-transition
//! tables. Any transition not in a table fails with an invalid-state error
//! naming the current and attempted state. Persistence guards every
//! transition with a compare-and-set on the previous status.

pub mod campaign;
pub mod deliverable;

pub use campaign::{campaign_transition_allowed, ensure_campaign_transition};
pub use deliverable::{deliverable_transition_allowed, ensure_deliverable_transition};
