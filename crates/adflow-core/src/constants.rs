//! Shared constants for the workflow core.

/// Credits consumed by one metered fetch (analytics snapshot or social-data job).
pub const FETCH_CREDIT_COST: i64 = 1;

/// Prefix for client-portal bearer keys. Keys are shown once at contact
/// creation; only the argon2 hash and this lookup prefix are stored.
pub const PORTAL_KEY_PREFIX: &str = "cp_live_";

/// Header carrying the caller's active agency when they belong to several.
pub const ACTIVE_AGENCY_HEADER: &str = "x-agency-id";

/// Header carrying the shared secret on dispatches to the fetch worker.
pub const INTERNAL_SECRET_HEADER: &str = "x-internal-secret";

/// Maximum length for entity names (agencies, clients, projects, campaigns).
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length for deliverable titles.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length for campaign briefs and approval comments.
pub const MAX_TEXT_LEN: usize = 10_000;
