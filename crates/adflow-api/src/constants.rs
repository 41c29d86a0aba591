//! API constants.

/// Versioned API base path.
pub const API_PREFIX: &str = "/api/v1";
