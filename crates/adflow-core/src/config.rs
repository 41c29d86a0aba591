//! Configuration module
//!
//! Environment-driven configuration for the API server and the job
//! dispatcher. Values are read once at startup into a typed `Config`.

use std::env;

use anyhow::{bail, Context, Result};

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_DISPATCH_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_DISPATCH_BATCH_SIZE: i64 = 10;
const DEFAULT_DISPATCH_MAX_ATTEMPTS: i32 = 5;
const DEFAULT_SIGNUP_TOKEN_GRANT: i64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Base URL of the external social fetch worker.
    pub fetch_worker_url: String,
    /// Shared secret sent on every dispatch in the internal header.
    pub internal_shared_secret: String,
    pub dispatch_poll_interval_ms: u64,
    pub dispatch_batch_size: i64,
    pub dispatch_max_attempts: i32,
    /// Credits granted to a new agency at signup.
    pub signup_token_grant: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is required")?;
        if jwt_secret.len() < 32 {
            bail!("JWT_SECRET must be at least 32 characters");
        }
        let internal_shared_secret =
            env::var("INTERNAL_SHARED_SECRET").context("INTERNAL_SHARED_SECRET is required")?;

        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT),
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            db_timeout_seconds: env_parse("DB_TIMEOUT_SECONDS", DEFAULT_CONNECTION_TIMEOUT_SECS),
            jwt_secret,
            jwt_expiry_hours: env_parse("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            fetch_worker_url: env::var("FETCH_WORKER_URL")
                .unwrap_or_else(|_| "http://localhost:4100".to_string()),
            internal_shared_secret,
            dispatch_poll_interval_ms: env_parse(
                "DISPATCH_POLL_INTERVAL_MS",
                DEFAULT_DISPATCH_POLL_INTERVAL_MS,
            ),
            dispatch_batch_size: env_parse("DISPATCH_BATCH_SIZE", DEFAULT_DISPATCH_BATCH_SIZE),
            dispatch_max_attempts: env_parse(
                "DISPATCH_MAX_ATTEMPTS",
                DEFAULT_DISPATCH_MAX_ATTEMPTS,
            ),
            signup_token_grant: env_parse("SIGNUP_TOKEN_GRANT", DEFAULT_SIGNUP_TOKEN_GRANT),
        })
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_falls_back_on_missing_or_garbage() {
        assert_eq!(env_parse("ADFLOW_TEST_MISSING_KEY", 42u32), 42);
        std::env::set_var("ADFLOW_TEST_GARBAGE_KEY", "not-a-number");
        assert_eq!(env_parse("ADFLOW_TEST_GARBAGE_KEY", 7u32), 7);
        std::env::remove_var("ADFLOW_TEST_GARBAGE_KEY");
    }
}
