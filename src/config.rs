use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::engine::ResultLimits;

/// Default HTTP port (matches the port the storefront frontend calls).
pub const DEFAULT_PORT: u16 = 5001;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every value
/// has a default, so an empty environment is a valid configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path (RECOMMENDER_DB_PATH)
    pub db_path: String,
    /// HTTP listen port (SERVICE_PORT)
    pub port: u16,
    /// HTTP bind address (SERVICE_BIND)
    pub bind: String,
    /// Result counts applied to every request
    /// (RECOMMENDER_DEFAULT_RESULTS / RECOMMENDER_MAX_RESULTS)
    pub limits: ResultLimits,
    /// Base URL of a running server, for `recommender query` (RECOMMENDER_URL)
    pub server_url: String,
    /// How many times the server tries to open the database (DB_CONNECT_RETRIES)
    pub db_connect_retries: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Malformed numbers and inconsistent result limits are errors here,
    /// so a bad deployment fails at startup instead of per request.
    pub fn load() -> Result<Self> {
        let defaults = ResultLimits::default();
        let default_results = parse_var("RECOMMENDER_DEFAULT_RESULTS", defaults.default_results)?;
        let max_results = parse_var("RECOMMENDER_MAX_RESULTS", defaults.max_results)?;
        let limits = ResultLimits::new(default_results, max_results)
            .context("Invalid RECOMMENDER_DEFAULT_RESULTS / RECOMMENDER_MAX_RESULTS")?;

        Ok(Self {
            db_path: env::var("RECOMMENDER_DB_PATH")
                .unwrap_or_else(|_| "./recommender.db".to_string()),
            port: parse_var("SERVICE_PORT", DEFAULT_PORT)?,
            bind: env::var("SERVICE_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            limits,
            server_url: env::var("RECOMMENDER_URL")
                .unwrap_or_else(|_| format!("http://localhost:{DEFAULT_PORT}")),
            db_connect_retries: parse_var("DB_CONNECT_RETRIES", 5)?,
        })
    }
}

/// Read and parse an env var, falling back to `default` when it's unset or blank.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable name so parallel tests don't race.

    #[test]
    fn test_parse_var_default_when_unset() {
        let v: u16 = parse_var("RECOMMENDER_TEST_UNSET_VAR", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn test_parse_var_reads_value() {
        env::set_var("RECOMMENDER_TEST_PORT_VAR", " 8080 ");
        let v: u16 = parse_var("RECOMMENDER_TEST_PORT_VAR", 1).unwrap();
        assert_eq!(v, 8080);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("RECOMMENDER_TEST_BAD_VAR", "lots");
        let err = parse_var::<usize>("RECOMMENDER_TEST_BAD_VAR", 1).unwrap_err();
        assert!(err.to_string().contains("RECOMMENDER_TEST_BAD_VAR"));
    }
}
