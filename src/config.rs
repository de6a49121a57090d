//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the planner REST backend
    pub planner_api_url: String,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Timeout for each backend request
    pub request_timeout: Duration,
    /// Serve from the in-memory backend instead of the REST backend
    pub dev_backend: bool,

    /// JWT signing key shared with the auth service (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests: in-memory backend and a fixed signing key.
    pub fn test_default() -> Self {
        Self {
            planner_api_url: DEFAULT_API_URL.to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dev_backend: true,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY", "must not be empty".to_string()));
        }

        Ok(Self {
            planner_api_url: env::var("PLANNER_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            port: parse_or("PORT", DEFAULT_PORT)?,
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            dev_backend: env::var("PLANNER_DEV_BACKEND")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            jwt_signing_key: jwt_signing_key.into_bytes(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-wide, so everything lives in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("PLANNER_API_URL", "http://backend:5000/api");
        env::remove_var("PORT");
        env::set_var("REQUEST_TIMEOUT_SECS", "3");
        env::set_var("PLANNER_DEV_BACKEND", "1");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.planner_api_url, "http://backend:5000/api");
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(config.dev_backend);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PORT", _))
        ));
        env::remove_var("PORT");

        env::remove_var("JWT_SIGNING_KEY");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SIGNING_KEY"))
        ));
    }
}
