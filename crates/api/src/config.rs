//! # API Configuration Module
//!
//! Loads the RosterDesk server configuration from environment variables,
//! falling back to defaults where a value is optional.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATA_DIR`: Root of the JSON data directory (default: "data")
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `SESSION_SECRET`: Secret used to sign session tokens
//! - `SESSION_TTL_HOURS`: Session lifetime in hours (default: 8)
//! - `API_REQUEST_TIMEOUT_SECONDS`: Request timeout (default: 30)
//! - `SHEETS_FETCH_TIMEOUT_SECONDS`: Google Sheets fetch timeout (default: 20)
//! - `COOKIE_SECURE`: Mark the session cookie `Secure` (default: false)

use std::env;
use std::path::PathBuf;

use eyre::{Result, WrapErr};
use rand::{Rng, distributions::Alphanumeric};
use tracing::{Level, warn};

/// Configuration for the RosterDesk API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use rosterdesk_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// Directory holding `tenants.json` and the per-tenant folders
    pub data_dir: PathBuf,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// HMAC secret for session tokens
    pub session_secret: String,

    /// Session lifetime in hours
    pub session_ttl_hours: i64,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Timeout for a single Google Sheets CSV download, in seconds
    pub sheets_fetch_timeout: u64,

    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The API_PORT value cannot be parsed as a u16
    /// - The SESSION_TTL_HOURS value is not a positive number
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Storage settings
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        // Logging settings
        let log_level = parse_log_level(&env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Security settings
        let session_secret = match env::var("SESSION_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("SESSION_SECRET is not set; sessions will not survive a restart");
                random_secret()
            }
        };
        let session_ttl_hours: i64 = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "8".to_string())
            .parse()
            .wrap_err("Invalid SESSION_TTL_HOURS value")?;
        if session_ttl_hours <= 0 {
            eyre::bail!("SESSION_TTL_HOURS must be positive");
        }
        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        let sheets_fetch_timeout = env::var("SHEETS_FETCH_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        Ok(Self {
            host,
            port,
            data_dir,
            log_level,
            cors_origins,
            session_secret,
            session_ttl_hours,
            request_timeout,
            sheets_fetch_timeout,
            cookie_secure,
        })
    }

    /// Configuration for tests and local tooling: everything defaulted,
    /// data kept under `data_dir`.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: data_dir.into(),
            log_level: Level::INFO,
            cors_origins: None,
            session_secret: random_secret(),
            session_ttl_hours: 8,
            request_timeout: 30,
            sheets_fetch_timeout: 20,
            cookie_secure: false,
        }
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
