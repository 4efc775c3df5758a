//! Type-safe configuration with validation.
//!
//! Loaded from environment variables, `.env` supported for local
//! development. The route table itself is code-level configuration
//! ([`crate::routes::RouteTable`]); this covers the ambient pieces: where
//! the identity backend lives, timeouts, bus capacity, and where the
//! session pair persists.

use crate::error::GateError;
use crate::events::{ChangeBus, DEFAULT_BUS_CAPACITY};
use crate::identity::HttpIdentityBackend;
use crate::session::{self, SessionStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable holding the URL
        field: String,
        /// Parse failure description
        reason: String,
    },

    /// Invalid timeout value
    #[error("Invalid timeout: must be greater than 0")]
    InvalidTimeout,

    /// Invalid channel capacity
    #[error("Invalid bus capacity: must be greater than 0")]
    InvalidCapacity,

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parse failure description
        reason: String,
    },
}

/// Session gate configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity backend base URL
    pub backend_url: Url,
    /// Per-request timeout in seconds (must be > 0)
    pub request_timeout_secs: u64,
    /// Change-bus capacity per listener (must be > 0)
    pub bus_capacity: usize,
    /// Where the token/role pair persists; in-memory when unset
    pub session_file: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unparseable or out-of-range values.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            backend_url: parse_url_env("IDENTITY_BACKEND_URL", "http://localhost:8080/api/")?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT", 10)?,
            bus_capacity: parse_env("CHANGE_BUS_CAPACITY", DEFAULT_BUS_CAPACITY)?,
            session_file: env::var("SESSION_FILE").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the HTTP identity backend from this config.
    ///
    /// # Errors
    ///
    /// Fails when the client cannot be constructed for the configured URL.
    pub fn http_backend(&self) -> Result<HttpIdentityBackend, GateError> {
        HttpIdentityBackend::new(&self.backend_url, self.request_timeout())
    }

    /// Builds the session store from this config.
    #[must_use]
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        session::store_at(self.session_file.as_deref())
    }

    /// Builds the change bus from this config.
    #[must_use]
    pub fn change_bus(&self) -> ChangeBus {
        ChangeBus::new(self.bus_capacity)
    }
}

/// Parse an environment variable with a default value.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a URL environment variable with a default value.
fn parse_url_env(name: &str, default: &str) -> Result<Url, ConfigError> {
    let url_str = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&url_str).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}
