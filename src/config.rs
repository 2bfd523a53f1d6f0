//! Configuration management for the payload logging middleware
//!
//! Loaded once at process start and shared read-only through an `Arc` by
//! every exchange. Missing required values are a startup error.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::PayloadLogError;
use crate::filter::IgnoreList;

pub const HOST_VAR: &str = "PAYLOAD_LOGGING_HOST";
pub const IGNORE_URLS_VAR: &str = "PAYLOAD_LOGGING_IGNORE_URLS";
pub const API_KEY_VAR: &str = "PAYLOAD_LOGGING_API_KEY";
pub const TIMEOUT_VAR: &str = "PAYLOAD_LOGGING_TIMEOUT_SECS";

/// Relay request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the payload logging middleware
///
/// Loaded from environment variables:
/// - `PAYLOAD_LOGGING_HOST`: base URL of the payload logging service (required)
/// - `PAYLOAD_LOGGING_IGNORE_URLS`: comma separated path substrings to skip
/// - `PAYLOAD_LOGGING_API_KEY`: optional bearer token sent to the service
/// - `PAYLOAD_LOGGING_TIMEOUT_SECS`: relay timeout in seconds (default 5)
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote payload logging service
    pub payload_logging_host: String,

    /// Paths exempt from capture
    pub ignore_urls: IgnoreList,

    /// Bearer token for the payload logging service
    pub api_key: Option<String>,

    /// Upper bound for a single relay call
    pub timeout: Duration,
}

impl Config {
    /// Create configuration with explicit values
    pub fn new(payload_logging_host: impl Into<String>, ignore_urls: IgnoreList) -> Self {
        Self {
            payload_logging_host: payload_logging_host.into(),
            ignore_urls,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, PayloadLogError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PayloadLogError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_VAR)
            .filter(|host| !host.trim().is_empty())
            .ok_or(PayloadLogError::MissingConfig(HOST_VAR))?;

        let ignore_urls = lookup(IGNORE_URLS_VAR)
            .map(|csv| IgnoreList::parse(&csv))
            .unwrap_or_default();

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| {
                    PayloadLogError::InvalidConfig(format!("{TIMEOUT_VAR}={raw:?} is not a number"))
                })?,
            None => DEFAULT_TIMEOUT,
        };

        let api_key = lookup(API_KEY_VAR).filter(|key| !key.is_empty());

        info!(
            host = %host,
            ignored = ignore_urls.entries().len(),
            "payload logging configured"
        );

        Ok(Self {
            payload_logging_host: host,
            ignore_urls,
            api_key,
            timeout,
        })
    }

    /// Wrap config in Arc for thread-safe sharing
    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}
