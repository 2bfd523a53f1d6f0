//! Error types for the payload logging middleware
//!
//! Configuration errors are fatal and surface at startup. Relay errors are
//! folded into a [`RelayOutcome`](crate::client::RelayOutcome) and end up as a
//! warning line, never as a failed exchange.

use thiserror::Error;

/// Main error type for payload logging operations
#[derive(Error, Debug)]
pub enum PayloadLogError {
    /// A required configuration value was not provided
    #[error("Missing configuration: {0} not provided")]
    MissingConfig(&'static str),

    /// A configuration value was present but unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client for the payload service could not be built (TLS backend, resolver)
    #[error("Failed to initialize relay client: {0}")]
    ClientInit(#[source] reqwest::Error),

    /// Network-related errors (connection, DNS, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The payload service answered with a non-success status code
    #[error("Payload service returned HTTP {status}: {content}")]
    SendFailed {
        status: reqwest::StatusCode,
        content: String,
    },

    /// JSON serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
