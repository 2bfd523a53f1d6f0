//! Payload record relayed to the payload logging service
//!
//! One record is produced per exchange phase. The JSON shape uses camelCase
//! field names and the literals `"Request"` / `"Response"` for the type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the exchange a record describes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    Request,
    Response,
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadType::Request => f.write_str("Request"),
            PayloadType::Response => f.write_str("Response"),
        }
    }
}

/// Identifier pairing a request record with its response record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Captured metadata and body of one exchange phase
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRecord {
    /// Host, path and query of the originating request
    pub source: String,

    /// HTTP method of the originating request
    pub http_verb: String,

    /// Raw query string including the leading `?`, empty when absent
    pub query: String,

    /// Request headers serialized as a JSON object
    pub headers: String,

    /// Minified body text
    pub payload: String,

    #[serde(rename = "type")]
    pub payload_type: PayloadType,

    pub correlation_id: Option<CorrelationId>,

    /// Response status, only set on `Response` records
    pub response_code: Option<u16>,
}

impl PayloadRecord {
    /// Correlation id as text, empty when unresolved
    pub fn correlation_id_str(&self) -> &str {
        self.correlation_id
            .as_ref()
            .map(CorrelationId::as_str)
            .unwrap_or_default()
    }
}
