//! Payload record construction
//!
//! Records are always built from a [`RequestSnapshot`] taken before the
//! request is handed downstream, so the response record reports the
//! request's host, path and headers.

use actix_web::{
    dev::ServiceRequest,
    http::header::{self, HeaderMap},
};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::debug;

use crate::record::{CorrelationId, PayloadRecord, PayloadType};
use crate::utils::{correlation_timestamp, minify_json_text};

/// Header that pins the correlation id of an exchange
pub const CORRELATION_ID_HEADER: &str = "X-PB-CorrelationId";

/// Request metadata needed to build both records of an exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub host: String,
    pub path: String,
    /// Query string with its leading `?`, empty when the request has none
    pub query: String,
    pub method: String,
    /// Headers serialized as a JSON object
    pub headers: String,
    /// Value of `X-PB-CorrelationId` if present and readable
    pub correlation_header: Option<String>,
}

impl RequestSnapshot {
    pub fn from_request(req: &ServiceRequest) -> Self {
        let query = match req.query_string() {
            "" => String::new(),
            qs => format!("?{qs}"),
        };
        let correlation_header = req
            .headers()
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            host: request_host(req),
            path: req.path().to_string(),
            query,
            method: req.method().to_string(),
            headers: serialize_headers(req.headers()),
            correlation_header,
        }
    }

    pub fn source(&self) -> String {
        format!("{}{}{}", self.host, self.path, self.query)
    }
}

/// Host as sent by the client in the `Host` header
///
/// Forwarding headers (`Forwarded`, `X-Forwarded-Host`) are not consulted.
/// Falls back to the URI authority, then to the server's configured host.
fn request_host(req: &ServiceRequest) -> String {
    if let Some(host) = req.headers().get(header::HOST).and_then(|v| v.to_str().ok()) {
        return host.to_string();
    }
    match req.uri().authority() {
        Some(authority) => authority.to_string(),
        None => req.app_config().host().to_string(),
    }
}

/// Phase of the exchange a record is built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Request,
    Response {
        status: u16,
        correlation_id: Option<CorrelationId>,
    },
}

/// Assemble the payload record for one phase of an exchange
pub fn build_payload_record(request: &RequestSnapshot, body: &str, phase: Phase) -> PayloadRecord {
    let payload = minify_json_text(body);

    let (payload_type, correlation_id, response_code) = match phase {
        Phase::Request => {
            let id = resolve_correlation_id(request.correlation_header.as_deref(), &payload);
            (PayloadType::Request, Some(id), None)
        }
        Phase::Response {
            status,
            correlation_id,
        } => (PayloadType::Response, correlation_id, Some(status)),
    };

    let record = PayloadRecord {
        source: request.source(),
        http_verb: request.method.clone(),
        query: request.query.clone(),
        headers: request.headers.clone(),
        payload,
        payload_type,
        correlation_id,
        response_code,
    };

    debug!(
        payload_type = %record.payload_type,
        http_verb = %record.http_verb,
        source = %record.source,
        headers = %record.headers,
        status_code = ?record.response_code,
        body = %record.payload,
        "built payload record"
    );

    record
}

/// Header value when non-blank, otherwise `<timestamp>-<payload length>`
///
/// The length is counted in UTF-16 code units.
fn resolve_correlation_id(header: Option<&str>, payload: &str) -> CorrelationId {
    match header {
        Some(value) if !value.trim().is_empty() => CorrelationId::new(value),
        _ => CorrelationId::new(format!(
            "{}-{}",
            correlation_timestamp(Utc::now()),
            payload.encode_utf16().count()
        )),
    }
}

/// Serialize headers as a JSON object of lowercase name to value
///
/// Repeated headers are joined with `", "`.
pub fn serialize_headers(headers: &HeaderMap) -> String {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    serde_json::to_string(&collected).unwrap_or_default()
}
