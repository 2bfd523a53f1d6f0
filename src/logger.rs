//! Forwarding of payload records to the relay client
//!
//! The relay call is awaited inline so that the request record is delivered
//! before the downstream handler runs and the response record before the
//! response leaves the middleware. Failures become a warning line.

use tracing::{info, warn};

use crate::client::RelayClient;
use crate::record::{CorrelationId, PayloadRecord};

/// Method name every record is posted to
pub const PAYLOAD_METHOD: &str = "payload";

/// Relay a record and report the outcome
///
/// Returns the record's correlation id so the caller can carry it into the
/// next phase.
pub async fn forward_record<R>(
    relay: &R,
    remote_host: &str,
    record: PayloadRecord,
) -> Option<CorrelationId>
where
    R: RelayClient + ?Sized,
{
    let outcome = relay.post(remote_host, PAYLOAD_METHOD, &record).await;

    if !outcome.is_successful {
        warn!(
            correlation_id = record.correlation_id_str(),
            error = %outcome.content,
            "Failed to write {} to Payload Api with CorrelationId: '{}', Error: {}",
            record.payload_type,
            record.correlation_id_str(),
            outcome.content
        );
    }

    info!(
        correlation_id = record.correlation_id_str(),
        "{} payload has been logged with CorrelationId: '{}'",
        record.payload_type,
        record.correlation_id_str()
    );

    record.correlation_id
}
