//! Request body capture
//!
//! Drains the request payload into memory and puts an identical payload back
//! on the request, so downstream handlers read the same bytes they would
//! have read without the middleware.

use actix_web::{
    dev::{Payload, ServiceRequest},
    error::PayloadError,
    web::{Bytes, BytesMut},
    Error, HttpMessage,
};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;

/// Capture the full request body as text
///
/// Empty bodies yield an empty string. Read errors are returned unchanged to
/// the host's error handling.
pub async fn capture_request_body(req: &mut ServiceRequest) -> Result<String, Error> {
    let bytes = read_and_buffer_body(req).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read the payload chunk by chunk, then reinstall it for downstream handlers
async fn read_and_buffer_body(req: &mut ServiceRequest) -> Result<Bytes, PayloadError> {
    let mut payload = req.take_payload();
    let mut buffer = BytesMut::new();

    while let Some(chunk) = payload.next().await {
        buffer.extend_from_slice(&chunk?);
    }

    let bytes = buffer.freeze();
    req.set_payload(replay_payload(bytes.clone()));

    Ok(bytes)
}

fn replay_payload(bytes: Bytes) -> Payload {
    let chunks = if bytes.is_empty() { None } else { Some(Ok(bytes)) };
    Payload::Stream {
        payload: Box::pin(stream::iter(chunks))
            as Pin<Box<dyn Stream<Item = Result<Bytes, PayloadError>>>>,
    }
}
