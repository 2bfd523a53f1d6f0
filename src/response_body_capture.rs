//! Response body capture
//!
//! Collects the downstream response body into a buffer owned by the
//! exchange, then sends those same bytes on to the caller. The handler writes
//! its body as usual and never sees the capture.

use actix_web::{
    body::{self, BodySize, BoxBody, MessageBody},
    dev::ServiceResponse,
    error::ErrorInternalServerError,
    Error,
};
use std::error::Error as StdError;

/// Capture the response body as text and rebuild the response around the
/// captured bytes
pub async fn capture_response_body<B>(
    res: ServiceResponse<B>,
) -> Result<(ServiceResponse<BoxBody>, String), Error>
where
    B: MessageBody + 'static,
{
    let (req, res) = res.into_parts();
    let (head, body) = res.into_parts();

    let size = body.size();
    let bytes = body::to_bytes(body).await.map_err(|err| {
        let err: Box<dyn StdError> = err.into();
        ErrorInternalServerError(err.to_string())
    })?;
    let captured = String::from_utf8_lossy(&bytes).into_owned();

    // bodiless responses (204, 304, HEAD) must stay bodiless
    let replay = match size {
        BodySize::None => BoxBody::new(body::None::new()),
        _ => BoxBody::new(bytes),
    };

    Ok((ServiceResponse::new(req, head.set_body(replay)), captured))
}
