//! # Payload Logging for Actix-Web
//!
//! Request/response payload capture middleware for Actix-Web applications.
//!
//! Every request body and every response body that passes through the
//! middleware is captured in full and relayed as a [`PayloadRecord`] to a
//! remote payload logging service, for audit and debugging. The two records
//! of one exchange share a correlation id.
//!
//! - **Transparent**: handlers and callers see exactly the bytes they would see
//!   without the middleware
//! - **Fail-safe**: a relay failure becomes a warning line, never a failed request
//! - **Ordered**: the request record is relayed before the handler runs and the
//!   response record before the response is returned
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpResponse, HttpServer};
//! use payload_logging_actix::{Config, IgnoreList, PayloadLoggingMiddleware};
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://payloads.example.com", IgnoreList::parse("health,swagger"));
//!     let payload_logging = PayloadLoggingMiddleware::from_config(config)?;
//!
//!     HttpServer::new(move || {
//!         App::new()
//!             .wrap(payload_logging.clone())
//!             .service(web::resource("/api/orders").to(|| async {
//!                 HttpResponse::Ok().body("[]")
//!             }))
//!     })
//!     .bind("0.0.0.0:8080")?
//!     .run()
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! [`Config::from_env`] reads:
//!
//! - `PAYLOAD_LOGGING_HOST`: payload logging service base URL (required)
//! - `PAYLOAD_LOGGING_IGNORE_URLS`: comma separated path substrings to skip
//! - `PAYLOAD_LOGGING_API_KEY`: optional bearer token
//! - `PAYLOAD_LOGGING_TIMEOUT_SECS`: relay timeout, 5 seconds by default
//!
//! The root path `/` is never logged.
//!
//! ## Correlation
//!
//! A request carrying `X-PB-CorrelationId` keeps that id. Otherwise the id is
//! synthesized as `<yyyyMMddHHmmssffff UTC>-<payload length>`.
//!
//! ## Architecture
//!
//! - `middleware`: Actix-Web middleware and per-exchange orchestration
//! - `request_body_capture` / `response_body_capture`: non-destructive body buffering
//! - `builder`: payload record construction and correlation id resolution
//! - `record`: the relayed data type
//! - `filter`: ignore list
//! - `client`: relay client trait and HTTP implementation
//! - `logger`: relay call plus its diagnostic lines
//! - `config`, `error`, `utils`: configuration, error types, helpers

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod logger;
pub mod middleware;
pub mod record;
pub mod request_body_capture;
pub mod response_body_capture;
pub mod utils;

// Re-export main components for easy access
pub use client::{HttpRelayClient, RelayClient, RelayOutcome};
pub use config::Config;
pub use error::PayloadLogError;
pub use filter::IgnoreList;
pub use middleware::PayloadLoggingMiddleware;
pub use record::{CorrelationId, PayloadRecord, PayloadType};

/// Convenience prelude for importing common types
pub mod prelude {
    pub use crate::client::{RelayClient, RelayOutcome};
    pub use crate::config::Config;
    pub use crate::error::PayloadLogError;
    pub use crate::filter::IgnoreList;
    pub use crate::middleware::PayloadLoggingMiddleware;
    pub use crate::record::{CorrelationId, PayloadRecord, PayloadType};
}
