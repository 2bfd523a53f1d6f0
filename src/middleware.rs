//! Actix-Web middleware implementation for payload logging
//!
//! Every exchange runs in two phases. The request body is captured and
//! relayed before the downstream service runs; the response body is captured
//! and relayed before the response is handed back to the server. Both relay
//! calls are awaited inline so log order follows exchange order, and neither
//! can fail the exchange.
//!
//! Responses on ignored paths are passed through without buffering, so
//! streaming endpoints (SSE, long downloads) on those paths keep flushing
//! chunk by chunk. Responses on logged paths are buffered in full before
//! they are sent.

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

use crate::builder::{build_payload_record, Phase, RequestSnapshot};
use crate::client::{HttpRelayClient, RelayClient};
use crate::config::Config;
use crate::error::PayloadLogError;
use crate::logger::forward_record;
use crate::record::CorrelationId;
use crate::request_body_capture::capture_request_body;
use crate::response_body_capture::capture_response_body;

/// Payload logging middleware for Actix-Web
///
/// Add this middleware to your Actix app via `.wrap()`:
///
/// ```rust,no_run
/// use actix_web::{App, HttpServer};
/// use payload_logging_actix::PayloadLoggingMiddleware;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let payload_logging = PayloadLoggingMiddleware::from_env()?;
///
/// HttpServer::new(move || App::new().wrap(payload_logging.clone()))
///     .bind("0.0.0.0:8080")?
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct PayloadLoggingMiddleware<R> {
    config: Arc<Config>,
    relay: Arc<R>,
}

impl<R: RelayClient> PayloadLoggingMiddleware<R> {
    pub fn new(config: Config, relay: R) -> Self {
        Self::with_shared(Arc::new(config), Arc::new(relay))
    }

    pub fn with_shared(config: Arc<Config>, relay: Arc<R>) -> Self {
        Self { config, relay }
    }
}

impl PayloadLoggingMiddleware<HttpRelayClient> {
    /// Middleware relaying over HTTP to the configured host
    pub fn from_config(config: Config) -> Result<Self, PayloadLogError> {
        let relay = HttpRelayClient::new(&config)?;
        Ok(Self::new(config, relay))
    }

    pub fn from_env() -> Result<Self, PayloadLogError> {
        Self::from_config(Config::from_env()?)
    }
}

impl<R> Clone for PayloadLoggingMiddleware<R> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            relay: Arc::clone(&self.relay),
        }
    }
}

impl<S, B, R> Transform<S, ServiceRequest> for PayloadLoggingMiddleware<R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    R: RelayClient + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = PayloadLoggingMiddlewareService<S, R>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(PayloadLoggingMiddlewareService {
            service: Rc::new(service),
            config: Arc::clone(&self.config),
            relay: Arc::clone(&self.relay),
        })
    }
}

/// The actual service that handles each request
pub struct PayloadLoggingMiddlewareService<S, R> {
    service: Rc<S>,
    config: Arc<Config>,
    relay: Arc<R>,
}

impl<S, B, R> Service<ServiceRequest> for PayloadLoggingMiddlewareService<S, R>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
    R: RelayClient + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let config = Arc::clone(&self.config);
        let relay = Arc::clone(&self.relay);

        Box::pin(async move {
            let request_body = capture_request_body(&mut req).await?;
            let request = RequestSnapshot::from_request(&req);
            let exchange =
                Exchange::log_request(request, &request_body, &config, relay.as_ref()).await;

            let res = service.call(req).await?;

            if exchange.is_ignored(&config) {
                trace!(
                    path = %exchange.request.path,
                    "response payload not logged, path is ignored"
                );
                return Ok(res.map_into_boxed_body());
            }

            let (res, response_body) = capture_response_body(res).await?;
            exchange
                .log_response(res.status().as_u16(), &response_body, &config, relay.as_ref())
                .await;

            Ok(res)
        })
    }
}

/// Per-exchange state carried from the request phase to the response phase
#[derive(Debug)]
struct Exchange {
    request: RequestSnapshot,
    /// Set by the request phase, `None` when it was skipped
    correlation_id: Option<CorrelationId>,
}

impl Exchange {
    async fn log_request<R>(request: RequestSnapshot, body: &str, config: &Config, relay: &R) -> Self
    where
        R: RelayClient + ?Sized,
    {
        let correlation_id = if config.ignore_urls.is_ignored(&request.path) {
            trace!(path = %request.path, "request payload not logged, path is ignored");
            None
        } else {
            let record = build_payload_record(&request, body, Phase::Request);
            forward_record(relay, &config.payload_logging_host, record).await
        };

        Self {
            request,
            correlation_id,
        }
    }

    fn is_ignored(&self, config: &Config) -> bool {
        config.ignore_urls.is_ignored(&self.request.path)
    }

    async fn log_response<R>(self, status: u16, body: &str, config: &Config, relay: &R)
    where
        R: RelayClient + ?Sized,
    {
        let phase = Phase::Response {
            status,
            correlation_id: self.correlation_id,
        };
        let record = build_payload_record(&self.request, body, phase);
        forward_record(relay, &config.payload_logging_host, record).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::IgnoreList;
    use crate::logger::tests::RecordingRelay;
    use crate::logger::PAYLOAD_METHOD;
    use crate::record::PayloadType;
    use actix_web::{
        body::BodySize,
        http::StatusCode,
        test::{self, TestRequest},
        web::{self, Bytes},
        App, HttpResponse,
    };
    use futures::stream;
    use tracing_test::traced_test;

    const HOST: &str = "http://payloads.local";

    fn middleware(ignore: &str, relay: &Arc<RecordingRelay>) -> PayloadLoggingMiddleware<RecordingRelay> {
        let config = Config::new(HOST, IgnoreList::parse(ignore));
        PayloadLoggingMiddleware::with_shared(Arc::new(config), Arc::clone(relay))
    }

    async fn echo(body: String) -> HttpResponse {
        HttpResponse::Ok().content_type("application/json").body(body)
    }

    fn is_synthesized(id: &str) -> bool {
        match id.split_once('-') {
            Some((timestamp, len)) => {
                timestamp.len() == 18
                    && timestamp.chars().all(|c| c.is_ascii_digit())
                    && !len.is_empty()
                    && len.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }

    #[actix_rt::test]
    async fn test_ignored_path_is_not_relayed() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("health", &relay))
                .route("/health", web::post().to(echo)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/health")
            .set_payload(r#"{ "ping": true }"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, r#"{ "ping": true }"#);
        assert!(relay.records().is_empty());
    }

    #[actix_rt::test]
    async fn test_root_path_is_not_relayed() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("", &relay))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("home") })),
        )
        .await;

        let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;

        assert_eq!(test::read_body(resp).await, "home");
        assert!(relay.records().is_empty());
    }

    #[actix_rt::test]
    async fn test_request_and_response_are_relayed() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("health", &relay))
                .route("/api/orders", web::post().to(echo)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/orders?page=2")
            .insert_header(("Host", "shop.example.com"))
            .set_payload(r#"{"a":1,  "b":2}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, r#"{"a":1,  "b":2}"#);

        let calls = relay.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|(host, method, _)| host == HOST && method == PAYLOAD_METHOD));

        let request = &calls[0].2;
        assert_eq!(request.payload_type, PayloadType::Request);
        assert_eq!(request.payload, r#"{"a":1,"b":2}"#);
        assert_eq!(request.http_verb, "POST");
        assert_eq!(request.source, "shop.example.com/api/orders?page=2");
        assert_eq!(request.query, "?page=2");
        assert_eq!(request.response_code, None);
        assert!(is_synthesized(request.correlation_id_str()));
        assert!(request.correlation_id_str().ends_with("-13"));

        let response = &calls[1].2;
        assert_eq!(response.payload_type, PayloadType::Response);
        assert_eq!(response.payload, r#"{"a":1,"b":2}"#);
        assert_eq!(response.response_code, Some(200));
        assert_eq!(response.correlation_id, request.correlation_id);
        assert_eq!(response.source, request.source);
        assert_eq!(response.headers, request.headers);
    }

    #[actix_rt::test]
    async fn test_correlation_header_is_propagated() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("", &relay))
                .route("/api/orders", web::post().to(echo)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/orders")
            .insert_header(("X-PB-CorrelationId", "abc123"))
            .set_payload("plain text  body")
            .to_request();
        test::call_service(&app, req).await;

        let records = relay.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].correlation_id_str(), "abc123");
        assert_eq!(records[1].correlation_id_str(), "abc123");
        assert_eq!(records[0].payload, "plain text  body");
        assert!(records[0].headers.contains(r#""x-pb-correlationid":"abc123""#));
    }

    #[actix_rt::test]
    async fn test_blank_correlation_header_is_synthesized() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("", &relay))
                .route("/api/orders", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = TestRequest::get()
            .uri("/api/orders")
            .insert_header(("X-PB-CorrelationId", " "))
            .to_request();
        test::call_service(&app, req).await;

        let records = relay.records();
        assert!(is_synthesized(records[0].correlation_id_str()));
        assert!(records[0].correlation_id_str().ends_with("-0"));
        assert_eq!(records[1].correlation_id, records[0].correlation_id);
    }

    #[actix_rt::test]
    async fn test_response_code_reflects_actual_status() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(App::new().wrap(middleware("", &relay)).route(
            "/api/orders",
            web::get().to(|| async { HttpResponse::NotFound().body("no such order") }),
        ))
        .await;

        let resp =
            test::call_service(&app, TestRequest::get().uri("/api/orders").to_request()).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let records = relay.records();
        assert_eq!(records[1].response_code, Some(404));
        assert_eq!(records[1].payload, "no such order");
    }

    #[actix_rt::test]
    async fn test_streamed_response_passes_through() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(App::new().wrap(middleware("", &relay)).route(
            "/api/export",
            web::get().to(|| async {
                HttpResponse::Ok().streaming(stream::iter(vec![
                    Ok::<_, std::io::Error>(Bytes::from_static(b"[1, ")),
                    Ok(Bytes::from_static(b"2, ")),
                    Ok(Bytes::from_static(b"3]")),
                ]))
            }),
        ))
        .await;

        let resp =
            test::call_service(&app, TestRequest::get().uri("/api/export").to_request()).await;

        assert_eq!(test::read_body(resp).await, Bytes::from_static(b"[1, 2, 3]"));
        assert_eq!(relay.records()[1].payload, "[1,2,3]");
    }

    #[actix_rt::test]
    async fn test_request_relayed_before_handler_and_response_before_return() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let seen_by_handler = Arc::clone(&relay);
        let app = test::init_service(App::new().wrap(middleware("", &relay)).route(
            "/api/orders",
            web::post().to(move |body: String| {
                let relay = Arc::clone(&seen_by_handler);
                async move {
                    let records = relay.records();
                    let kinds: Vec<String> =
                        records.iter().map(|r| r.payload_type.to_string()).collect();
                    let seen = format!("{}:{}:{}", records.len(), kinds.join(","), body);
                    HttpResponse::Ok().body(seen)
                }
            }),
        ))
        .await;

        let req = TestRequest::post()
            .uri("/api/orders")
            .set_payload("hi")
            .to_request();
        let resp = test::call_service(&app, req).await;

        // the response record is relayed before the response is handed back
        assert_eq!(relay.records().len(), 2);
        assert_eq!(test::read_body(resp).await, "1:Request:hi");
    }

    #[actix_rt::test]
    async fn test_source_uses_host_header() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(
            App::new()
                .wrap(middleware("", &relay))
                .route("/api/x", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = TestRequest::get()
            .uri("/api/x")
            .insert_header(("Host", "real.example.com"))
            .insert_header(("X-Forwarded-Host", "spoofed.evil"))
            .to_request();
        test::call_service(&app, req).await;

        let records = relay.records();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .all(|record| record.source == "real.example.com/api/x"));
    }

    #[actix_rt::test]
    async fn test_ignored_stream_is_not_buffered() {
        let relay = Arc::new(RecordingRelay::succeeding());
        let app = test::init_service(App::new().wrap(middleware("events", &relay)).route(
            "/events",
            web::get().to(|| async {
                HttpResponse::Ok().streaming(stream::iter(vec![
                    Ok::<_, std::io::Error>(Bytes::from_static(b"data: 1\n\n")),
                    Ok(Bytes::from_static(b"data: 2\n\n")),
                ]))
            }),
        ))
        .await;

        let resp =
            test::call_service(&app, TestRequest::get().uri("/events").to_request()).await;

        assert_eq!(resp.response().body().size(), BodySize::Stream);
        assert_eq!(
            test::read_body(resp).await,
            Bytes::from_static(b"data: 1\n\ndata: 2\n\n")
        );
        assert!(relay.records().is_empty());
    }

    #[actix_rt::test]
    #[traced_test]
    async fn test_relay_failure_does_not_affect_exchange() {
        let relay = Arc::new(RecordingRelay::failing("503 Service Unavailable"));
        let app = test::init_service(
            App::new()
                .wrap(middleware("", &relay))
                .route("/api/orders", web::post().to(echo)),
        )
        .await;

        let req = TestRequest::post()
            .uri("/api/orders")
            .insert_header(("X-PB-CorrelationId", "abc123"))
            .set_payload(r#"{"a":1}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, r#"{"a":1}"#);
        assert_eq!(relay.records().len(), 2);

        logs_assert(|lines: &[&str]| {
            let warnings = lines
                .iter()
                .filter(|line| line.contains("WARN") && line.contains("Failed to write"))
                .count();
            match warnings {
                2 => Ok(()),
                n => Err(format!("expected 2 relay warnings, got {n}")),
            }
        });
        assert!(logs_contain(
            "Failed to write Response to Payload Api with CorrelationId: 'abc123'"
        ));
    }
}
