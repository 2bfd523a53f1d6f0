//! Basic usage example for the payload logging middleware
//!
//! Run with:
//! ```bash
//! PAYLOAD_LOGGING_HOST=http://localhost:9000 \
//! PAYLOAD_LOGGING_IGNORE_URLS=health \
//! RUST_LOG=payload_logging_actix=debug \
//! cargo run --example basic_usage
//! ```

use actix_web::{web, App, HttpResponse, HttpServer};
use payload_logging_actix::PayloadLoggingMiddleware;
use tracing_subscriber::EnvFilter;

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Hello payload logging!")
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "example-app"
    }))
}

async fn echo(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type("application/json").body(body)
}

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Fails fast when PAYLOAD_LOGGING_HOST is missing
    let payload_logging = PayloadLoggingMiddleware::from_env()?;

    tracing::info!("starting example server on http://0.0.0.0:8080");
    tracing::info!("try GET /, GET /health (ignored) and POST /api/echo");

    HttpServer::new(move || {
        App::new()
            .wrap(payload_logging.clone())
            .service(web::resource("/").route(web::get().to(index)))
            .service(web::resource("/health").route(web::get().to(health)))
            .service(web::resource("/api/echo").route(web::post().to(echo)))
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await?;

    Ok(())
}
