//! Request logging and subscriber setup.

use std::path::Path;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use lessonbook_config::ServerConfig;
use tracing::{Instrument, Level, info, info_span};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Reuses the caller's `x-request-id` or mints one.
fn request_id(req: &Request) -> String {
    req.headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// One event per request, at a level chosen by the response status. Every
/// event emitted while the handler runs carries the request span.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request_id(&req);
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        route = %route,
    );

    let mut response = next.run(req).instrument(span.clone()).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;
    let _entered = span.enter();
    match status {
        500..=599 => tracing::event!(Level::ERROR, status, latency_ms, "Request failed"),
        400..=499 => tracing::event!(Level::WARN, status, latency_ms, "Request rejected"),
        _ => tracing::event!(Level::INFO, status, latency_ms, "Request completed"),
    }

    response
}

fn default_filter() -> EnvFilter {
    // axum reports extractor rejections under `axum::rejection` at TRACE
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=debug,lessonbook_core=info,lessonbook_calendar=info,lessonbook_db=info,sqlx=warn,axum::rejection=trace",
            env!("CARGO_CRATE_NAME")
        ))
    })
}

/// Installs the global subscriber.
///
/// The console is compact text in development and JSON in production. Under
/// `log_dir`, `lessonbook.log` rotates daily with errors only and
/// `lessonbook.json` keeps everything at `info` and above.
pub fn init_tracing(server: &ServerConfig) -> anyhow::Result<()> {
    let log_dir = Path::new(&server.log_dir);
    std::fs::create_dir_all(log_dir)?;

    let console_layer = if server.env.is_production() {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_filter(default_filter())
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .with_filter(default_filter())
            .boxed()
    };

    let errors_layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, log_dir, "lessonbook.log"))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new("error"));

    let json_layer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, log_dir, "lessonbook.json"))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(errors_layer)
        .with(json_layer)
        .try_init()?;

    info!(log_dir = %log_dir.display(), env = %server.env, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_id_is_reused_when_present() {
        let req = Request::builder()
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");
    }

    #[test]
    fn test_request_id_is_minted_otherwise() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id(&req).len(), 36);
    }
}
