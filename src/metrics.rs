//! Prometheus metrics.
//!
//! The `metrics` macros are no-ops until a recorder is installed, so the
//! helpers below are safe to call whether or not `METRICS_ENABLED` is off.

use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const REQUEST_DURATION: &str = "lessonbook_http_request_duration_seconds";

/// `METRICS_ENABLED`, on unless set to `false` or `0`.
pub fn metrics_enabled() -> bool {
    std::env::var("METRICS_ENABLED")
        .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0"))
        .unwrap_or(true)
}

/// Installs the Prometheus recorder and its upkeep task.
/// Returns `None` when metrics are disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !metrics_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Request count, latency and in-flight gauge, labelled by route template.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let Some(route) = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
    else {
        // Unmatched paths would give every 404 its own series.
        return next.run(req).await;
    };

    gauge!("lessonbook_http_requests_in_flight").increment(1.0);
    let response = next.run(req).await;
    gauge!("lessonbook_http_requests_in_flight").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!("lessonbook_http_requests_total", "method" => method.clone(), "route" => route.clone(), "status" => status)
        .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Router exposing `/metrics`.
pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_calendar_generated(entries: i64) {
    counter!("lessonbook_calendars_generated_total").increment(1);
    histogram!("lessonbook_calendar_generated_entries").record(entries as f64);
}

pub fn track_calendar_renumbered() {
    counter!("lessonbook_calendar_renumbers_total").increment(1);
}

/// Rows handled by an import. `source` names the flow: "json", "csv", "roster".
pub fn track_import(source: &'static str, created: i64, updated: i64, ignored: i64) {
    for (outcome, rows) in [("created", created), ("updated", updated), ("ignored", ignored)] {
        counter!("lessonbook_import_rows_total", "source" => source, "outcome" => outcome)
            .increment(rows.max(0) as u64);
    }
}

pub fn track_export(format: &'static str) {
    counter!("lessonbook_exports_total", "format" => format).increment(1);
}

pub fn track_backup(created: bool, pruned: usize) {
    if created {
        counter!("lessonbook_backups_created_total").increment(1);
    }
    counter!("lessonbook_backups_pruned_total").increment(pruned as u64);
}
