//! Prometheus metrics: HTTP traffic plus a few domain counters.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use lms_core::UploadKind;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").expect("valid regex")
});
static NUMBER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\d+").expect("valid regex"));

pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware recording request count and latency per method, path and status.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Replace ids in a path with `:id` to keep label cardinality bounded.
fn normalize_path(path: &str) -> String {
    let normalized = UUID_SEGMENT.replace_all(path, ":id");
    NUMBER_SEGMENT.replace_all(&normalized, "/:id").into_owned()
}

pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// Outcome of a `POST /lessons/complete` call.
#[derive(Debug, Clone, Copy)]
pub enum CompletionOutcome {
    Recorded,
    AlreadyCompleted,
    Failed,
}

impl CompletionOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::AlreadyCompleted => "already_completed",
            Self::Failed => "failed",
        }
    }
}

pub fn record_lesson_completion(outcome: CompletionOutcome) {
    counter!("lesson_completions_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_course_completion() {
    counter!("course_completions_total").increment(1);
}

pub fn record_upload(kind: UploadKind, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("uploads_total", "kind" => kind.as_str(), "status" => status).increment(1);
}
