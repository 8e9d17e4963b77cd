//! Community report route.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::state::AppState;

/// Upper bound on report generation, alias lookups included.
const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/report", get(get_report))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    group: Option<String>,
}

/// GET /api/report — cached report for one group or all groups.
async fn get_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReportQuery>,
) -> Response {
    let engine = state.engine.clone();
    let now = state.now();
    let group = params.group.clone();
    let task = tokio::task::spawn_blocking(move || engine.build_report(group.as_deref(), now));

    match tokio::time::timeout(REPORT_TIMEOUT, task).await {
        Ok(Ok(report)) => Json(report.as_ref()).into_response(),
        Ok(Err(e)) => {
            warn!("Report task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Report generation failed" })),
            )
                .into_response()
        }
        Err(_) => {
            warn!(
                "Report for {} timed out after {:?}",
                params.group.as_deref().unwrap_or("all groups"),
                REPORT_TIMEOUT
            );
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(serde_json::json!({ "error": "Report generation timed out" })),
            )
                .into_response()
        }
    }
}
