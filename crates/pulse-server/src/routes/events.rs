//! Event ingestion route.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use pulse_ingest::MessageEnvelope;
use serde::Deserialize;

use crate::state::AppState;

/// Last millisecond of the year 9999.
const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", post(post_event))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestRequest {
    group_id: String,
    #[serde(default)]
    group_name: String,
    /// Epoch milliseconds; the server clock when absent.
    timestamp: Option<i64>,
    envelope: MessageEnvelope,
}

/// POST /api/events — apply one inbound message.
async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Response {
    let now = match req.timestamp {
        Some(ts) if !(0..=MAX_TIMESTAMP_MS).contains(&ts) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "timestamp out of range" })),
            )
                .into_response();
        }
        Some(ts) => ts,
        None => state.now(),
    };

    match state
        .engine
        .ingest(&req.envelope, &req.group_id, &req.group_name, now)
    {
        Some(record) => {
            let lead = record.view(now, state.engine.config().activity_window_ms);
            Json(serde_json::json!({
                "accepted": true,
                "lead": lead,
            }))
            .into_response()
        }
        None => Json(serde_json::json!({ "accepted": false })).into_response(),
    }
}
