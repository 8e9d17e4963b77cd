//! Engine stats route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/stats", get(get_stats))
}

/// GET /api/stats — engine counters and persistence status.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let now = state.now();
    let stats = state.engine.stats(now);

    Json(serde_json::json!({
        "leads": stats.leads,
        "messages": stats.messages,
        "ingested": stats.ingested,
        "lastEventAt": stats.last_event_at,
        "lastSavedAt": stats.last_saved_at,
        "savePending": stats.save_pending,
        "saveDueInMs": stats.save_due_in_ms,
        "cachedReports": stats.cached_reports,
        "uptimeMs": now.saturating_sub(state.started_at),
        "port": state.config.port,
        "snapshotFile": state.config.data_paths.snapshot_file.display().to_string(),
    }))
}
