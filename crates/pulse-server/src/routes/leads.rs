//! Lead ranking and top-words routes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_WORD_LIMIT: usize = 20;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/leads", get(get_leads))
        .route("/words", get(get_words))
}

#[derive(Debug, Deserialize)]
struct ScopeQuery {
    group: Option<String>,
    limit: Option<usize>,
}

/// GET /api/leads — highest-scoring leads, optionally for one group.
async fn get_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScopeQuery>,
) -> Json<serde_json::Value> {
    let limit = params
        .limit
        .unwrap_or(state.engine.config().report_lead_limit);
    let leads = state
        .engine
        .top_lead_views(limit, params.group.as_deref(), state.now());

    Json(serde_json::json!({
        "group": params.group,
        "count": leads.len(),
        "leads": leads,
    }))
}

/// GET /api/words — most frequent relevant words over the last day.
async fn get_words(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScopeQuery>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(DEFAULT_WORD_LIMIT);
    let words = state
        .engine
        .get_top_words(params.group.as_deref(), state.now(), limit);

    Json(serde_json::json!({
        "group": params.group,
        "words": words,
    }))
}
