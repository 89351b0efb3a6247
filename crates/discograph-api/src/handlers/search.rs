// SPDX-License-Identifier: GPL-3.0-or-later
//! `GET /search?query=&limit=N` (§6). No auth, same trust boundary as the
//! other consumer endpoints; results are never persisted.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use discograph_application::AppState;
use serde::Deserialize;
use tracing::debug;

use super::orchestrator_error_response;

fn default_limit() -> usize {
    25
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Flat list of artist/album search hits"),
        (status = 500, description = "Upstream search failure")
    ),
    tag = "consumer"
)]
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> impl IntoResponse {
    debug!(target: "api", query = %params.query, limit = params.limit, "GET /search");
    match discograph_application::search(&state, &params.query, params.limit).await {
        Ok(results) => Ok(Json(results)),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}
