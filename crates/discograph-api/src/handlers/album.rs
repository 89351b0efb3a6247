// SPDX-License-Identifier: GPL-3.0-or-later
//! `GET /album/{id}` (§6): the consumer-facing album endpoint, embedding
//! credited artists and releases. No auth, same trust boundary as
//! `handlers::artists`.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use discograph_application::{ensure_album, AppState};
use discograph_domain::ReleaseGroupId;
use tracing::debug;

use super::orchestrator_error_response;

#[utoipa::path(
    get,
    path = "/album/{id}",
    params(
        ("id" = String, Path, description = "MusicBrainz release-group MBID")
    ),
    responses(
        (status = 200, description = "Album, fetched and cached on demand"),
        (status = 404, description = "No such release group upstream"),
        (status = 500, description = "Upstream or storage failure")
    ),
    tag = "consumer"
)]
pub async fn get_album(State(state): State<AppState>, Path(id): Path<ReleaseGroupId>) -> impl IntoResponse {
    debug!(target: "api", release_group_id = %id, "GET /album/{{id}}");
    match ensure_album(&state, id).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}
