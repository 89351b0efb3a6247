// SPDX-License-Identifier: GPL-3.0-or-later
//! `GET /artist/{id}` (§6): the one consumer-facing artist endpoint. No
//! auth — the upstream consumer authenticates by network placement, the
//! same trust boundary `chorrosion-api`'s unauthenticated routes assume.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use discograph_application::{ensure_artist, AppState};
use discograph_domain::ArtistId;
use tracing::debug;

use super::orchestrator_error_response;

/// The orchestrator's `ArtistResponse` carries the wire shape directly (§6)
/// and lives in a crate that stays free of web-framework dependencies, so
/// it isn't registered as an OpenAPI schema here — only the status codes are.
#[utoipa::path(
    get,
    path = "/artist/{id}",
    params(
        ("id" = String, Path, description = "MusicBrainz artist MBID")
    ),
    responses(
        (status = 200, description = "Artist, fetched and cached on demand"),
        (status = 404, description = "No such artist upstream"),
        (status = 500, description = "Upstream or storage failure")
    ),
    tag = "consumer"
)]
pub async fn get_artist(State(state): State<AppState>, Path(id): Path<ArtistId>) -> impl IntoResponse {
    debug!(target: "api", artist_id = %id, "GET /artist/{{id}}");
    match ensure_artist(&state, id).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}
