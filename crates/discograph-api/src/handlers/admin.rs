// SPDX-License-Identifier: GPL-3.0-or-later
//! The internal admin surface (§6): job-queue and config visibility, manual
//! refresh triggers, and image maintenance for the UI. Every route here sits
//! behind `middleware::auth` in `lib.rs`'s router nesting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::Engine;
use discograph_application::AppState;
use discograph_domain::{ArtistId, EntityType, Image, ImageId, ImageProvider, ReleaseGroupId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{internal_error_response, orchestrator_error_response, ErrorResponse};

#[derive(Debug, Serialize, ToSchema)]
pub struct JobStatsResponse {
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub failed: i64,
}

impl From<discograph_store::queue::JobQueueStats> for JobStatsResponse {
    fn from(stats: discograph_store::queue::JobQueueStats) -> Self {
        Self {
            pending: stats.pending,
            processing: stats.processing,
            completed: stats.completed,
            failed: stats.failed,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses((status = 200, description = "Current job-queue counts", body = JobStatsResponse)),
    tag = "admin"
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.job_queue.stats().await {
        Ok(stats) => Ok(Json(JobStatsResponse::from(stats))),
        Err(err) => Err(internal_error_response(err)),
    }
}

#[utoipa::path(
    get,
    path = "/api/jobs/stats",
    responses((status = 200, description = "Current job-queue counts", body = JobStatsResponse)),
    tag = "admin"
)]
pub async fn jobs_stats(state: State<AppState>) -> impl IntoResponse {
    stats(state).await
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RecentJobsQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    50
}

#[utoipa::path(
    get,
    path = "/api/jobs/recent",
    params(RecentJobsQuery),
    responses((status = 200, description = "Most recently created jobs, newest first")),
    tag = "admin"
)]
pub async fn recent_jobs(State(state): State<AppState>, Query(params): Query<RecentJobsQuery>) -> impl IntoResponse {
    match state.job_queue.recent(params.limit).await {
        Ok(jobs) => Ok(Json(jobs)),
        Err(err) => Err(internal_error_response(err)),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearJobsResponse {
    pub deleted: u64,
}

#[utoipa::path(
    post,
    path = "/api/jobs/clear",
    responses((status = 200, description = "Completed/failed jobs purged", body = ClearJobsResponse)),
    tag = "admin"
)]
pub async fn clear_jobs(State(state): State<AppState>) -> impl IntoResponse {
    match state.job_queue.clear_completed().await {
        Ok(deleted) => Ok(Json(ClearJobsResponse { deleted })),
        Err(err) => Err(internal_error_response(err)),
    }
}

/// Redacted view of the running configuration — provider API keys and the
/// admin secret itself are never echoed back.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    pub server_host: String,
    pub server_port: u16,
    pub server_url: Option<String>,
    pub cache_enabled: bool,
    pub cache_ttl_seconds: u64,
    pub artist_ttl_days: i64,
    pub bulk_refresh_days: i64,
    pub album_types: Vec<String>,
    pub release_statuses: Vec<String>,
    pub images_dir: String,
    pub providers: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/config",
    responses((status = 200, description = "Redacted view of the running configuration", body = ConfigResponse)),
    tag = "admin"
)]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let config = &state.config;
    Json(ConfigResponse {
        server_host: config.server.host.clone(),
        server_port: config.server.port,
        server_url: config.server.server_url.clone(),
        cache_enabled: config.cache.enabled,
        cache_ttl_seconds: config.cache.ttl_seconds,
        artist_ttl_days: config.refresh.artist_ttl_days,
        bulk_refresh_days: config.refresh.bulk_refresh_days,
        album_types: config.metadata.fetch_types.album_types.clone(),
        release_statuses: config.metadata.fetch_types.release_statuses.clone(),
        images_dir: config.storage.images_dir.clone(),
        providers: config.providers.keys().cloned().collect(),
    })
}

/// Configuration is loaded once at startup from defaults, an optional YAML
/// file, and the environment (§4.8); there is no in-memory slot to write a
/// runtime patch into, so a `POST` here reports that explicitly rather than
/// silently no-op'ing or partially applying a change that won't survive a
/// restart.
#[utoipa::path(
    post,
    path = "/api/config",
    responses((status = 501, description = "Configuration is load-once; restart with an updated file or environment instead")),
    tag = "admin"
)]
pub async fn update_config() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ErrorResponse {
            error: "configuration is loaded once at startup; edit the config file or environment and restart".to_string(),
        }),
    )
}

#[utoipa::path(post, path = "/api/refresh/all", responses((status = 200, description = "Bulk refresh sweep enqueued")), tag = "admin")]
pub async fn refresh_all(State(state): State<AppState>) -> impl IntoResponse {
    match discograph_application::refresh_all(&state).await {
        Ok(sweep) => Ok(Json(serde_json::json!({
            "id": sweep.id.0,
            "status": "completed",
            "artists_refreshed": sweep.artists_refreshed,
        }))),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}

#[utoipa::path(
    post,
    path = "/api/ui/fetch-artist/{id}",
    params(("id" = String, Path)),
    responses((status = 200, description = "Artist fetched/refreshed on demand")),
    tag = "admin"
)]
pub async fn fetch_artist(State(state): State<AppState>, Path(id): Path<ArtistId>) -> impl IntoResponse {
    debug!(target: "api", artist_id = %id, "admin-triggered artist fetch");
    match discograph_application::ensure_artist(&state, id).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}

#[utoipa::path(
    post,
    path = "/api/ui/fetch-album/{id}",
    params(("id" = String, Path)),
    responses((status = 200, description = "Album fetched/refreshed on demand")),
    tag = "admin"
)]
pub async fn fetch_album(State(state): State<AppState>, Path(id): Path<ReleaseGroupId>) -> impl IntoResponse {
    debug!(target: "api", release_group_id = %id, "admin-triggered album fetch");
    match discograph_application::ensure_album(&state, id).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err(orchestrator_error_response(err)),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadImageRequest {
    pub entity_type: String,
    pub entity_id: uuid::Uuid,
    pub cover_type: String,
    pub content_type: String,
    pub data_base64: String,
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// A user-supplied image skips the artwork-binary pool entirely: it is
/// already cached the moment it lands on disk, and is tagged
/// `provider = UserUpload`/`user_uploaded = true` so a later refresh never
/// treats it as stale upstream artwork to replace (§3's image model).
#[utoipa::path(
    post,
    path = "/api/images",
    request_body = UploadImageRequest,
    responses(
        (status = 201, description = "Image stored"),
        (status = 400, description = "Unsupported content type or malformed payload", body = ErrorResponse)
    ),
    tag = "admin"
)]
pub async fn upload_image(State(state): State<AppState>, Json(request): Json<UploadImageRequest>) -> impl IntoResponse {
    let entity_type: EntityType = match request.entity_type.parse() {
        Ok(t) => t,
        Err(_) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: format!("unknown entity_type: {}", request.entity_type) }),
            ))
        }
    };
    let Some(extension) = extension_for_content_type(&request.content_type) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: format!("unsupported content type: {}", request.content_type) }),
        ));
    };
    let bytes = match base64::engine::general_purpose::STANDARD.decode(&request.data_base64) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: format!("invalid base64 payload: {err}") }),
            ))
        }
    };

    let relative_path = std::path::Path::new(entity_type.as_str())
        .join(request.entity_id.to_string())
        .join(format!("{}.{extension}", request.cover_type));
    let full_path = std::path::Path::new(&state.config.storage.images_dir).join(&relative_path);

    if let Some(parent) = full_path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            return Err(internal_error_response(anyhow::anyhow!(err)));
        }
    }
    if let Err(err) = tokio::fs::write(&full_path, &bytes).await {
        return Err(internal_error_response(anyhow::anyhow!(err)));
    }

    let image = Image {
        id: ImageId::new(),
        entity_type,
        entity_id: request.entity_id,
        cover_type: request.cover_type.parse().unwrap_or(discograph_domain::CoverType::Poster),
        provider: ImageProvider::UserUpload,
        url: String::new(),
        local_path: Some(relative_path.to_string_lossy().into_owned()),
        cached: true,
        cache_failed: false,
        cache_failed_reason: None,
        user_uploaded: true,
        last_verified_at: Some(chrono::Utc::now()),
        cached_at: Some(chrono::Utc::now()),
    };

    match state.image_store.upsert_image_url(&image).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(err) => Err(internal_error_response(err)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    params(("id" = String, Path)),
    responses((status = 204, description = "Image removed")),
    tag = "admin"
)]
pub async fn delete_image(State(state): State<AppState>, Path(id): Path<ImageId>) -> impl IntoResponse {
    match state.image_store.delete_image(id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(err) => {
            warn!(target: "api", image_id = %id, error = %err, "failed to delete image row");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// This service logs exclusively to stdout through `tracing`
/// (`discograph-cli`'s `init_tracing`, matching `lidarr-cli`'s), so there is
/// no on-disk log directory to enumerate; the admin UI's log panel is meant
/// to tail the process's own output instead.
#[utoipa::path(get, path = "/api/logs", responses((status = 200, description = "Always empty: logs are stdout-only")), tag = "admin")]
pub async fn list_logs() -> impl IntoResponse {
    Json(Vec::<String>::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_image_content_types_map_to_an_extension() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/jpg"), Some("jpg"));
        assert_eq!(extension_for_content_type("image/png"), Some("png"));
        assert_eq!(extension_for_content_type("image/webp"), Some("webp"));
        assert_eq!(extension_for_content_type("image/gif"), Some("gif"));
    }

    #[test]
    fn an_unrecognized_content_type_is_rejected() {
        assert_eq!(extension_for_content_type("application/pdf"), None);
        assert_eq!(extension_for_content_type(""), None);
    }
}
