pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Json, Router,
};
use discograph_application::AppState;
use handlers::{
    admin::{
        __path_clear_jobs, __path_delete_image, __path_fetch_album, __path_fetch_artist,
        __path_get_config, __path_jobs_stats, __path_list_logs, __path_recent_jobs,
        __path_refresh_all, __path_stats, __path_update_config, __path_upload_image,
        clear_jobs, delete_image, fetch_album, fetch_artist, get_config, jobs_stats, list_logs,
        recent_jobs, refresh_all, stats, update_config, upload_image, ClearJobsResponse,
        ConfigResponse, JobStatsResponse, UploadImageRequest,
    },
    album::{get_album, __path_get_album},
    artists::{get_artist, __path_get_artist},
    search::{search, __path_search},
    ErrorResponse,
};
use middleware::auth::auth_middleware;
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize, utoipa::ToSchema)]
struct HealthResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Grounded in `chorrosion-api`'s existing health endpoint (§6).
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
#[allow(dead_code)]
async fn health() -> Json<HealthResponse> {
    health_handler().await
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_artist,
        get_album,
        search,
        stats,
        jobs_stats,
        recent_jobs,
        clear_jobs,
        get_config,
        update_config,
        refresh_all,
        fetch_artist,
        fetch_album,
        upload_image,
        delete_image,
        list_logs,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            JobStatsResponse,
            ClearJobsResponse,
            ConfigResponse,
            UploadImageRequest,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "consumer", description = "Consumer-facing metadata endpoints, unauthenticated"),
        (name = "admin", description = "Admin UI endpoints, requires X-Api-Key or Authorization: Bearer")
    ),
    info(
        title = "Discograph API",
        version = "0.1.0",
        description = "Read-through metadata cache and proxy for a music-library application",
    )
)]
struct ApiDoc;

/// Builds the consumer surface (no auth, §6), the admin surface (behind
/// `middleware::auth`), the local image-serving static route, and the
/// Swagger UI, the way `chorrosion-api::router` assembles its own routes.
pub fn router(state: AppState) -> Router {
    info!(target: "api", "building router");

    let consumer = Router::new()
        .route("/artist/:id", get(get_artist))
        .route("/album/:id", get(get_album))
        .route("/search", get(search));

    let admin = Router::new()
        .route("/api/stats", get(stats))
        .route("/api/config", get(get_config).post(update_config))
        .route("/api/jobs/stats", get(jobs_stats))
        .route("/api/jobs/recent", get(recent_jobs))
        .route("/api/jobs/clear", post(clear_jobs))
        .route("/api/refresh/all", post(refresh_all))
        .route("/api/ui/fetch-artist/:id", post(fetch_artist))
        .route("/api/ui/fetch-album/:id", post(fetch_album))
        .route("/api/images", post(upload_image))
        .route("/api/images/:id", delete(delete_image))
        .route("/api/logs", get(list_logs))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    let images_dir = state.config.storage.images_dir.clone();
    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/health", get(health_handler))
        .merge(consumer)
        .merge(admin)
        .nest_service("/images", ServeDir::new(images_dir))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", openapi))
        .with_state(state)
}
