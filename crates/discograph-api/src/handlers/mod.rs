// SPDX-License-Identifier: GPL-3.0-or-later
pub mod admin;
pub mod album;
pub mod artists;
pub mod search;

use axum::{http::StatusCode, Json};
use discograph_application::OrchestratorError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps the orchestrator's error taxonomy onto the HTTP surface per the
/// propagation policy: `NotFound` is a 404, everything else a 500 carrying
/// the message as `error` (§7).
pub fn orchestrator_error_response(err: OrchestratorError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        OrchestratorError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse { error: "not found".to_string() }),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse { error: other.to_string() }),
        ),
    }
}

pub fn internal_error_response(err: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: err.to_string() }),
    )
}
