// SPDX-License-Identifier: GPL-3.0-or-later
//! Orchestrator-level error taxonomy (§7). `NotFound` becomes an HTTP 404 at
//! the handler layer; everything else becomes a 500 carrying the message,
//! matching `lidarr-api::handlers::artists::ErrorResponse`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<discograph_musicbrainz::AdapterError> for OrchestratorError {
    fn from(err: discograph_musicbrainz::AdapterError) -> Self {
        match err {
            discograph_musicbrainz::AdapterError::NotFound(_) => Self::NotFound,
            other => Self::Internal(anyhow::anyhow!(other)),
        }
    }
}
