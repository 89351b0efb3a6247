// SPDX-License-Identifier: GPL-3.0-or-later
//! Wires the store, the canonical adapter, and the registered text/artwork
//! adapters into the two orchestrator entry points (§4.6). Construction
//! happens once at startup and is passed by value, never read from a
//! global — see §9's note on replacing module-level singletons with an
//! explicitly-constructed application struct.

use std::sync::Arc;

use discograph_config::AppConfig;
use discograph_metadata::{ArtworkAdapter, TextAdapter};
use discograph_musicbrainz::CanonicalAdapter;
use discograph_store::queue::JobQueue;
use discograph_store::repositories::{
    ArtistStore, BulkRefreshStore, ImageStore, LinkStore, ReleaseGroupStore, ReleaseStore,
};
use tracing::info;

pub mod error;
pub mod filters;
pub mod formatter;
pub mod orchestrator;
pub mod processors;

pub use error::{OrchestratorError, Result};
pub use formatter::{AlbumResponse, ArtistResponse, SearchResult};
pub use orchestrator::{ensure_album, ensure_artist, refresh_all, search};
pub use processors::{ArtworkBinaryProcessor, ArtworkUrlProcessor, CanonicalProcessor, TextProcessor};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub artist_store: Arc<dyn ArtistStore>,
    pub release_group_store: Arc<dyn ReleaseGroupStore>,
    pub release_store: Arc<dyn ReleaseStore>,
    pub link_store: Arc<dyn LinkStore>,
    pub image_store: Arc<dyn ImageStore>,
    pub job_queue: Arc<dyn JobQueue>,
    pub bulk_refresh_store: Arc<dyn BulkRefreshStore>,
    pub canonical: Arc<dyn CanonicalAdapter>,
    pub text_adapters: Vec<Arc<dyn TextAdapter>>,
    pub artwork_adapters: Vec<Arc<dyn ArtworkAdapter>>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: AppConfig,
        artist_store: Arc<dyn ArtistStore>,
        release_group_store: Arc<dyn ReleaseGroupStore>,
        release_store: Arc<dyn ReleaseStore>,
        link_store: Arc<dyn LinkStore>,
        image_store: Arc<dyn ImageStore>,
        job_queue: Arc<dyn JobQueue>,
        bulk_refresh_store: Arc<dyn BulkRefreshStore>,
        canonical: Arc<dyn CanonicalAdapter>,
        text_adapters: Vec<Arc<dyn TextAdapter>>,
        artwork_adapters: Vec<Arc<dyn ArtworkAdapter>>,
    ) -> Self {
        Self {
            config,
            artist_store,
            release_group_store,
            release_store,
            link_store,
            image_store,
            job_queue,
            bulk_refresh_store,
            canonical,
            text_adapters,
            artwork_adapters,
        }
    }

    pub fn on_start(&self) {
        info!(target: "application", "application state initialized");
    }
}
