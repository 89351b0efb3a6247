// SPDX-License-Identifier: GPL-3.0-or-later
//! `JobProcessor`/`ImageProcessor` implementations (§4.5) that hand a
//! claimed job or pending image row off to the matching orchestrator
//! function. Each processor owns only the `JobMetadata`/`Job` dispatch; the
//! actual work is the same `ensure_*`/`refresh_*`/`fetch_*` function the
//! synchronous request path would call, so there is exactly one place each
//! kind of upstream call is made (§9's cyclic-dependency note applies here
//! too: the pool depends on the orchestrator, never the reverse).

use std::sync::Arc;

use async_trait::async_trait;
use discograph_domain::{Image, Job, JobMetadata};
use discograph_metadata::ImageDownloader;
use discograph_scheduler::job::{ImageProcessor, JobProcessor};
use tracing::warn;

use crate::orchestrator;
use crate::AppState;

/// Serves the `canonical` pool: `FetchArtist`, `FetchArtistAlbums`,
/// `FetchRelease`, `FetchAlbumFull`, `ArtistFull`.
pub struct CanonicalProcessor {
    state: AppState,
}

impl CanonicalProcessor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl JobProcessor for CanonicalProcessor {
    async fn process(&self, job: Job) -> anyhow::Result<()> {
        match job.metadata {
            JobMetadata::FetchArtist { artist_id } => {
                orchestrator::ensure_artist(&self.state, artist_id).await?;
            }
            JobMetadata::FetchArtistAlbums { artist_id } => {
                orchestrator::refresh_artist_albums(&self.state, artist_id).await?;
            }
            JobMetadata::FetchAlbumFull { release_group_id } => {
                orchestrator::refresh_album_full(&self.state, release_group_id).await?;
            }
            JobMetadata::FetchRelease { release_id, release_group_id } => {
                orchestrator::fetch_release(&self.state, release_id, release_group_id).await?;
            }
            JobMetadata::ArtistFull { artist_id } => {
                orchestrator::refresh_artist_full(&self.state, artist_id).await?;
            }
            other => warn!(target: "application", job_type = ?other.job_type(), "canonical processor received an out-of-pool job"),
        }
        Ok(())
    }
}

/// Serves the `text` pool: `FetchArtistText`, `FetchAlbumText`.
pub struct TextProcessor {
    state: AppState,
}

impl TextProcessor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl JobProcessor for TextProcessor {
    async fn process(&self, job: Job) -> anyhow::Result<()> {
        match job.metadata {
            JobMetadata::FetchArtistText { artist_id } => {
                orchestrator::fetch_artist_text(&self.state, artist_id).await?;
            }
            JobMetadata::FetchAlbumText { release_group_id } => {
                orchestrator::fetch_album_text(&self.state, release_group_id).await?;
            }
            other => warn!(target: "application", job_type = ?other.job_type(), "text processor received an out-of-pool job"),
        }
        Ok(())
    }
}

/// Serves the `artwork-url` pool: `FetchArtistImages`, `FetchAlbumImages`.
pub struct ArtworkUrlProcessor {
    state: AppState,
}

impl ArtworkUrlProcessor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl JobProcessor for ArtworkUrlProcessor {
    async fn process(&self, job: Job) -> anyhow::Result<()> {
        match job.metadata {
            JobMetadata::FetchArtistImages { artist_id } => {
                orchestrator::fetch_artist_images(&self.state, artist_id).await?;
            }
            JobMetadata::FetchAlbumImages { release_group_id } => {
                orchestrator::fetch_album_images(&self.state, release_group_id).await?;
            }
            other => warn!(target: "application", job_type = ?other.job_type(), "artwork-url processor received an out-of-pool job"),
        }
        Ok(())
    }
}

/// Serves the artwork-binary pool (§4.5): downloads the bytes behind one
/// pending `Image` row and records the result. The only writer of
/// `cached`/`local_path`/`cache_failed*` (§9).
pub struct ArtworkBinaryProcessor {
    image_store: Arc<dyn discograph_store::repositories::ImageStore>,
    downloader: ImageDownloader,
}

impl ArtworkBinaryProcessor {
    pub fn new(
        image_store: Arc<dyn discograph_store::repositories::ImageStore>,
        images_dir: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self {
            image_store,
            downloader: ImageDownloader::new(images_dir),
        }
    }
}

#[async_trait]
impl ImageProcessor for ArtworkBinaryProcessor {
    async fn download(&self, image: Image) -> anyhow::Result<()> {
        match self.downloader.download(&image).await {
            Ok(local_path) => {
                self.image_store.mark_image_cached(image.id, &local_path).await?;
            }
            Err(err) if err.is_retryable() => {
                warn!(target: "application", image_id = %image.id, error = %err, "transient artwork download failure, leaving pending for retry");
            }
            Err(err) => {
                self.image_store.mark_image_failed(image.id, &err.to_string()).await?;
            }
        }
        Ok(())
    }
}
