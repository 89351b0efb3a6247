// SPDX-License-Identifier: GPL-3.0-or-later
//! Typed store operations (§4.2). All writes are idempotent upserts keyed by
//! MBID; reads never mutate.

use anyhow::Result;
use discograph_domain::{
    Artist, ArtistId, ArtistReleaseGroup, BulkRefresh, BulkRefreshId, Image, ImageId, Link,
    Recording, RecordingId, Release, ReleaseGroup, ReleaseGroupId, ReleaseId, Track,
};

#[async_trait::async_trait]
pub trait ArtistStore: Send + Sync {
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>>;

    /// Batched form of `get_artist`, used by the response formatter so that
    /// embedding N credited artists on an album costs one query rather than
    /// N (§4.3).
    async fn get_artists(&self, ids: &[ArtistId]) -> Result<Vec<Artist>>;

    /// `is_full_data` guards the `overview` column: a sparse search-listing
    /// result must never blank out a rich detail-fetch result (§4.2).
    async fn upsert_artist(&self, artist: &Artist, is_full_data: bool) -> Result<()>;

    /// True if `fetch_complete` is false or `last_updated_at` is older than
    /// the configured TTL.
    async fn artist_needs_refresh(&self, artist: &Artist, ttl_days: i64) -> bool;

    async fn touch_artist_access(&self, id: ArtistId) -> Result<()>;

    async fn list_artist_release_groups(&self, artist_id: ArtistId) -> Result<Vec<ArtistReleaseGroup>>;

    /// Every known artist id, for the admin "refresh all" sweep (§6).
    async fn list_artist_ids(&self) -> Result<Vec<ArtistId>>;

    async fn link_artist_to_release_group(
        &self,
        artist_id: ArtistId,
        release_group_id: ReleaseGroupId,
        position: i32,
    ) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ReleaseGroupStore: Send + Sync {
    async fn get_release_group(&self, id: ReleaseGroupId) -> Result<Option<ReleaseGroup>>;
    async fn upsert_release_group(&self, release_group: &ReleaseGroup) -> Result<()>;
    async fn touch_release_group_access(&self, id: ReleaseGroupId) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ReleaseStore: Send + Sync {
    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>>;
    async fn list_releases_by_release_group(&self, release_group_id: ReleaseGroupId) -> Result<Vec<Release>>;
    async fn upsert_release(&self, release: &Release) -> Result<()>;
    async fn upsert_recording(&self, recording: &Recording) -> Result<()>;
    async fn upsert_track(&self, track: &Track) -> Result<()>;
    async fn get_recording(&self, id: RecordingId) -> Result<Option<Recording>>;
}

#[async_trait::async_trait]
pub trait LinkStore: Send + Sync {
    async fn upsert_link(&self, link: &Link) -> Result<()>;
    async fn list_links(&self, entity_type: discograph_domain::EntityType, entity_id: uuid::Uuid) -> Result<Vec<Link>>;

    /// Batched form of `list_links` over several ids of the same entity type
    /// (§4.3's three-query batching rule).
    async fn list_links_for_entities(
        &self,
        entity_type: discograph_domain::EntityType,
        entity_ids: &[uuid::Uuid],
    ) -> Result<Vec<Link>>;
}

#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    async fn upsert_image_url(&self, image: &Image) -> Result<()>;
    async fn mark_image_cached(&self, id: ImageId, local_path: &str) -> Result<()>;
    async fn mark_image_failed(&self, id: ImageId, reason: &str) -> Result<()>;
    async fn list_images(&self, entity_type: discograph_domain::EntityType, entity_id: uuid::Uuid) -> Result<Vec<Image>>;

    /// Batched form of `list_images` over several ids of the same entity type
    /// (§4.3's three-query batching rule).
    async fn list_images_for_entities(
        &self,
        entity_type: discograph_domain::EntityType,
        entity_ids: &[uuid::Uuid],
    ) -> Result<Vec<Image>>;

    /// One non-cached, non-failed row, artist rows before release-group rows,
    /// oldest `last_verified_at` first (§4.5 artwork-binary pool).
    async fn next_pending_download(&self) -> Result<Option<Image>>;

    /// Removes the row only; the caller is responsible for the on-disk file
    /// (the admin image-delete action, §6).
    async fn delete_image(&self, id: ImageId) -> Result<()>;
}

/// Tracks a single admin-triggered "refresh everything" sweep (§3's
/// `BulkRefresh` entity), so its progress and outcome survive the request
/// that started it.
#[async_trait::async_trait]
pub trait BulkRefreshStore: Send + Sync {
    async fn start_bulk_refresh(&self) -> Result<BulkRefresh>;
    async fn complete_bulk_refresh(&self, id: BulkRefreshId, artists_refreshed: i32) -> Result<()>;
    async fn fail_bulk_refresh(&self, id: BulkRefreshId) -> Result<()>;
}
