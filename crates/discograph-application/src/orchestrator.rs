// SPDX-License-Identifier: GPL-3.0-or-later
//! The two synchronous entry points that may cause external traffic (§4.6).
//!
//! Each function separates the pure *decide* step (§4.6, §9: which jobs to
//! queue, which releases survive the configured filters) from the *do* step
//! (adapter calls, store writes, enqueues) — the decide half lives in
//! `filters` and the free functions below prefixed `decide_`; everything
//! else here is orchestration.

use std::collections::{HashMap, HashSet};

use discograph_domain::{
    Artist, ArtistId, JobMetadata, Recording, RecordingId, Release, ReleaseGroup, ReleaseGroupId,
};
use discograph_musicbrainz::recordings_from_release;
use tracing::{debug, warn};

use crate::error::{OrchestratorError, Result};
use crate::filters::{parse_album_types, parse_release_statuses, release_group_passes, release_status_passes};
use crate::formatter::{self, AlbumResponse, ArtistResponse, ImageUrlBase};
use crate::AppState;

const ALBUM_PAGE_SIZE: u32 = 100;
const RELEASE_PAGE_SIZE: u32 = 100;

fn image_url_base(state: &AppState) -> ImageUrlBase {
    ImageUrlBase {
        server_url: state.config.server.server_url.clone(),
        host: state.config.server.host.clone(),
        port: state.config.server.port,
    }
}

/// Persists a release and the normalized `Recording`/`Track` rows embedded
/// in its media blob, so the relational invariant (every Track references
/// an existing Release and Recording) holds even though the hot-path read
/// serves the denormalized blob on `Release` itself.
async fn persist_release(state: &AppState, release: &Release) -> anyhow::Result<()> {
    for recording in recordings_from_release(release) {
        state.release_store.upsert_recording(&recording).await?;
    }
    state.release_store.upsert_release(release).await?;
    for medium in &release.media {
        for track in &medium.tracks {
            state.release_store.upsert_track(track).await?;
        }
    }
    Ok(())
}

/// Steps 1-2 of `ensureArtist`: load-or-fetch, then TTL-gated refresh. Used
/// standalone by `ensure_album`'s cascade so fetching a missing credited
/// artist never re-enters album enumeration (§4.6).
async fn ensure_artist_record(state: &AppState, artist_id: ArtistId) -> Result<Artist> {
    match state.artist_store.get_artist(artist_id).await? {
        None => {
            debug!(target: "application", %artist_id, "artist missing, fetching from canonical provider");
            let fetched = state.canonical.get_artist(artist_id).await?;
            state.artist_store.upsert_artist(&fetched, true).await?;
            Ok(fetched)
        }
        Some(stored) => {
            if state
                .artist_store
                .artist_needs_refresh(&stored, state.config.refresh.artist_ttl_days)
                .await
            {
                debug!(target: "application", %artist_id, "artist stale, refreshing");
                let refreshed = state.canonical.get_artist(artist_id).await?;
                state.artist_store.upsert_artist(&refreshed, true).await?;
                refresh_albums_delta(state, artist_id).await?;
                Ok(refreshed)
            } else {
                Ok(stored)
            }
        }
    }
}

/// Fetches the overview once per call if missing, trying each registered
/// text adapter in order. Best-effort: a failure here never fails the
/// request, since `fetch_artist_text` is also queued as a background job
/// (§4.6 step 5, §9's open question on the orchestrator/background race).
async fn fill_overview_once(state: &AppState, artist: &mut Artist) {
    if artist.overview.is_some() {
        return;
    }
    for adapter in &state.text_adapters {
        match adapter.get_artist_text(&artist.name).await {
            Ok(Some(text)) => {
                artist.overview = Some(text);
                if let Err(err) = state.artist_store.upsert_artist(artist, true).await {
                    warn!(target: "application", artist_id = %artist.id, error = %err, "failed to persist fetched overview");
                }
                return;
            }
            Ok(None) => continue,
            Err(err) => {
                warn!(target: "application", artist_id = %artist.id, provider = adapter.provider_name(), error = %err, "text adapter failed");
                continue;
            }
        }
    }
}

/// Pure decide step: which upstream release-group ids are new relative to
/// what's already linked to this artist.
fn decide_new_release_groups(upstream_ids: &[ReleaseGroupId], stored_ids: &HashSet<ReleaseGroupId>) -> Vec<ReleaseGroupId> {
    upstream_ids
        .iter()
        .copied()
        .filter(|id| !stored_ids.contains(id))
        .collect()
}

/// Delta refresh (§4.6): on TTL expiry, fetch only the release groups that
/// appeared upstream since the last fetch, never the whole catalog again.
async fn refresh_albums_delta(state: &AppState, artist_id: ArtistId) -> Result<()> {
    let stored: HashSet<ReleaseGroupId> = state
        .artist_store
        .list_artist_release_groups(artist_id)
        .await?
        .into_iter()
        .map(|link| link.release_group_id)
        .collect();

    let upstream = fetch_all_artist_albums(state, artist_id).await?;
    let upstream_ids: Vec<ReleaseGroupId> = upstream.iter().map(|rg| rg.id).collect();
    let new_ids = decide_new_release_groups(&upstream_ids, &stored);

    if new_ids.is_empty() {
        return Ok(());
    }

    let album_types = parse_album_types(&state.config.metadata.fetch_types.album_types);
    let release_statuses = parse_release_statuses(&state.config.metadata.fetch_types.release_statuses);
    let by_id: HashMap<ReleaseGroupId, ReleaseGroup> = upstream.into_iter().map(|rg| (rg.id, rg)).collect();

    for (position, id) in new_ids.into_iter().enumerate() {
        if let Some(release_group) = by_id.get(&id) {
            ingest_release_group(state, artist_id, position as i32, release_group, &album_types, &release_statuses).await?;
        }
    }
    Ok(())
}

async fn fetch_all_artist_albums(state: &AppState, artist_id: ArtistId) -> Result<Vec<ReleaseGroup>> {
    let mut albums = Vec::new();
    let mut offset = 0u32;
    loop {
        let page = state.canonical.get_artist_albums(artist_id, offset, ALBUM_PAGE_SIZE).await?;
        let has_more = page.has_more();
        let received = page.items.len() as u32;
        offset += received;
        albums.extend(page.items);
        if !has_more || received == 0 {
            break;
        }
    }
    Ok(albums)
}

/// Upserts a release group (linking it to the artist), then — if it passes
/// the configured album-type filter — enumerates and upserts its surviving
/// releases. A release group that fails the filter is still recorded (the
/// consumer may reference it directly later) but its releases are skipped.
async fn ingest_release_group(
    state: &AppState,
    artist_id: ArtistId,
    position: i32,
    release_group: &ReleaseGroup,
    album_types: &[discograph_domain::AlbumType],
    release_statuses: &[discograph_domain::ReleaseStatus],
) -> Result<()> {
    state.release_group_store.upsert_release_group(release_group).await?;
    state
        .artist_store
        .link_artist_to_release_group(artist_id, release_group.id, position)
        .await?;

    if !release_group_passes(release_group, album_types) {
        debug!(target: "application", release_group_id = %release_group.id, "release group rejected by album-type filter");
        return Ok(());
    }

    ingest_releases(state, release_group.id, release_statuses).await
}

async fn ingest_releases(
    state: &AppState,
    release_group_id: ReleaseGroupId,
    release_statuses: &[discograph_domain::ReleaseStatus],
) -> Result<()> {
    let mut offset = 0u32;
    loop {
        let page = state
            .canonical
            .get_releases_by_release_group(release_group_id, offset, RELEASE_PAGE_SIZE)
            .await?;
        let has_more = page.has_more();
        let received = page.items.len() as u32;
        offset += received;

        for summary in &page.items {
            if !release_status_passes(summary.status, release_statuses) {
                continue;
            }
            // `get_release` is keyed by release id alone and doesn't know its
            // parent release group; carry over the id we already have rather
            // than trust the placeholder it fills in.
            let mut release = state.canonical.get_release(summary.id).await?;
            release.release_group_id = release_group_id;
            persist_release(state, &release).await?;
        }

        if !has_more || received == 0 {
            break;
        }
    }
    Ok(())
}

/// Background counterpart of the album-enumeration half of `ensureArtist`,
/// used by the `fetch_artist_albums` job (§4.5 canonical pool). Unlike the
/// synchronous path it always re-enumerates rather than skipping when links
/// already exist, so a background sweep can pick up anything the delta
/// refresh missed.
pub async fn refresh_artist_albums(state: &AppState, artist_id: ArtistId) -> Result<()> {
    ensure_artist_record(state, artist_id).await?;
    let album_types = parse_album_types(&state.config.metadata.fetch_types.album_types);
    let release_statuses = parse_release_statuses(&state.config.metadata.fetch_types.release_statuses);
    let upstream = fetch_all_artist_albums(state, artist_id).await?;
    for (position, release_group) in upstream.iter().enumerate() {
        ingest_release_group(state, artist_id, position as i32, release_group, &album_types, &release_statuses).await?;
    }
    Ok(())
}

/// Background counterpart of `ensureAlbum`'s fetch step, used by the
/// `fetch_album_full` job (§4.5 canonical pool). Always refetches, ignoring
/// TTL, so it never just re-enqueues itself indefinitely the way reusing
/// `ensure_album` here would.
pub async fn refresh_album_full(state: &AppState, release_group_id: ReleaseGroupId) -> Result<()> {
    fetch_and_link_release_group(state, release_group_id).await?;
    Ok(())
}

/// `fetch_release` job body (§4.4 canonical pool): fetches a single release
/// with its tracks and persists it, re-parenting it to the release group the
/// job was enqueued against rather than whatever the upstream record claims.
pub async fn fetch_release(
    state: &AppState,
    release_id: discograph_domain::ReleaseId,
    release_group_id: ReleaseGroupId,
) -> Result<()> {
    let mut release = state.canonical.get_release(release_id).await?;
    release.release_group_id = release_group_id;
    persist_release(state, &release).await?;
    Ok(())
}

/// `artist_full` job body (§4.4): the legacy composite job, equivalent to
/// running the artist record refresh and the full album enumeration in one
/// claim rather than two separate canonical-pool jobs.
pub async fn refresh_artist_full(state: &AppState, artist_id: ArtistId) -> Result<()> {
    refresh_artist_albums(state, artist_id).await
}

/// `fetch_artist_text` job body (§4.5 text pool): tries each registered text
/// adapter in turn and persists the first hit, overwriting any existing
/// overview so a background refresh can correct a stale one.
pub async fn fetch_artist_text(state: &AppState, artist_id: ArtistId) -> Result<()> {
    let Some(mut artist) = state.artist_store.get_artist(artist_id).await? else {
        return Err(OrchestratorError::NotFound);
    };
    for adapter in &state.text_adapters {
        match adapter.get_artist_text(&artist.name).await {
            Ok(Some(text)) => {
                artist.overview = Some(text);
                state.artist_store.upsert_artist(&artist, true).await?;
                return Ok(());
            }
            Ok(None) => continue,
            Err(err) => {
                warn!(target: "application", %artist_id, provider = adapter.provider_name(), error = %err, "text adapter failed");
                continue;
            }
        }
    }
    Ok(())
}

/// `fetch_album_text` job body (§4.5 text pool): same shape as
/// `fetch_artist_text`, keyed by the release group's primary credited
/// artist name plus its own title.
pub async fn fetch_album_text(state: &AppState, release_group_id: ReleaseGroupId) -> Result<()> {
    let Some(mut release_group) = state.release_group_store.get_release_group(release_group_id).await? else {
        return Err(OrchestratorError::NotFound);
    };
    let Some(credit) = release_group.artist_credit.first() else {
        return Ok(());
    };
    let artist_name = match state.artist_store.get_artist(credit.artist_id).await? {
        Some(artist) => artist.name,
        None => credit.credited_name.clone(),
    };

    for adapter in &state.text_adapters {
        match adapter.get_album_text(&artist_name, &release_group.title).await {
            Ok(Some(text)) => {
                release_group.overview = Some(text);
                state.release_group_store.upsert_release_group(&release_group).await?;
                return Ok(());
            }
            Ok(None) => continue,
            Err(err) => {
                warn!(target: "application", %release_group_id, provider = adapter.provider_name(), error = %err, "text adapter failed");
                continue;
            }
        }
    }
    Ok(())
}

fn image_provider_for(name: &str) -> discograph_domain::ImageProvider {
    match name {
        "fanarttv" => discograph_domain::ImageProvider::FanartTv,
        _ => discograph_domain::ImageProvider::CoverArtArchive,
    }
}

/// `fetch_artist_images`/`fetch_album_images` job bodies (§4.5 artwork-url
/// pool): records candidate URLs from every registered artwork adapter as
/// pending `Image` rows. Downloading the bytes is the artwork-binary pool's
/// job, not this one's (§4.5).
pub async fn fetch_artist_images(state: &AppState, artist_id: ArtistId) -> Result<()> {
    let mbid = artist_id.0.to_string();
    for adapter in &state.artwork_adapters {
        let images = match adapter.artist_images(&mbid).await {
            Ok(images) => images,
            Err(err) => {
                warn!(target: "application", %artist_id, provider = adapter.provider_name(), error = %err, "artwork adapter failed");
                continue;
            }
        };
        for (cover_type, url) in images {
            let image = discograph_domain::Image {
                id: discograph_domain::ImageId::new(),
                entity_type: discograph_domain::EntityType::Artist,
                entity_id: artist_id.0,
                cover_type,
                provider: image_provider_for(adapter.provider_name()),
                url,
                local_path: None,
                cached: false,
                cache_failed: false,
                cache_failed_reason: None,
                user_uploaded: false,
                last_verified_at: Some(chrono::Utc::now()),
                cached_at: None,
            };
            state.image_store.upsert_image_url(&image).await?;
        }
    }
    Ok(())
}

pub async fn fetch_album_images(state: &AppState, release_group_id: ReleaseGroupId) -> Result<()> {
    let mbid = release_group_id.0.to_string();
    for adapter in &state.artwork_adapters {
        let images = match adapter.album_images(&mbid).await {
            Ok(images) => images,
            Err(err) => {
                warn!(target: "application", %release_group_id, provider = adapter.provider_name(), error = %err, "artwork adapter failed");
                continue;
            }
        };
        for (cover_type, url) in images {
            let image = discograph_domain::Image {
                id: discograph_domain::ImageId::new(),
                entity_type: discograph_domain::EntityType::ReleaseGroup,
                entity_id: release_group_id.0,
                cover_type,
                provider: image_provider_for(adapter.provider_name()),
                url,
                local_path: None,
                cached: false,
                cache_failed: false,
                cache_failed_reason: None,
                user_uploaded: false,
                last_verified_at: Some(chrono::Utc::now()),
                cached_at: None,
            };
            state.image_store.upsert_image_url(&image).await?;
        }
    }
    Ok(())
}

/// `ensureArtist(artistId) → ArtistResponse` (§4.6).
pub async fn ensure_artist(state: &AppState, artist_id: ArtistId) -> Result<ArtistResponse> {
    let mut artist = ensure_artist_record(state, artist_id).await?;

    fill_overview_once(state, &mut artist).await;

    let existing_links = state.artist_store.list_artist_release_groups(artist_id).await?;
    if existing_links.is_empty() {
        let album_types = parse_album_types(&state.config.metadata.fetch_types.album_types);
        let release_statuses = parse_release_statuses(&state.config.metadata.fetch_types.release_statuses);
        let upstream = fetch_all_artist_albums(state, artist_id).await?;
        for (position, release_group) in upstream.iter().enumerate() {
            ingest_release_group(state, artist_id, position as i32, release_group, &album_types, &release_statuses).await?;
        }
    }

    state
        .job_queue
        .enqueue(1, JobMetadata::FetchArtistText { artist_id })
        .await
        .map_err(OrchestratorError::Internal)?;
    if !state.artwork_adapters.is_empty() {
        state
            .job_queue
            .enqueue(1, JobMetadata::FetchArtistImages { artist_id })
            .await
            .map_err(OrchestratorError::Internal)?;
    }

    state.artist_store.touch_artist_access(artist_id).await?;
    format_artist_response(state, &artist).await
}

async fn format_artist_response(state: &AppState, artist: &Artist) -> Result<ArtistResponse> {
    let links = state
        .link_store
        .list_links(discograph_domain::EntityType::Artist, artist.id.0)
        .await?;
    let images = state
        .image_store
        .list_images(discograph_domain::EntityType::Artist, artist.id.0)
        .await?;

    let mut albums = Vec::new();
    for link in state.artist_store.list_artist_release_groups(artist.id).await? {
        if let Some(release_group) = state.release_group_store.get_release_group(link.release_group_id).await? {
            let releases = state
                .release_store
                .list_releases_by_release_group(release_group.id)
                .await?;
            albums.push(formatter::format_album_summary(&release_group, &releases));
        }
    }

    Ok(formatter::format_artist(artist, albums, &links, &images, &image_url_base(state)))
}

/// `ensureAlbum(releaseGroupId) → AlbumResponse` (§4.6).
pub async fn ensure_album(state: &AppState, release_group_id: ReleaseGroupId) -> Result<AlbumResponse> {
    let release_group = match state.release_group_store.get_release_group(release_group_id).await? {
        Some(existing) if !is_release_group_stale(&existing, state.config.refresh.artist_ttl_days) => existing,
        _ => fetch_and_link_release_group(state, release_group_id).await?,
    };

    state
        .job_queue
        .enqueue(1, JobMetadata::FetchAlbumText { release_group_id })
        .await
        .map_err(OrchestratorError::Internal)?;
    if !state.artwork_adapters.is_empty() {
        state
            .job_queue
            .enqueue(1, JobMetadata::FetchAlbumImages { release_group_id })
            .await
            .map_err(OrchestratorError::Internal)?;
    }
    state
        .job_queue
        .enqueue(3, JobMetadata::FetchAlbumFull { release_group_id })
        .await
        .map_err(OrchestratorError::Internal)?;

    state.release_group_store.touch_release_group_access(release_group_id).await?;
    format_album_response(state, &release_group).await
}

fn is_release_group_stale(release_group: &ReleaseGroup, ttl_days: i64) -> bool {
    match release_group.ttl_expires_at {
        Some(expires_at) => expires_at <= chrono::Utc::now(),
        None => chrono::Utc::now() - release_group.last_updated_at > chrono::Duration::days(ttl_days),
    }
}

/// Step 2 of `ensureAlbum`: fetch a missing (or stale) release group, cascade
/// into fetching its credited artist if needed, apply the album-type filter
/// (recording the release group even when it's filtered out), and — if it
/// survives — enumerate its releases.
async fn fetch_and_link_release_group(state: &AppState, release_group_id: ReleaseGroupId) -> Result<ReleaseGroup> {
    let release_group = state.canonical.get_release_group(release_group_id).await?;

    for credit in &release_group.artist_credit {
        if state.artist_store.get_artist(credit.artist_id).await?.is_none() {
            ensure_artist_record(state, credit.artist_id).await?;
        }
    }

    state.release_group_store.upsert_release_group(&release_group).await?;
    if let Some(credit) = release_group.artist_credit.first() {
        state
            .artist_store
            .link_artist_to_release_group(credit.artist_id, release_group.id, 0)
            .await?;
    }

    let album_types = parse_album_types(&state.config.metadata.fetch_types.album_types);
    if !release_group_passes(&release_group, &album_types) {
        debug!(target: "application", release_group_id = %release_group.id, "album rejected by album-type filter; metadata kept, releases skipped");
        return Ok(release_group);
    }

    let release_statuses = parse_release_statuses(&state.config.metadata.fetch_types.release_statuses);
    ingest_releases(state, release_group.id, &release_statuses).await?;
    Ok(release_group)
}

async fn format_album_response(state: &AppState, release_group: &ReleaseGroup) -> Result<AlbumResponse> {
    let releases = state
        .release_store
        .list_releases_by_release_group(release_group.id)
        .await?;

    let recording_ids: HashSet<RecordingId> = releases
        .iter()
        .flat_map(|r| r.media.iter())
        .flat_map(|m| m.tracks.iter())
        .map(|t| t.recording_id)
        .collect();
    let mut recordings = HashMap::new();
    for id in recording_ids {
        if let Some(recording) = state.release_store.get_recording(id).await? {
            recordings.insert(id, recording);
        }
    }

    let artist_ids: Vec<ArtistId> = release_group.artist_credit.iter().map(|c| c.artist_id).collect();
    let url_base = image_url_base(state);
    let embedded_artists = formatter::load_embedded_artists(
        state.artist_store.as_ref(),
        state.link_store.as_ref(),
        state.image_store.as_ref(),
        &artist_ids,
        &url_base,
    )
    .await
    .map_err(OrchestratorError::Internal)?;

    let links = state
        .link_store
        .list_links(discograph_domain::EntityType::ReleaseGroup, release_group.id.0)
        .await?;
    let images = state
        .image_store
        .list_images(discograph_domain::EntityType::ReleaseGroup, release_group.id.0)
        .await?;

    Ok(formatter::format_album(
        release_group,
        &releases,
        &recordings,
        embedded_artists,
        &links,
        &images,
        &url_base,
    ))
}

/// Synthesizes a descending relevance score from result position, since
/// `artist_from_wire` discards the upstream `score` field and the domain
/// `Artist` carries no score of its own (§6, an Open Question decision).
fn decide_search_score(position: usize) -> i32 {
    100i32.saturating_sub(position as i32)
}

/// `search(query, limit) → [SearchResult]` (§6). Delegates straight to the
/// canonical adapter's artist search and formats each hit without touching
/// the store — per §6 this endpoint never persists what it returns, and
/// `CanonicalAdapter` exposes no album-search capability, so every result
/// here is an artist hit with `album: None` (an Open Question decision:
/// album search is out of scope until an adapter advertises that capability).
pub async fn search(state: &AppState, query: &str, limit: usize) -> Result<Vec<formatter::SearchResult>> {
    let hits = state.canonical.search_artist(query).await?;
    let url_base = image_url_base(state);

    Ok(hits
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(position, artist)| {
            let formatted = formatter::format_artist(&artist, Vec::new(), &[], &[], &url_base);
            let score = decide_search_score(position);
            formatter::SearchResult {
                album: None,
                artist: Some(formatted),
                score,
            }
        })
        .collect())
}

/// Admin `POST /api/refresh/all` (§3's `BulkRefresh` row, §6). Enqueues an
/// album-catalog refresh for every known artist and records the sweep as a
/// `BulkRefresh` row; does not wait for the enqueued jobs to drain — the
/// row's `completed_at`/`artists_refreshed` reflect enqueue completion, not
/// job completion, since tracking the latter would need a join the job
/// queue doesn't expose today.
pub async fn refresh_all(state: &AppState) -> Result<discograph_domain::BulkRefresh> {
    let sweep = state.bulk_refresh_store.start_bulk_refresh().await?;
    let artist_ids = state.artist_store.list_artist_ids().await?;

    let mut enqueued = 0i32;
    for artist_id in &artist_ids {
        match state
            .job_queue
            .enqueue(0, JobMetadata::FetchArtistAlbums { artist_id: *artist_id })
            .await
        {
            Ok(_) => enqueued += 1,
            Err(err) => warn!(target: "application", %artist_id, error = %err, "failed to enqueue refresh-all job"),
        }
    }

    state
        .bulk_refresh_store
        .complete_bulk_refresh(sweep.id, enqueued)
        .await?;

    Ok(discograph_domain::BulkRefresh {
        artists_refreshed: enqueued,
        status: discograph_domain::BulkRefreshStatus::Completed,
        ..sweep
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_new_release_groups_keeps_only_ids_missing_from_stored() {
        let a = ReleaseGroupId::new();
        let b = ReleaseGroupId::new();
        let c = ReleaseGroupId::new();
        let stored: HashSet<ReleaseGroupId> = [a].into_iter().collect();
        let upstream = vec![a, b, c];
        let new_ids = decide_new_release_groups(&upstream, &stored);
        assert_eq!(new_ids.len(), 2);
        assert!(new_ids.contains(&b));
        assert!(new_ids.contains(&c));
    }

    #[test]
    fn decide_new_release_groups_is_empty_when_nothing_changed() {
        let a = ReleaseGroupId::new();
        let stored: HashSet<ReleaseGroupId> = [a].into_iter().collect();
        assert!(decide_new_release_groups(&[a], &stored).is_empty());
    }

    #[test]
    fn decide_search_score_is_strictly_descending_by_position() {
        assert_eq!(decide_search_score(0), 100);
        assert_eq!(decide_search_score(1), 99);
        assert_eq!(decide_search_score(99), 1);
    }

    #[test]
    fn decide_search_score_never_goes_negative() {
        assert_eq!(decide_search_score(1000), 0);
    }
}
