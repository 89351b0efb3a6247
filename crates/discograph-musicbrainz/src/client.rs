// SPDX-License-Identifier: GPL-3.0-or-later
//! The canonical provider adapter (§4.1 C1). Talks to the MusicBrainz API,
//! normalizes every response into a `discograph_domain` entity, and retries
//! transient failures with linear backoff.

use crate::error::{AdapterError, Result};
use crate::models::{
    Page, WireArtist, WireArtistSearchResults, WireRelease, WireReleaseBrowse, WireReleaseGroup,
    WireReleaseGroupBrowse, WireSearchResponse,
};
use crate::rate_limiter::RateLimiter;
use async_trait::async_trait;
use discograph_domain::{
    normalize_partial_date, Artist, ArtistCreditEntry, ArtistId, ArtistType, Label, Medium,
    Rating, Recording, RecordingId, Release, ReleaseGroup, ReleaseGroupId, ReleaseId,
    ReleaseStatus, Track, TrackId,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";
const USER_AGENT: &str = concat!(
    "Discograph/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/example/discograph )"
);
const MAX_RETRIES: u32 = 10;
const RETRY_BASE: Duration = Duration::from_secs(3);
const DEFAULT_PAGE_SIZE: u32 = 100;

#[async_trait]
pub trait CanonicalAdapter: Send + Sync {
    async fn search_artist(&self, query: &str) -> Result<Vec<Artist>>;
    async fn get_artist(&self, id: ArtistId) -> Result<Artist>;
    async fn get_artist_albums(&self, id: ArtistId, offset: u32, limit: u32) -> Result<Page<ReleaseGroup>>;
    async fn get_release_group(&self, id: ReleaseGroupId) -> Result<ReleaseGroup>;
    async fn get_releases_by_release_group(
        &self,
        id: ReleaseGroupId,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Release>>;
    async fn get_release(&self, id: ReleaseId) -> Result<Release>;
}

#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl MusicBrainzClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> MusicBrainzClientBuilder {
        MusicBrainzClientBuilder::default()
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempt = 0u32;
        loop {
            self.rate_limiter.acquire().await;
            trace!(target: "musicbrainz", url, attempt, "GET");

            let outcome = self.client.get(url).header("User-Agent", USER_AGENT).send().await;

            let err = match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await?;
                        return serde_json::from_str(&body).map_err(AdapterError::from);
                    }
                    let body = response.text().await.unwrap_or_default();
                    AdapterError::from_status(status, body)
                }
                Err(e) => AdapterError::from(e),
            };

            if !err.is_retryable() || attempt >= MAX_RETRIES {
                return Err(err);
            }

            attempt += 1;
            let backoff = RETRY_BASE * attempt;
            warn!(target: "musicbrainz", attempt, ?backoff, %err, "retrying after transient failure");
            sleep(backoff).await;
        }
    }
}

#[async_trait]
impl CanonicalAdapter for MusicBrainzClient {
    async fn search_artist(&self, query: &str) -> Result<Vec<Artist>> {
        let url = format!(
            "{}/artist?query={}&fmt=json",
            self.base_url,
            urlencoding_query(query)
        );
        let response: WireSearchResponse<WireArtistSearchResults> = self.get(&url).await?;
        Ok(response.results.artists.into_iter().map(artist_from_wire).collect())
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Artist> {
        let url = format!(
            "{}/artist/{}?fmt=json&inc=aliases+tags",
            self.base_url, id.0
        );
        let wire: WireArtist = self.get(&url).await?;
        Ok(artist_from_wire(wire))
    }

    async fn get_artist_albums(&self, id: ArtistId, offset: u32, limit: u32) -> Result<Page<ReleaseGroup>> {
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        let url = format!(
            "{}/release-group?artist={}&fmt=json&limit={}&offset={}",
            self.base_url, id.0, limit, offset
        );
        let browse: WireReleaseGroupBrowse = self.get(&url).await?;
        Ok(Page {
            items: browse
                .release_groups
                .into_iter()
                .map(release_group_from_wire)
                .collect(),
            total: browse.count,
            offset: browse.offset,
        })
    }

    async fn get_release_group(&self, id: ReleaseGroupId) -> Result<ReleaseGroup> {
        let url = format!(
            "{}/release-group/{}?fmt=json&inc=artist-credits+tags",
            self.base_url, id.0
        );
        let wire: WireReleaseGroup = self.get(&url).await?;
        Ok(release_group_from_wire(wire))
    }

    async fn get_releases_by_release_group(
        &self,
        id: ReleaseGroupId,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Release>> {
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };
        let url = format!(
            "{}/release?release-group={}&fmt=json&limit={}&offset={}&inc=labels+media+artist-credits+recordings",
            self.base_url, id.0, limit, offset
        );
        let browse: WireReleaseBrowse = self.get(&url).await?;
        Ok(Page {
            items: browse
                .releases
                .into_iter()
                .map(|w| release_from_wire(w, id))
                .collect(),
            total: browse.count,
            offset: browse.offset,
        })
    }

    async fn get_release(&self, id: ReleaseId) -> Result<Release> {
        let url = format!(
            "{}/release/{}?fmt=json&inc=labels+media+artist-credits+recordings+release-groups",
            self.base_url, id.0
        );
        let wire: WireRelease = self.get(&url).await?;
        // The release-group id is not modeled on WireRelease directly since
        // it is requested by release id here; callers that already know the
        // parent release group use `get_releases_by_release_group` instead.
        Ok(release_from_wire(wire, ReleaseGroupId::new()))
    }
}

fn urlencoding_query(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn artist_type_from_wire(raw: Option<&str>) -> Option<ArtistType> {
    match raw?.to_lowercase().as_str() {
        "person" => Some(ArtistType::Person),
        "group" => Some(ArtistType::Group),
        "orchestra" => Some(ArtistType::Orchestra),
        "choir" => Some(ArtistType::Choir),
        "character" => Some(ArtistType::Character),
        _ => Some(ArtistType::Other),
    }
}

fn artist_from_wire(wire: WireArtist) -> Artist {
    let life_span = wire.life_span;
    Artist {
        id: ArtistId::from_uuid(wire.id),
        name: wire.name,
        sort_name: wire.sort_name,
        disambiguation: wire.disambiguation.filter(|s| !s.is_empty()),
        artist_type: artist_type_from_wire(wire.artist_type.as_deref()),
        country: wire.country,
        begin_date: life_span
            .as_ref()
            .and_then(|l| normalize_partial_date(l.begin.as_deref())),
        end_date: life_span
            .as_ref()
            .and_then(|l| normalize_partial_date(l.end.as_deref())),
        gender: wire.gender,
        ended: life_span.map(|l| l.ended).unwrap_or(false),
        aliases: wire.aliases.into_iter().map(|a| a.name).collect(),
        tags: wire.tags.into_iter().map(|t| t.name).collect(),
        genres: Vec::new(),
        rating: Some(Rating::unrated()),
        overview: None,
        access_count: 0,
        last_accessed_at: None,
        last_updated_at: chrono::Utc::now(),
        ttl_expires_at: None,
        fetch_complete: false,
        releases_fetched_count: 0,
        last_fetch_attempt: None,
    }
}

fn artist_credit_from_wire(wire: Vec<crate::models::WireArtistCredit>) -> Vec<ArtistCreditEntry> {
    wire.into_iter()
        .map(|c| ArtistCreditEntry {
            artist_id: ArtistId::from_uuid(c.artist.id),
            credited_name: c.name,
            join_phrase: c.joinphrase,
        })
        .collect()
}

fn release_group_from_wire(wire: WireReleaseGroup) -> ReleaseGroup {
    ReleaseGroup {
        id: ReleaseGroupId::from_uuid(wire.id),
        title: wire.title,
        disambiguation: wire.disambiguation.filter(|s| !s.is_empty()),
        primary_type: wire.primary_type,
        secondary_types: wire.secondary_types,
        first_release_date: normalize_partial_date(wire.first_release_date.as_deref()),
        artist_credit: artist_credit_from_wire(wire.artist_credit),
        aliases: Vec::new(),
        tags: Vec::new(),
        genres: Vec::new(),
        rating: Some(Rating::unrated()),
        overview: None,
        access_count: 0,
        last_accessed_at: None,
        last_updated_at: chrono::Utc::now(),
        ttl_expires_at: None,
    }
}

fn release_status_from_wire(raw: Option<&str>) -> Option<ReleaseStatus> {
    match raw? {
        "Official" => Some(ReleaseStatus::Official),
        "Promotion" => Some(ReleaseStatus::Promotion),
        "Bootleg" => Some(ReleaseStatus::Bootleg),
        "Pseudo-Release" => Some(ReleaseStatus::PseudoRelease),
        _ => None,
    }
}

fn release_from_wire(wire: WireRelease, release_group_id: ReleaseGroupId) -> Release {
    let release_id = ReleaseId::from_uuid(wire.id);
    let artist_credit = artist_credit_from_wire(wire.artist_credit);

    let media: Vec<Medium> = wire
        .media
        .into_iter()
        .map(|m| {
            let tracks: Vec<Track> = m
                .tracks
                .into_iter()
                .map(|t| Track {
                    id: TrackId::from_uuid(t.id),
                    release_id,
                    recording_id: RecordingId::from_uuid(t.recording.id),
                    medium_number: m.position,
                    position: t.position,
                    title: t.title,
                    length_ms: t.length.or(t.recording.length),
                    artist_credit: if t.artist_credit.is_empty() {
                        artist_credit.clone()
                    } else {
                        artist_credit_from_wire(t.artist_credit)
                    },
                })
                .collect();
            Medium {
                position: m.position,
                format: m.format,
                name: m.title,
                tracks,
            }
        })
        .collect();

    let track_count = media.iter().map(|m| m.tracks.len() as i32).sum();

    Release {
        id: release_id,
        release_group_id,
        title: wire.title,
        disambiguation: wire.disambiguation.filter(|s| !s.is_empty()),
        status: release_status_from_wire(wire.status.as_deref()),
        release_date: normalize_partial_date(wire.date.as_deref()),
        country: wire.country,
        barcode: wire.barcode,
        labels: wire
            .label_info
            .into_iter()
            .filter_map(|li| {
                li.label.map(|l| Label {
                    name: l.name,
                    catalog_number: li.catalog_number,
                })
            })
            .collect(),
        artist_credit,
        media_count: media.len() as i32,
        track_count,
        media,
    }
}

/// Extracts every recording referenced by a release so the caller can upsert
/// recordings independently of their embedding track.
pub fn recordings_from_release(release: &Release) -> Vec<Recording> {
    release
        .media
        .iter()
        .flat_map(|m| m.tracks.iter())
        .map(|t| Recording {
            id: t.recording_id,
            title: t.title.clone(),
            disambiguation: None,
            length_ms: t.length_ms,
        })
        .collect()
}

#[derive(Debug)]
pub struct MusicBrainzClientBuilder {
    base_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
}

impl Default for MusicBrainzClientBuilder {
    fn default() -> Self {
        Self {
            base_url: MUSICBRAINZ_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit_interval: Duration::from_millis(2000),
        }
    }
}

impl MusicBrainzClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    pub fn build(self) -> Result<MusicBrainzClient> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        debug!(target: "musicbrainz", base_url = %self.base_url, "built client");

        Ok(MusicBrainzClient {
            client,
            base_url: self.base_url,
            rate_limiter: RateLimiter::new(self.rate_limit_interval),
        })
    }
}
