// SPDX-License-Identifier: GPL-3.0-or-later
//! The response formatter (C3, §4.3): pure functions from already-loaded
//! store rows to the consumer-facing wire shape. The only I/O this module
//! performs is the batched artist/link/image lookup for embedding credited
//! artists on an album — three queries regardless of artist count, never
//! 3·N. Everything downstream of that load is a plain, deterministic fold.

use std::collections::HashMap;

use discograph_domain::{
    Artist, ArtistId, ArtistType, Image, Label, Link, LinkType, Medium, Rating, Recording,
    RecordingId, Release, ReleaseGroup,
};
use discograph_store::repositories::{ArtistStore, ImageStore, LinkStore};
use serde::Serialize;

/// Where the local image-serving endpoint lives, so a cached image can be
/// rewritten to a locally-served URL instead of the upstream one (§4.3).
#[derive(Debug, Clone)]
pub struct ImageUrlBase {
    pub server_url: Option<String>,
    pub host: String,
    pub port: u16,
}

impl ImageUrlBase {
    fn base(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    #[serde(rename = "Count")]
    pub count: u32,
    #[serde(rename = "Value")]
    pub value: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageResponse {
    #[serde(rename = "CoverType")]
    pub cover_type: String,
    #[serde(rename = "Url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumSummaryResponse {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "OldIds")]
    pub old_ids: Vec<String>,
    #[serde(rename = "ReleaseStatuses")]
    pub release_statuses: Vec<String>,
    #[serde(rename = "SecondaryTypes")]
    pub secondary_types: Vec<String>,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Type")]
    pub album_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistResponse {
    pub id: String,
    pub artistname: String,
    pub sortname: String,
    pub disambiguation: Option<String>,
    #[serde(rename = "type")]
    pub artist_type: Option<String>,
    pub status: String,
    pub overview: Option<String>,
    pub rating: RatingResponse,
    pub genres: Vec<String>,
    pub artistaliases: Vec<String>,
    pub links: Vec<LinkResponse>,
    pub images: Vec<ImageResponse>,
    #[serde(rename = "Albums")]
    pub albums: Vec<AlbumSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediumResponse {
    #[serde(rename = "Format")]
    pub format: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Position")]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackResponse {
    pub id: String,
    pub trackname: String,
    pub recordingid: String,
    pub artistid: String,
    pub durationms: Option<i32>,
    pub tracknumber: String,
    pub trackposition: i32,
    pub mediumnumber: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseResponse {
    pub id: String,
    pub title: String,
    pub status: Option<String>,
    pub releasedate: Option<String>,
    pub country: Vec<String>,
    pub label: Vec<Label>,
    pub media: Vec<MediumResponse>,
    pub track_count: i32,
    pub tracks: Vec<TrackResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumResponse {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub album_type: Option<String>,
    pub secondarytypes: Vec<String>,
    pub disambiguation: Option<String>,
    pub overview: Option<String>,
    pub releasedate: Option<String>,
    pub artistid: String,
    pub artists: Vec<ArtistResponse>,
    pub releases: Vec<ReleaseResponse>,
    pub rating: RatingResponse,
    pub genres: Vec<String>,
    pub links: Vec<LinkResponse>,
    pub images: Vec<ImageResponse>,
    pub aliases: Vec<String>,
    pub oldids: Vec<String>,
}

/// One entry of `GET /search`'s flat result list (§6): exactly one of
/// `artist`/`album` is populated per hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub album: Option<AlbumResponse>,
    pub artist: Option<ArtistResponse>,
    pub score: i32,
}

/// "hip hop" -> "Hip Hop" (§4.3).
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_all(genres: &[String]) -> Vec<String> {
    genres.iter().map(|g| title_case(g)).collect()
}

fn format_rating(rating: &Option<Rating>) -> RatingResponse {
    match rating {
        Some(r) => RatingResponse {
            count: r.count,
            value: r.value,
        },
        None => RatingResponse { count: 0, value: None },
    }
}

fn artist_type_name(artist_type: ArtistType) -> &'static str {
    match artist_type {
        ArtistType::Person => "Person",
        ArtistType::Group => "Group",
        ArtistType::Orchestra => "Orchestra",
        ArtistType::Choir => "Choir",
        ArtistType::Character => "Character",
        ArtistType::Other => "Other",
    }
}

fn link_type_name(link_type: LinkType) -> &'static str {
    match link_type {
        LinkType::Official => "official",
        LinkType::Wikipedia => "wikipedia",
        LinkType::Discogs => "discogs",
        LinkType::Bandcamp => "bandcamp",
        LinkType::Soundcloud => "soundcloud",
        LinkType::Youtube => "youtube",
        LinkType::Lastfm => "lastfm",
        LinkType::Other => "other",
    }
}

fn format_links(links: &[Link]) -> Vec<LinkResponse> {
    links
        .iter()
        .map(|l| LinkResponse {
            target: l.url.clone(),
            link_type: link_type_name(l.link_type).to_string(),
        })
        .collect()
}

/// Rewrites a cached image to the local serving endpoint; falls back to the
/// upstream URL when nothing has been downloaded yet (§4.3 and the image
/// refresh policy in §9: the binary is only re-downloaded when uncached).
fn resolve_image_url(image: &Image, url_base: &ImageUrlBase) -> String {
    if image.cached {
        if let Some(local_path) = &image.local_path {
            return format!("{}/images/{}", url_base.base().trim_end_matches('/'), local_path);
        }
    }
    image.url.clone()
}

fn format_images(images: &[Image], url_base: &ImageUrlBase) -> Vec<ImageResponse> {
    images
        .iter()
        .map(|i| ImageResponse {
            cover_type: i.cover_type.as_str().to_string(),
            url: resolve_image_url(i, url_base),
        })
        .collect()
}

/// One entry of an artist's `Albums` summary list, built from a release
/// group and the releases already fetched for it — no extra query.
pub fn format_album_summary(release_group: &ReleaseGroup, releases: &[Release]) -> AlbumSummaryResponse {
    let mut statuses: Vec<String> = releases
        .iter()
        .filter_map(|r| r.status.map(|s| s.as_str().to_string()))
        .collect();
    statuses.sort();
    statuses.dedup();

    AlbumSummaryResponse {
        id: release_group.id.to_string(),
        old_ids: Vec::new(),
        release_statuses: statuses,
        secondary_types: release_group.secondary_types.clone(),
        title: release_group.title.clone(),
        album_type: release_group.primary_type.clone(),
    }
}

pub fn format_artist(
    artist: &Artist,
    albums: Vec<AlbumSummaryResponse>,
    links: &[Link],
    images: &[Image],
    url_base: &ImageUrlBase,
) -> ArtistResponse {
    ArtistResponse {
        id: artist.id.to_string(),
        artistname: artist.name.clone(),
        sortname: artist.sort_name.clone(),
        disambiguation: artist.disambiguation.clone(),
        artist_type: artist.artist_type.map(artist_type_name).map(str::to_string),
        status: artist.status().to_string(),
        overview: artist.overview.clone(),
        rating: format_rating(&artist.rating),
        genres: title_case_all(&artist.genres),
        artistaliases: artist.aliases.clone(),
        links: format_links(links),
        images: format_images(images, url_base),
        albums,
    }
}

/// The embedded-artist shape nested inside an album response: same fields as
/// the top-level artist object, minus its own `Albums` list.
fn format_embedded_artist(artist: &Artist, links: &[Link], images: &[Image], url_base: &ImageUrlBase) -> ArtistResponse {
    format_artist(artist, Vec::new(), links, images, url_base)
}

fn format_release(release: &Release, recordings: &HashMap<RecordingId, Recording>) -> ReleaseResponse {
    let tracks = release
        .media
        .iter()
        .flat_map(|medium| medium.tracks.iter())
        .map(|track| TrackResponse {
            id: track.id.to_string(),
            trackname: track.title.clone(),
            recordingid: track.recording_id.to_string(),
            artistid: track
                .artist_credit
                .first()
                .map(|c| c.artist_id.to_string())
                .unwrap_or_default(),
            durationms: track
                .length_ms
                .or_else(|| recordings.get(&track.recording_id).and_then(|r| r.length_ms)),
            tracknumber: track.position.to_string(),
            trackposition: track.position,
            mediumnumber: track.medium_number,
        })
        .collect();

    ReleaseResponse {
        id: release.id.to_string(),
        title: release.title.clone(),
        status: release.status.map(|s| s.as_str().to_string()),
        releasedate: release.release_date.map(|d| d.to_string()),
        country: release.country.clone().into_iter().collect::<Vec<_>>(),
        label: release.labels.clone(),
        media: release
            .media
            .iter()
            .map(|m: &Medium| MediumResponse {
                format: m.format.clone(),
                name: m.name.clone(),
                position: m.position,
            })
            .collect(),
        track_count: release.track_count,
        tracks,
    }
}

/// Loads the credited artists of an album and their links/images in exactly
/// three queries, regardless of how many artists are credited (§4.3).
pub async fn load_embedded_artists(
    artist_store: &dyn ArtistStore,
    link_store: &dyn LinkStore,
    image_store: &dyn ImageStore,
    artist_ids: &[ArtistId],
    url_base: &ImageUrlBase,
) -> anyhow::Result<Vec<ArtistResponse>> {
    if artist_ids.is_empty() {
        return Ok(Vec::new());
    }

    let artists = artist_store.get_artists(artist_ids).await?;
    let uuids: Vec<uuid::Uuid> = artist_ids.iter().map(|id| id.0).collect();
    let links = link_store
        .list_links_for_entities(discograph_domain::EntityType::Artist, &uuids)
        .await?;
    let images = image_store
        .list_images_for_entities(discograph_domain::EntityType::Artist, &uuids)
        .await?;

    let mut links_by_artist: HashMap<uuid::Uuid, Vec<Link>> = HashMap::new();
    for link in links {
        links_by_artist.entry(link.entity_id).or_default().push(link);
    }
    let mut images_by_artist: HashMap<uuid::Uuid, Vec<Image>> = HashMap::new();
    for image in images {
        images_by_artist.entry(image.entity_id).or_default().push(image);
    }

    Ok(artists
        .iter()
        .map(|artist| {
            let empty_links: Vec<Link> = Vec::new();
            let empty_images: Vec<Image> = Vec::new();
            format_embedded_artist(
                artist,
                links_by_artist.get(&artist.id.0).unwrap_or(&empty_links),
                images_by_artist.get(&artist.id.0).unwrap_or(&empty_images),
                url_base,
            )
        })
        .collect())
}

pub fn format_album(
    release_group: &ReleaseGroup,
    releases: &[Release],
    recordings: &HashMap<RecordingId, Recording>,
    embedded_artists: Vec<ArtistResponse>,
    links: &[Link],
    images: &[Image],
    url_base: &ImageUrlBase,
) -> AlbumResponse {
    let artist_id = release_group
        .artist_credit
        .first()
        .map(|c| c.artist_id.to_string())
        .unwrap_or_default();

    AlbumResponse {
        id: release_group.id.to_string(),
        title: release_group.title.clone(),
        album_type: release_group.primary_type.clone(),
        secondarytypes: release_group.secondary_types.clone(),
        disambiguation: release_group.disambiguation.clone(),
        overview: release_group.overview.clone(),
        releasedate: release_group.first_release_date.map(|d| d.to_string()),
        artistid: artist_id,
        artists: embedded_artists,
        releases: releases.iter().map(|r| format_release(r, recordings)).collect(),
        rating: format_rating(&release_group.rating),
        genres: title_case_all(&release_group.genres),
        links: format_links(links),
        images: format_images(images, url_base),
        aliases: release_group.aliases.clone(),
        oldids: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_handles_multi_word_genres() {
        assert_eq!(title_case("hip hop"), "Hip Hop");
        assert_eq!(title_case("rock"), "Rock");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn missing_rating_coerces_to_zero_count_and_null_value() {
        let rating = format_rating(&None);
        assert_eq!(rating.count, 0);
        assert_eq!(rating.value, None);
    }

    #[test]
    fn format_is_deterministic_given_fixed_inputs() {
        let artist = sample_artist();
        let url_base = ImageUrlBase {
            server_url: None,
            host: "localhost".to_string(),
            port: 5150,
        };
        let first = format_artist(&artist, Vec::new(), &[], &[], &url_base);
        let second = format_artist(&artist, Vec::new(), &[], &[], &url_base);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn a_cached_image_resolves_to_the_local_serving_endpoint() {
        let url_base = ImageUrlBase {
            server_url: Some("https://discograph.example".to_string()),
            host: "localhost".to_string(),
            port: 5150,
        };
        let image = Image {
            id: discograph_domain::ImageId::new(),
            entity_type: discograph_domain::EntityType::Artist,
            entity_id: uuid::Uuid::new_v4(),
            cover_type: discograph_domain::CoverType::Poster,
            provider: discograph_domain::ImageProvider::FanartTv,
            url: "https://fanart.tv/foo.jpg".to_string(),
            local_path: Some("artist/abc/poster.jpg".to_string()),
            cached: true,
            cache_failed: false,
            cache_failed_reason: None,
            user_uploaded: false,
            last_verified_at: None,
            cached_at: None,
        };
        assert_eq!(
            resolve_image_url(&image, &url_base),
            "https://discograph.example/images/artist/abc/poster.jpg"
        );
    }

    fn sample_artist() -> Artist {
        Artist {
            id: discograph_domain::ArtistId::new(),
            name: "Nirvana".to_string(),
            sort_name: "Nirvana".to_string(),
            disambiguation: None,
            artist_type: Some(ArtistType::Group),
            country: Some("US".to_string()),
            begin_date: None,
            end_date: None,
            gender: None,
            ended: true,
            aliases: Vec::new(),
            tags: Vec::new(),
            genres: vec!["grunge".to_string()],
            rating: None,
            overview: None,
            access_count: 0,
            last_accessed_at: None,
            last_updated_at: chrono::Utc::now(),
            ttl_expires_at: None,
            fetch_complete: true,
            releases_fetched_count: 0,
            last_fetch_attempt: None,
        }
    }
}
