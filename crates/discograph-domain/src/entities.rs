//! Entities of the normalized cache (§3 of the specification).

use crate::ids::{ArtistId, ArtistReleaseGroupId, ImageId, LinkId, RecordingId, ReleaseGroupId, ReleaseId, TrackId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtistType {
    Person,
    Group,
    Orchestra,
    Choir,
    Character,
    Other,
}

/// Artist life-span status, derived from the upstream `ended` flag rather
/// than stored as an independent column — a second source of truth for the
/// same fact would only invite drift. See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtistStatus {
    Active,
    Ended,
}

impl ArtistStatus {
    pub fn from_ended(ended: bool) -> Self {
        if ended {
            Self::Ended
        } else {
            Self::Active
        }
    }
}

impl std::fmt::Display for ArtistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// One entry of an artist-credit list: `ArtistReleaseGroup.artist_credit` and
/// the equivalent field on `Release`/`Track` are always this shape, even for
/// a single credited artist (§4.1 normalization contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistCreditEntry {
    pub artist_id: ArtistId,
    pub credited_name: String,
    pub join_phrase: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub count: u32,
    pub value: Option<f32>,
}

impl Rating {
    pub fn unrated() -> Self {
        Self {
            count: 0,
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub sort_name: String,
    pub disambiguation: Option<String>,
    pub artist_type: Option<ArtistType>,
    pub country: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub ended: bool,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub rating: Option<Rating>,
    pub overview: Option<String>,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub last_updated_at: DateTime<Utc>,
    pub ttl_expires_at: Option<DateTime<Utc>>,
    pub fetch_complete: bool,
    pub releases_fetched_count: i32,
    pub last_fetch_attempt: Option<DateTime<Utc>>,
}

impl Artist {
    pub fn status(&self) -> ArtistStatus {
        ArtistStatus::from_ended(self.ended)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AlbumType {
    Studio,
    Live,
    Compilation,
    Soundtrack,
    Remix,
    #[serde(rename = "DJ-mix")]
    DjMix,
    Mixtape,
    Demo,
    Spokenword,
    Interview,
    Audiobook,
    #[serde(rename = "Audio drama")]
    AudioDrama,
    #[serde(rename = "Field recording")]
    FieldRecording,
    #[serde(rename = "EP")]
    Ep,
    Single,
    Broadcast,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseGroup {
    pub id: ReleaseGroupId,
    pub title: String,
    pub disambiguation: Option<String>,
    /// Upstream primary type, e.g. "Album", "EP", "Single" — kept as a raw
    /// string rather than `AlbumType` because upstream emits values this
    /// enum doesn't fully enumerate on its own (combinations are expressed
    /// via `secondary_types`), and filter predicates (§4.6) pattern-match
    /// on the raw pair.
    pub primary_type: Option<String>,
    pub secondary_types: Vec<String>,
    pub first_release_date: Option<NaiveDate>,
    pub artist_credit: Vec<ArtistCreditEntry>,
    pub aliases: Vec<String>,
    pub tags: Vec<String>,
    pub genres: Vec<String>,
    pub rating: Option<Rating>,
    pub overview: Option<String>,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub last_updated_at: DateTime<Utc>,
    pub ttl_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReleaseStatus {
    Official,
    Promotion,
    Bootleg,
    #[serde(rename = "Pseudo-Release")]
    PseudoRelease,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Official => "Official",
            Self::Promotion => "Promotion",
            Self::Bootleg => "Bootleg",
            Self::PseudoRelease => "Pseudo-Release",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub catalog_number: Option<String>,
}

/// One medium (disc/side) of a release, with its tracks embedded — part of
/// the denormalized `media` blob stored on `Release` to avoid repeated joins
/// on the consumer-facing hot path (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub position: i32,
    pub format: Option<String>,
    pub name: Option<String>,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub release_group_id: ReleaseGroupId,
    pub title: String,
    pub disambiguation: Option<String>,
    pub status: Option<ReleaseStatus>,
    pub release_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub barcode: Option<String>,
    pub labels: Vec<Label>,
    pub artist_credit: Vec<ArtistCreditEntry>,
    pub media_count: i32,
    pub track_count: i32,
    pub media: Vec<Medium>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    pub title: String,
    pub disambiguation: Option<String>,
    pub length_ms: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub release_id: ReleaseId,
    pub recording_id: RecordingId,
    pub medium_number: i32,
    pub position: i32,
    pub title: String,
    pub length_ms: Option<i32>,
    pub artist_credit: Vec<ArtistCreditEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistReleaseGroup {
    pub id: ArtistReleaseGroupId,
    pub artist_id: ArtistId,
    pub release_group_id: ReleaseGroupId,
    pub position: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Official,
    Wikipedia,
    Discogs,
    Bandcamp,
    Soundcloud,
    Youtube,
    Lastfm,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub entity_type: crate::ids::EntityType,
    pub entity_id: uuid::Uuid,
    pub link_type: LinkType,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CoverType {
    Poster,
    Banner,
    Fanart,
    Logo,
    Clearart,
    Thumb,
    Cover,
    Disc,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poster => "Poster",
            Self::Banner => "Banner",
            Self::Fanart => "Fanart",
            Self::Logo => "Logo",
            Self::Clearart => "Clearart",
            Self::Thumb => "Thumb",
            Self::Cover => "Cover",
            Self::Disc => "Disc",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid cover type: {0}")]
pub struct InvalidCoverType(pub String);

impl std::str::FromStr for CoverType {
    type Err = InvalidCoverType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Poster" => Ok(Self::Poster),
            "Banner" => Ok(Self::Banner),
            "Fanart" => Ok(Self::Fanart),
            "Logo" => Ok(Self::Logo),
            "Clearart" => Ok(Self::Clearart),
            "Thumb" => Ok(Self::Thumb),
            "Cover" => Ok(Self::Cover),
            "Disc" => Ok(Self::Disc),
            other => Err(InvalidCoverType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProvider {
    FanartTv,
    CoverArtArchive,
    Discogs,
    UserUpload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub entity_type: crate::ids::EntityType,
    pub entity_id: uuid::Uuid,
    pub cover_type: CoverType,
    pub provider: ImageProvider,
    pub url: String,
    pub local_path: Option<String>,
    pub cached: bool,
    pub cache_failed: bool,
    pub cache_failed_reason: Option<String>,
    pub user_uploaded: bool,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub cached_at: Option<DateTime<Utc>>,
}

impl Image {
    /// Invariant 5 (§3): `cached` and `cache_failed` are mutually exclusive,
    /// and a cached row always has a local path.
    pub fn is_consistent(&self) -> bool {
        !(self.cached && self.cache_failed) && (!self.cached || self.local_path.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkRefreshStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRefresh {
    pub id: crate::ids::BulkRefreshId,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: BulkRefreshStatus,
    pub artists_refreshed: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_type_round_trips_through_its_string_form() {
        for ct in [
            CoverType::Poster,
            CoverType::Banner,
            CoverType::Fanart,
            CoverType::Logo,
            CoverType::Clearart,
            CoverType::Thumb,
            CoverType::Cover,
            CoverType::Disc,
        ] {
            let parsed: CoverType = ct.as_str().parse().unwrap();
            assert_eq!(parsed, ct);
        }
    }

    #[test]
    fn cover_type_rejects_an_unknown_string() {
        assert!("Nonsense".parse::<CoverType>().is_err());
    }

    #[test]
    fn image_consistency_invariant() {
        let base = Image {
            id: ImageId::new(),
            entity_type: crate::ids::EntityType::Artist,
            entity_id: uuid::Uuid::new_v4(),
            cover_type: CoverType::Poster,
            provider: ImageProvider::FanartTv,
            url: "https://example.test/x.jpg".to_string(),
            local_path: None,
            cached: false,
            cache_failed: false,
            cache_failed_reason: None,
            user_uploaded: false,
            last_verified_at: None,
            cached_at: None,
        };
        assert!(base.is_consistent());

        let cached_without_path = Image {
            cached: true,
            ..base.clone()
        };
        assert!(!cached_without_path.is_consistent());

        let cached_with_path = Image {
            cached: true,
            local_path: Some("artist/x/poster.jpg".to_string()),
            ..base.clone()
        };
        assert!(cached_with_path.is_consistent());

        let cached_and_failed = Image {
            cached: true,
            cache_failed: true,
            local_path: Some("artist/x/poster.jpg".to_string()),
            ..base
        };
        assert!(!cached_and_failed.is_consistent());
    }
}
