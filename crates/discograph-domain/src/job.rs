//! The closed job-type enumeration and its per-type metadata (§4.4, §9
//! Design Notes: "replace dynamic typing of job metadata with a closed
//! enumeration of job types, each with a strongly-typed metadata struct").

use crate::ids::{ArtistId, EntityType, ImageId, JobId, ReleaseGroupId, ReleaseId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FetchArtist,
    FetchArtistAlbums,
    FetchRelease,
    FetchAlbumFull,
    ArtistFull,
    FetchArtistText,
    FetchAlbumText,
    FetchArtistImages,
    FetchAlbumImages,
    DownloadImage,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchArtist => "fetch_artist",
            Self::FetchArtistAlbums => "fetch_artist_albums",
            Self::FetchRelease => "fetch_release",
            Self::FetchAlbumFull => "fetch_album_full",
            Self::ArtistFull => "artist_full",
            Self::FetchArtistText => "fetch_artist_text",
            Self::FetchAlbumText => "fetch_album_text",
            Self::FetchArtistImages => "fetch_artist_images",
            Self::FetchAlbumImages => "fetch_album_images",
            Self::DownloadImage => "download_image",
        }
    }

    /// Which worker pool drains this job type (§4.5).
    pub fn pool(&self) -> WorkerPool {
        match self {
            Self::FetchArtist
            | Self::FetchArtistAlbums
            | Self::FetchRelease
            | Self::FetchAlbumFull
            | Self::ArtistFull => WorkerPool::Canonical,
            Self::FetchArtistText | Self::FetchAlbumText => WorkerPool::Text,
            Self::FetchArtistImages | Self::FetchAlbumImages => WorkerPool::ArtworkUrl,
            Self::DownloadImage => WorkerPool::ArtworkBinary,
        }
    }

    pub const CANONICAL: &'static [JobType] = &[
        JobType::FetchArtist,
        JobType::FetchArtistAlbums,
        JobType::FetchRelease,
        JobType::FetchAlbumFull,
        JobType::ArtistFull,
    ];
    pub const TEXT: &'static [JobType] = &[JobType::FetchArtistText, JobType::FetchAlbumText];
    pub const ARTWORK_URL: &'static [JobType] =
        &[JobType::FetchArtistImages, JobType::FetchAlbumImages];
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobType {
    type Err = InvalidJobType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fetch_artist" => Ok(Self::FetchArtist),
            "fetch_artist_albums" => Ok(Self::FetchArtistAlbums),
            "fetch_release" => Ok(Self::FetchRelease),
            "fetch_album_full" => Ok(Self::FetchAlbumFull),
            "artist_full" => Ok(Self::ArtistFull),
            "fetch_artist_text" => Ok(Self::FetchArtistText),
            "fetch_album_text" => Ok(Self::FetchAlbumText),
            "fetch_artist_images" => Ok(Self::FetchArtistImages),
            "fetch_album_images" => Ok(Self::FetchAlbumImages),
            "download_image" => Ok(Self::DownloadImage),
            other => Err(InvalidJobType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid job_type: {0}")]
pub struct InvalidJobType(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPool {
    Canonical,
    Text,
    ArtworkUrl,
    ArtworkBinary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = InvalidJobStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(InvalidJobStatus(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid job status: {0}")]
pub struct InvalidJobStatus(pub String);

pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// Strongly-typed payload carried by a job row. Persisted as the `metadata`
/// JSONB blob; the worker decodes into the variant matching its job_type
/// rather than reading an untyped map (§9 Design Notes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum JobMetadata {
    FetchArtist { artist_id: ArtistId },
    FetchArtistAlbums { artist_id: ArtistId },
    FetchRelease { release_id: ReleaseId, release_group_id: ReleaseGroupId },
    FetchAlbumFull { release_group_id: ReleaseGroupId },
    ArtistFull { artist_id: ArtistId },
    FetchArtistText { artist_id: ArtistId },
    FetchAlbumText { release_group_id: ReleaseGroupId },
    FetchArtistImages { artist_id: ArtistId },
    FetchAlbumImages { release_group_id: ReleaseGroupId },
    DownloadImage { image_id: ImageId },
}

impl JobMetadata {
    pub fn job_type(&self) -> JobType {
        match self {
            Self::FetchArtist { .. } => JobType::FetchArtist,
            Self::FetchArtistAlbums { .. } => JobType::FetchArtistAlbums,
            Self::FetchRelease { .. } => JobType::FetchRelease,
            Self::FetchAlbumFull { .. } => JobType::FetchAlbumFull,
            Self::ArtistFull { .. } => JobType::ArtistFull,
            Self::FetchArtistText { .. } => JobType::FetchArtistText,
            Self::FetchAlbumText { .. } => JobType::FetchAlbumText,
            Self::FetchArtistImages { .. } => JobType::FetchArtistImages,
            Self::FetchAlbumImages { .. } => JobType::FetchAlbumImages,
            Self::DownloadImage { .. } => JobType::DownloadImage,
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::FetchArtist { .. }
            | Self::FetchArtistAlbums { .. }
            | Self::ArtistFull { .. }
            | Self::FetchArtistText { .. }
            | Self::FetchArtistImages { .. } => EntityType::Artist,
            Self::FetchRelease { .. }
            | Self::FetchAlbumFull { .. }
            | Self::FetchAlbumText { .. }
            | Self::FetchAlbumImages { .. } => EntityType::ReleaseGroup,
            // Image downloads are keyed by the image row, not an entity_type
            // in the Artist/ReleaseGroup sense; see `Job::entity_id`.
            Self::DownloadImage { .. } => EntityType::ReleaseGroup,
        }
    }

    /// The `entity_id` the job's uniqueness constraint is keyed on (§4.4).
    pub fn entity_id(&self) -> uuid::Uuid {
        match self {
            Self::FetchArtist { artist_id }
            | Self::FetchArtistAlbums { artist_id }
            | Self::ArtistFull { artist_id }
            | Self::FetchArtistText { artist_id }
            | Self::FetchArtistImages { artist_id } => artist_id.0,
            Self::FetchRelease { release_group_id, .. }
            | Self::FetchAlbumFull { release_group_id }
            | Self::FetchAlbumText { release_group_id }
            | Self::FetchAlbumImages { release_group_id } => release_group_id.0,
            Self::DownloadImage { image_id } => image_id.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_type: JobType,
    pub entity_type: EntityType,
    pub entity_id: uuid::Uuid,
    pub priority: i32,
    pub status: JobStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub metadata: JobMetadata,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_round_trips_through_its_string_form() {
        for jt in [
            JobType::FetchArtist,
            JobType::FetchArtistAlbums,
            JobType::FetchRelease,
            JobType::FetchAlbumFull,
            JobType::ArtistFull,
            JobType::FetchArtistText,
            JobType::FetchAlbumText,
            JobType::FetchArtistImages,
            JobType::FetchAlbumImages,
            JobType::DownloadImage,
        ] {
            let parsed: JobType = jt.as_str().parse().unwrap();
            assert_eq!(parsed, jt);
        }
    }

    #[test]
    fn pool_assignment_matches_the_worker_pool_table() {
        assert_eq!(JobType::FetchArtist.pool(), WorkerPool::Canonical);
        assert_eq!(JobType::FetchArtistText.pool(), WorkerPool::Text);
        assert_eq!(JobType::FetchArtistImages.pool(), WorkerPool::ArtworkUrl);
        assert_eq!(JobType::DownloadImage.pool(), WorkerPool::ArtworkBinary);
    }

    #[test]
    fn metadata_job_type_matches_its_own_variant() {
        let meta = JobMetadata::FetchArtist {
            artist_id: ArtistId::new(),
        };
        assert_eq!(meta.job_type(), JobType::FetchArtist);
    }
}
