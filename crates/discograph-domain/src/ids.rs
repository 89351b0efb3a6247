//! Opaque identifiers for every stored entity.
//!
//! Upstream-assigned entities (Artist, ReleaseGroup, Release, Recording,
//! Track) carry an MBID: a 36-character UUID-formatted identifier minted by
//! the canonical provider. Locally-originated rows (Link, Image, Job,
//! BulkRefresh, the ArtistReleaseGroup join) get a UUID generated on insert.
//! Both are represented the same way so the store can treat every id as a
//! `Uuid` on the wire, but the distinct wrapper types keep an artist id from
//! being passed where a release id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

entity_id!(ArtistId);
entity_id!(ReleaseGroupId);
entity_id!(ReleaseId);
entity_id!(RecordingId);
entity_id!(TrackId);
entity_id!(ArtistReleaseGroupId);
entity_id!(LinkId);
entity_id!(ImageId);
entity_id!(JobId);
entity_id!(BulkRefreshId);

/// Tags which table an `entity_id` column on `Link`, `Image`, or `Job` points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Artist,
    ReleaseGroup,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::ReleaseGroup => "release_group",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = InvalidEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(Self::Artist),
            "release_group" => Ok(Self::ReleaseGroup),
            other => Err(InvalidEntityType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid entity_type: {0}")]
pub struct InvalidEntityType(pub String);
