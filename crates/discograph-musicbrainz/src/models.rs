// SPDX-License-Identifier: GPL-3.0-or-later
//! Wire shapes for the MusicBrainz JSON API. These mirror upstream field
//! names and casing exactly; `client.rs` converts them into
//! `discograph_domain` entities before returning anything to a caller, per
//! the normalization contract (§4.1) — provider-native field names never
//! escape this crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct WireArtistRef {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "sort-name", default)]
    pub sort_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireArtistCredit {
    pub name: String,
    pub artist: WireArtistRef,
    #[serde(default)]
    pub joinphrase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireArtist {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "sort-name")]
    pub sort_name: String,
    #[serde(default)]
    pub disambiguation: Option<String>,
    #[serde(rename = "type", default)]
    pub artist_type: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    #[serde(rename = "life-span", default)]
    pub life_span: Option<WireLifeSpan>,
    #[serde(default)]
    pub aliases: Vec<WireAlias>,
    #[serde(default)]
    pub tags: Vec<WireTag>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLifeSpan {
    pub begin: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub ended: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAlias {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReleaseGroup {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub disambiguation: Option<String>,
    #[serde(rename = "primary-type", default)]
    pub primary_type: Option<String>,
    #[serde(rename = "secondary-types", default)]
    pub secondary_types: Vec<String>,
    #[serde(rename = "first-release-date", default)]
    pub first_release_date: Option<String>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<WireArtistCredit>,
    #[serde(default)]
    pub score: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLabelInfo {
    pub label: Option<WireLabel>,
    #[serde(rename = "catalog-number", default)]
    pub catalog_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTrack {
    pub id: Uuid,
    pub position: i32,
    pub title: String,
    pub length: Option<i32>,
    pub recording: WireRecording,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<WireArtistCredit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRecording {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub disambiguation: Option<String>,
    pub length: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMedium {
    pub position: i32,
    pub format: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tracks: Vec<WireTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireRelease {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub disambiguation: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    pub country: Option<String>,
    pub barcode: Option<String>,
    #[serde(rename = "label-info", default)]
    pub label_info: Vec<WireLabelInfo>,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<WireArtistCredit>,
    #[serde(default)]
    pub media: Vec<WireMedium>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSearchResponse<T> {
    pub count: u32,
    pub offset: u32,
    #[serde(flatten)]
    pub results: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireArtistSearchResults {
    pub artists: Vec<WireArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReleaseGroupBrowse {
    #[serde(rename = "release-groups")]
    pub release_groups: Vec<WireReleaseGroup>,
    pub count: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReleaseBrowse {
    pub releases: Vec<WireRelease>,
    pub count: u32,
    pub offset: u32,
}

/// A page of results plus whether more remain, for the paginated capabilities
/// (`getArtistAlbums`, `getReleasesByReleaseGroup`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
    pub offset: u32,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() as u32 < self.total
    }
}
