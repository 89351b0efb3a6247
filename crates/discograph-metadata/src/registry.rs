//! Capability-tagged adapter traits for the text and artwork-url pools.
//!
//! Each provider implements only the capability its data actually supports;
//! a provider that has nothing to say for a given lookup returns `Ok(None)`
//! (text) or `Ok(vec![])` (artwork) rather than failing.

use async_trait::async_trait;
use discograph_domain::CoverType;

use crate::cover_art_fallback::CoverArtFallbackClient;
use crate::discogs::DiscogsClient;
use crate::error::{AdapterError, Result};
use crate::fanarttv::FanartTvClient;
use crate::lastfm::LastFmClient;

/// `getArtistText` / `getAlbumText`: encyclopedic prose for the `overview` column.
#[async_trait]
pub trait TextAdapter: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn get_artist_text(&self, artist_name: &str) -> Result<Option<String>>;

    async fn get_album_text(&self, artist_name: &str, album_name: &str) -> Result<Option<String>>;
}

/// `artistImages` / `albumImages`: candidate artwork URLs, not yet downloaded.
#[async_trait]
pub trait ArtworkAdapter: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn artist_images(&self, artist_mbid: &str) -> Result<Vec<(CoverType, String)>>;

    async fn album_images(&self, release_group_mbid: &str) -> Result<Vec<(CoverType, String)>>;
}

#[async_trait]
impl TextAdapter for LastFmClient {
    fn provider_name(&self) -> &'static str {
        "lastfm"
    }

    async fn get_artist_text(&self, artist_name: &str) -> Result<Option<String>> {
        match self.fetch_artist_metadata(artist_name).await {
            Ok(metadata) => Ok(metadata.bio),
            Err(err) => Err(AdapterError::from(err)),
        }
    }

    async fn get_album_text(&self, _artist_name: &str, _album_name: &str) -> Result<Option<String>> {
        // Last.fm's album.getinfo payload carries no free-text summary in this service.
        Ok(None)
    }
}

#[async_trait]
impl TextAdapter for DiscogsClient {
    fn provider_name(&self) -> &'static str {
        "discogs"
    }

    async fn get_artist_text(&self, artist_name: &str) -> Result<Option<String>> {
        match self.fetch_artist_metadata(artist_name).await {
            Ok(metadata) => Ok(metadata.profile),
            Err(err) => Err(AdapterError::from(err)),
        }
    }

    async fn get_album_text(&self, _artist_name: &str, _album_name: &str) -> Result<Option<String>> {
        // Discogs releases carry genres/styles but no free-text overview.
        Ok(None)
    }
}

#[async_trait]
impl ArtworkAdapter for FanartTvClient {
    fn provider_name(&self) -> &'static str {
        "fanarttv"
    }

    async fn artist_images(&self, artist_mbid: &str) -> Result<Vec<(CoverType, String)>> {
        let artwork = self
            .fetch_artist_artwork(artist_mbid)
            .await
            .map_err(AdapterError::from)?;

        let mut images = Vec::new();
        images.extend(artwork.thumbs.into_iter().map(|i| (CoverType::Thumb, i.url)));
        images.extend(
            artwork
                .backgrounds
                .into_iter()
                .map(|i| (CoverType::Fanart, i.url)),
        );
        images.extend(artwork.logos.into_iter().map(|i| (CoverType::Logo, i.url)));
        Ok(images)
    }

    async fn album_images(&self, release_group_mbid: &str) -> Result<Vec<(CoverType, String)>> {
        let artwork = self
            .fetch_album_artwork(release_group_mbid)
            .await
            .map_err(AdapterError::from)?;

        let mut images = Vec::new();
        images.extend(artwork.covers.into_iter().map(|i| (CoverType::Cover, i.url)));
        images.extend(artwork.cdarts.into_iter().map(|i| (CoverType::Disc, i.url)));
        Ok(images)
    }
}

#[async_trait]
impl ArtworkAdapter for CoverArtFallbackClient {
    fn provider_name(&self) -> &'static str {
        "cover-art-fallback"
    }

    async fn artist_images(&self, _artist_mbid: &str) -> Result<Vec<(CoverType, String)>> {
        // This adapter only chases release-group cover art; it has no artist fallback.
        Ok(Vec::new())
    }

    async fn album_images(&self, release_group_mbid: &str) -> Result<Vec<(CoverType, String)>> {
        match self.fetch_album_cover(release_group_mbid).await {
            Ok(result) => Ok(vec![(CoverType::Cover, result.image_url)]),
            Err(err) => Err(AdapterError::from(err)),
        }
    }
}
