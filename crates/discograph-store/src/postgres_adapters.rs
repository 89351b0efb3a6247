// SPDX-License-Identifier: GPL-3.0-or-later
//! PostgreSQL-backed implementations of the store traits (§4.2).

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use discograph_domain::{
    Artist, ArtistCreditEntry, ArtistId, ArtistReleaseGroup, ArtistReleaseGroupId, ArtistType,
    BulkRefresh, BulkRefreshId, BulkRefreshStatus, CoverType, EntityType, Image, ImageId,
    ImageProvider, Label, Link, LinkId, LinkType, Medium, Rating, Recording, RecordingId, Release,
    ReleaseGroup, ReleaseGroupId, ReleaseId, ReleaseStatus, Track, TrackId,
};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::repositories::{
    ArtistStore, BulkRefreshStore, ImageStore, LinkStore, ReleaseGroupStore, ReleaseStore,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn artist_type_to_str(t: ArtistType) -> &'static str {
    match t {
        ArtistType::Person => "person",
        ArtistType::Group => "group",
        ArtistType::Orchestra => "orchestra",
        ArtistType::Choir => "choir",
        ArtistType::Character => "character",
        ArtistType::Other => "other",
    }
}

fn artist_type_from_str(s: &str) -> Option<ArtistType> {
    match s {
        "person" => Some(ArtistType::Person),
        "group" => Some(ArtistType::Group),
        "orchestra" => Some(ArtistType::Orchestra),
        "choir" => Some(ArtistType::Choir),
        "character" => Some(ArtistType::Character),
        "other" => Some(ArtistType::Other),
        _ => None,
    }
}

fn release_status_from_str(s: &str) -> Option<ReleaseStatus> {
    match s {
        "Official" => Some(ReleaseStatus::Official),
        "Promotion" => Some(ReleaseStatus::Promotion),
        "Bootleg" => Some(ReleaseStatus::Bootleg),
        "Pseudo-Release" => Some(ReleaseStatus::PseudoRelease),
        _ => None,
    }
}

fn link_type_to_str(t: LinkType) -> &'static str {
    match t {
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

fn link_type_from_str(s: &str) -> LinkType {
    match s {
        "official" => LinkType::Official,
        "wikipedia" => LinkType::Wikipedia,
        "discogs" => LinkType::Discogs,
        "bandcamp" => LinkType::Bandcamp,
        "soundcloud" => LinkType::Soundcloud,
        "youtube" => LinkType::Youtube,
        "lastfm" => LinkType::Lastfm,
        _ => LinkType::Other,
    }
}

fn cover_type_from_str(s: &str) -> CoverType {
    match s {
        "Poster" => CoverType::Poster,
        "Banner" => CoverType::Banner,
        "Fanart" => CoverType::Fanart,
        "Logo" => CoverType::Logo,
        "Clearart" => CoverType::Clearart,
        "Thumb" => CoverType::Thumb,
        "Disc" => CoverType::Disc,
        _ => CoverType::Cover,
    }
}

fn image_provider_to_str(p: ImageProvider) -> &'static str {
    match p {
        ImageProvider::FanartTv => "fanart_tv",
        ImageProvider::CoverArtArchive => "cover_art_archive",
        ImageProvider::Discogs => "discogs",
        ImageProvider::UserUpload => "user_upload",
    }
}

fn image_provider_from_str(s: &str) -> ImageProvider {
    match s {
        "fanart_tv" => ImageProvider::FanartTv,
        "cover_art_archive" => ImageProvider::CoverArtArchive,
        "discogs" => ImageProvider::Discogs,
        _ => ImageProvider::UserUpload,
    }
}

fn row_to_artist(row: &sqlx::postgres::PgRow) -> Result<Artist> {
    let rating_count: i32 = row.try_get("rating_count")?;
    let rating_value: Option<f32> = row.try_get("rating_value")?;
    Ok(Artist {
        id: ArtistId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        sort_name: row.try_get("sort_name")?,
        disambiguation: row.try_get("disambiguation")?,
        artist_type: row
            .try_get::<Option<String>, _>("artist_type")?
            .and_then(|s| artist_type_from_str(&s)),
        country: row.try_get("country")?,
        begin_date: row.try_get::<Option<NaiveDate>, _>("begin_date")?,
        end_date: row.try_get::<Option<NaiveDate>, _>("end_date")?,
        gender: row.try_get("gender")?,
        ended: row.try_get("ended")?,
        aliases: row.try_get("aliases")?,
        tags: row.try_get("tags")?,
        genres: row.try_get("genres")?,
        rating: Some(Rating {
            count: rating_count.max(0) as u32,
            value: rating_value,
        }),
        overview: row.try_get("overview")?,
        access_count: row.try_get("access_count")?,
        last_accessed_at: row.try_get("last_accessed_at")?,
        last_updated_at: row.try_get("last_updated_at")?,
        ttl_expires_at: row.try_get("ttl_expires_at")?,
        fetch_complete: row.try_get("fetch_complete")?,
        releases_fetched_count: row.try_get("releases_fetched_count")?,
        last_fetch_attempt: row.try_get("last_fetch_attempt")?,
    })
}

#[async_trait::async_trait]
impl ArtistStore for PgStore {
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>> {
        let row = sqlx::query("SELECT * FROM artists WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_artist).transpose()
    }

    async fn get_artists(&self, ids: &[ArtistId]) -> Result<Vec<Artist>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query("SELECT * FROM artists WHERE id = ANY($1)")
            .bind(&ids[..])
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_artist).collect()
    }

    async fn upsert_artist(&self, artist: &Artist, is_full_data: bool) -> Result<()> {
        debug!(target: "store", artist_id = %artist.id, is_full_data, "upserting artist");
        let rating = artist.rating.clone().unwrap_or_else(Rating::unrated);
        sqlx::query(
            r#"
            INSERT INTO artists (
                id, name, sort_name, disambiguation, artist_type, country,
                begin_date, end_date, gender, ended, aliases, tags, genres,
                rating_count, rating_value, overview, last_updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, now())
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                sort_name = EXCLUDED.sort_name,
                disambiguation = EXCLUDED.disambiguation,
                artist_type = EXCLUDED.artist_type,
                country = EXCLUDED.country,
                begin_date = EXCLUDED.begin_date,
                end_date = EXCLUDED.end_date,
                gender = EXCLUDED.gender,
                ended = EXCLUDED.ended,
                aliases = EXCLUDED.aliases,
                tags = EXCLUDED.tags,
                genres = EXCLUDED.genres,
                rating_count = EXCLUDED.rating_count,
                rating_value = EXCLUDED.rating_value,
                overview = CASE WHEN $17 THEN EXCLUDED.overview ELSE artists.overview END,
                last_updated_at = now()
            "#,
        )
        .bind(artist.id.0)
        .bind(&artist.name)
        .bind(&artist.sort_name)
        .bind(&artist.disambiguation)
        .bind(artist.artist_type.map(artist_type_to_str))
        .bind(&artist.country)
        .bind(artist.begin_date)
        .bind(artist.end_date)
        .bind(&artist.gender)
        .bind(artist.ended)
        .bind(&artist.aliases)
        .bind(&artist.tags)
        .bind(&artist.genres)
        .bind(rating.count as i32)
        .bind(rating.value)
        .bind(&artist.overview)
        .bind(is_full_data)
        .execute(&self.pool)
        .await?;

        if is_full_data {
            sqlx::query("UPDATE artists SET fetch_complete = TRUE WHERE id = $1")
                .bind(artist.id.0)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn artist_needs_refresh(&self, artist: &Artist, ttl_days: i64) -> bool {
        !artist.fetch_complete || Utc::now() - artist.last_updated_at > Duration::days(ttl_days)
    }

    async fn touch_artist_access(&self, id: ArtistId) -> Result<()> {
        sqlx::query(
            "UPDATE artists SET access_count = access_count + 1, last_accessed_at = now() WHERE id = $1",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_artist_release_groups(&self, artist_id: ArtistId) -> Result<Vec<ArtistReleaseGroup>> {
        let rows = sqlx::query(
            "SELECT * FROM artist_release_groups WHERE artist_id = $1 ORDER BY position ASC",
        )
        .bind(artist_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| {
                Ok(ArtistReleaseGroup {
                    id: ArtistReleaseGroupId::from_uuid(r.try_get("id")?),
                    artist_id: ArtistId::from_uuid(r.try_get("artist_id")?),
                    release_group_id: ReleaseGroupId::from_uuid(r.try_get("release_group_id")?),
                    position: r.try_get("position")?,
                })
            })
            .collect()
    }

    async fn list_artist_ids(&self) -> Result<Vec<ArtistId>> {
        let rows = sqlx::query("SELECT id FROM artists").fetch_all(&self.pool).await?;
        rows.iter().map(|r| Ok(ArtistId::from_uuid(r.try_get("id")?))).collect()
    }

    async fn link_artist_to_release_group(
        &self,
        artist_id: ArtistId,
        release_group_id: ReleaseGroupId,
        position: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO artist_release_groups (id, artist_id, release_group_id, position)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (artist_id, release_group_id) DO UPDATE SET position = EXCLUDED.position
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(artist_id.0)
        .bind(release_group_id.0)
        .bind(position)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_release_group(row: &sqlx::postgres::PgRow) -> Result<ReleaseGroup> {
    let rating_count: i32 = row.try_get("rating_count")?;
    let rating_value: Option<f32> = row.try_get("rating_value")?;
    let artist_credit: Json<Vec<ArtistCreditEntry>> = row.try_get("artist_credit")?;
    Ok(ReleaseGroup {
        id: ReleaseGroupId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        disambiguation: row.try_get("disambiguation")?,
        primary_type: row.try_get("primary_type")?,
        secondary_types: row.try_get("secondary_types")?,
        first_release_date: row.try_get("first_release_date")?,
        artist_credit: artist_credit.0,
        aliases: row.try_get("aliases")?,
        tags: row.try_get("tags")?,
        genres: row.try_get("genres")?,
        rating: Some(Rating {
            count: rating_count.max(0) as u32,
            value: rating_value,
        }),
        overview: row.try_get("overview")?,
        access_count: row.try_get("access_count")?,
        last_accessed_at: row.try_get("last_accessed_at")?,
        last_updated_at: row.try_get("last_updated_at")?,
        ttl_expires_at: row.try_get("ttl_expires_at")?,
    })
}

#[async_trait::async_trait]
impl ReleaseGroupStore for PgStore {
    async fn get_release_group(&self, id: ReleaseGroupId) -> Result<Option<ReleaseGroup>> {
        let row = sqlx::query("SELECT * FROM release_groups WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_release_group).transpose()
    }

    async fn upsert_release_group(&self, rg: &ReleaseGroup) -> Result<()> {
        let rating = rg.rating.clone().unwrap_or_else(Rating::unrated);
        sqlx::query(
            r#"
            INSERT INTO release_groups (
                id, title, disambiguation, primary_type, secondary_types,
                first_release_date, artist_credit, aliases, tags, genres,
                rating_count, rating_value, overview, last_updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, now())
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                disambiguation = EXCLUDED.disambiguation,
                primary_type = EXCLUDED.primary_type,
                secondary_types = EXCLUDED.secondary_types,
                first_release_date = EXCLUDED.first_release_date,
                artist_credit = EXCLUDED.artist_credit,
                aliases = EXCLUDED.aliases,
                tags = EXCLUDED.tags,
                genres = EXCLUDED.genres,
                rating_count = EXCLUDED.rating_count,
                rating_value = EXCLUDED.rating_value,
                overview = COALESCE(EXCLUDED.overview, release_groups.overview),
                last_updated_at = now()
            "#,
        )
        .bind(rg.id.0)
        .bind(&rg.title)
        .bind(&rg.disambiguation)
        .bind(&rg.primary_type)
        .bind(&rg.secondary_types)
        .bind(rg.first_release_date)
        .bind(Json(&rg.artist_credit))
        .bind(&rg.aliases)
        .bind(&rg.tags)
        .bind(&rg.genres)
        .bind(rating.count as i32)
        .bind(rating.value)
        .bind(&rg.overview)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch_release_group_access(&self, id: ReleaseGroupId) -> Result<()> {
        sqlx::query(
            "UPDATE release_groups SET access_count = access_count + 1, last_accessed_at = now() WHERE id = $1",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_release(row: &sqlx::postgres::PgRow) -> Result<Release> {
    let labels: Json<Vec<Label>> = row.try_get("labels")?;
    let artist_credit: Json<Vec<ArtistCreditEntry>> = row.try_get("artist_credit")?;
    let media: Json<Vec<Medium>> = row.try_get("media")?;
    Ok(Release {
        id: ReleaseId::from_uuid(row.try_get("id")?),
        release_group_id: ReleaseGroupId::from_uuid(row.try_get("release_group_id")?),
        title: row.try_get("title")?,
        disambiguation: row.try_get("disambiguation")?,
        status: row
            .try_get::<Option<String>, _>("status")?
            .and_then(|s| release_status_from_str(&s)),
        release_date: row.try_get("release_date")?,
        country: row.try_get("country")?,
        barcode: row.try_get("barcode")?,
        labels: labels.0,
        artist_credit: artist_credit.0,
        media_count: row.try_get("media_count")?,
        track_count: row.try_get("track_count")?,
        media: media.0,
    })
}

#[async_trait::async_trait]
impl ReleaseStore for PgStore {
    async fn get_release(&self, id: ReleaseId) -> Result<Option<Release>> {
        let row = sqlx::query("SELECT * FROM releases WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_release).transpose()
    }

    async fn list_releases_by_release_group(&self, release_group_id: ReleaseGroupId) -> Result<Vec<Release>> {
        let rows = sqlx::query("SELECT * FROM releases WHERE release_group_id = $1")
            .bind(release_group_id.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_release).collect()
    }

    async fn upsert_release(&self, release: &Release) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO releases (
                id, release_group_id, title, disambiguation, status, release_date,
                country, barcode, labels, artist_credit, media_count, track_count, media
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                disambiguation = EXCLUDED.disambiguation,
                status = EXCLUDED.status,
                release_date = EXCLUDED.release_date,
                country = EXCLUDED.country,
                barcode = EXCLUDED.barcode,
                labels = EXCLUDED.labels,
                artist_credit = EXCLUDED.artist_credit,
                media_count = EXCLUDED.media_count,
                track_count = EXCLUDED.track_count,
                media = EXCLUDED.media
            "#,
        )
        .bind(release.id.0)
        .bind(release.release_group_id.0)
        .bind(&release.title)
        .bind(&release.disambiguation)
        .bind(release.status.map(|s| s.as_str()))
        .bind(release.release_date)
        .bind(&release.country)
        .bind(&release.barcode)
        .bind(Json(&release.labels))
        .bind(Json(&release.artist_credit))
        .bind(release.media_count)
        .bind(release.track_count)
        .bind(Json(&release.media))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_recording(&self, recording: &Recording) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO recordings (id, title, disambiguation, length_ms)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                disambiguation = EXCLUDED.disambiguation,
                length_ms = EXCLUDED.length_ms
            "#,
        )
        .bind(recording.id.0)
        .bind(&recording.title)
        .bind(&recording.disambiguation)
        .bind(recording.length_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_track(&self, track: &Track) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tracks (
                id, release_id, recording_id, medium_number, position, title,
                length_ms, artist_credit
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                medium_number = EXCLUDED.medium_number,
                position = EXCLUDED.position,
                title = EXCLUDED.title,
                length_ms = EXCLUDED.length_ms,
                artist_credit = EXCLUDED.artist_credit
            "#,
        )
        .bind(track.id.0)
        .bind(track.release_id.0)
        .bind(track.recording_id.0)
        .bind(track.medium_number)
        .bind(track.position)
        .bind(&track.title)
        .bind(track.length_ms)
        .bind(Json(&track.artist_credit))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recording(&self, id: RecordingId) -> Result<Option<Recording>> {
        let row = sqlx::query("SELECT * FROM recordings WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| {
            Ok(Recording {
                id: RecordingId::from_uuid(r.try_get("id")?),
                title: r.try_get("title")?,
                disambiguation: r.try_get("disambiguation")?,
                length_ms: r.try_get("length_ms")?,
            })
        })
        .transpose()
    }
}

fn row_to_link(row: &sqlx::postgres::PgRow) -> Result<Link> {
    let entity_type: String = row.try_get("entity_type")?;
    Ok(Link {
        id: LinkId::from_uuid(row.try_get("id")?),
        entity_type: entity_type.parse().map_err(|e: discograph_domain::InvalidEntityType| anyhow!(e))?,
        entity_id: row.try_get("entity_id")?,
        link_type: link_type_from_str(&row.try_get::<String, _>("link_type")?),
        url: row.try_get("url")?,
    })
}

#[async_trait::async_trait]
impl LinkStore for PgStore {
    async fn upsert_link(&self, link: &Link) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO links (id, entity_type, entity_id, link_type, url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (entity_id, link_type, url) DO NOTHING
            "#,
        )
        .bind(link.id.0)
        .bind(link.entity_type.as_str())
        .bind(link.entity_id)
        .bind(link_type_to_str(link.link_type))
        .bind(&link.url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_links(&self, entity_type: EntityType, entity_id: uuid::Uuid) -> Result<Vec<Link>> {
        let rows = sqlx::query("SELECT * FROM links WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type.as_str())
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_link).collect()
    }

    async fn list_links_for_entities(&self, entity_type: EntityType, entity_ids: &[uuid::Uuid]) -> Result<Vec<Link>> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query("SELECT * FROM links WHERE entity_type = $1 AND entity_id = ANY($2)")
            .bind(entity_type.as_str())
            .bind(entity_ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_link).collect()
    }
}

fn row_to_image(row: &sqlx::postgres::PgRow) -> Result<Image> {
    let entity_type: String = row.try_get("entity_type")?;
    Ok(Image {
        id: ImageId::from_uuid(row.try_get("id")?),
        entity_type: entity_type.parse().map_err(|e: discograph_domain::InvalidEntityType| anyhow!(e))?,
        entity_id: row.try_get("entity_id")?,
        cover_type: cover_type_from_str(&row.try_get::<String, _>("cover_type")?),
        provider: image_provider_from_str(&row.try_get::<String, _>("provider")?),
        url: row.try_get("url")?,
        local_path: row.try_get("local_path")?,
        cached: row.try_get("cached")?,
        cache_failed: row.try_get("cache_failed")?,
        cache_failed_reason: row.try_get("cache_failed_reason")?,
        user_uploaded: row.try_get("user_uploaded")?,
        last_verified_at: row.try_get::<Option<DateTime<Utc>>, _>("last_verified_at")?,
        cached_at: row.try_get("cached_at")?,
    })
}

#[async_trait::async_trait]
impl ImageStore for PgStore {
    async fn upsert_image_url(&self, image: &Image) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO images (
                id, entity_type, entity_id, cover_type, provider, url,
                user_uploaded, last_verified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            ON CONFLICT (entity_id, cover_type, provider) DO UPDATE SET
                url = EXCLUDED.url,
                last_verified_at = now(),
                cached = CASE WHEN EXCLUDED.url <> images.url THEN FALSE ELSE images.cached END,
                local_path = CASE WHEN EXCLUDED.url <> images.url THEN NULL ELSE images.local_path END,
                cache_failed = CASE WHEN EXCLUDED.url <> images.url THEN FALSE ELSE images.cache_failed END,
                cache_failed_reason = CASE WHEN EXCLUDED.url <> images.url THEN NULL ELSE images.cache_failed_reason END
            "#,
        )
        .bind(image.id.0)
        .bind(image.entity_type.as_str())
        .bind(image.entity_id)
        .bind(image.cover_type.as_str())
        .bind(image_provider_to_str(image.provider))
        .bind(&image.url)
        .bind(image.user_uploaded)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_image_cached(&self, id: ImageId, local_path: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE images SET
                cached = TRUE, cache_failed = FALSE, cache_failed_reason = NULL,
                local_path = $2, cached_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(local_path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_image_failed(&self, id: ImageId, reason: &str) -> Result<()> {
        sqlx::query(
            "UPDATE images SET cache_failed = TRUE, cache_failed_reason = $2 WHERE id = $1",
        )
        .bind(id.0)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_images(&self, entity_type: EntityType, entity_id: uuid::Uuid) -> Result<Vec<Image>> {
        let rows = sqlx::query("SELECT * FROM images WHERE entity_type = $1 AND entity_id = $2")
            .bind(entity_type.as_str())
            .bind(entity_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_image).collect()
    }

    async fn list_images_for_entities(&self, entity_type: EntityType, entity_ids: &[uuid::Uuid]) -> Result<Vec<Image>> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query("SELECT * FROM images WHERE entity_type = $1 AND entity_id = ANY($2)")
            .bind(entity_type.as_str())
            .bind(entity_ids)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_image).collect()
    }

    async fn next_pending_download(&self) -> Result<Option<Image>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM images
            WHERE cached = FALSE AND cache_failed = FALSE
            ORDER BY (entity_type = 'artist') DESC, last_verified_at ASC NULLS FIRST
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_image).transpose()
    }

    async fn delete_image(&self, id: ImageId) -> Result<()> {
        sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn row_to_bulk_refresh(row: &sqlx::postgres::PgRow) -> Result<BulkRefresh> {
    let status: String = row.try_get("status")?;
    Ok(BulkRefresh {
        id: BulkRefreshId::from_uuid(row.try_get("id")?),
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        status: match status.as_str() {
            "running" => BulkRefreshStatus::Running,
            "completed" => BulkRefreshStatus::Completed,
            _ => BulkRefreshStatus::Failed,
        },
        artists_refreshed: row.try_get("artists_refreshed")?,
    })
}

#[async_trait::async_trait]
impl BulkRefreshStore for PgStore {
    async fn start_bulk_refresh(&self) -> Result<BulkRefresh> {
        let row = sqlx::query(
            "INSERT INTO bulk_refreshes (id, status) VALUES ($1, 'running') RETURNING *",
        )
        .bind(uuid::Uuid::new_v4())
        .fetch_one(&self.pool)
        .await?;
        row_to_bulk_refresh(&row)
    }

    async fn complete_bulk_refresh(&self, id: BulkRefreshId, artists_refreshed: i32) -> Result<()> {
        sqlx::query(
            "UPDATE bulk_refreshes SET status = 'completed', completed_at = now(), artists_refreshed = $2 WHERE id = $1",
        )
        .bind(id.0)
        .bind(artists_refreshed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail_bulk_refresh(&self, id: BulkRefreshId) -> Result<()> {
        sqlx::query("UPDATE bulk_refreshes SET status = 'failed', completed_at = now() WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
