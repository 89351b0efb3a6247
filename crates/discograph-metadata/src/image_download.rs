//! The artwork-binary pool's one job: turn an `Image` row's upstream `url`
//! into a file under `<images_dir>/<entity_type>/<id>/<cover_type>.<ext>`
//! and hand back the path to record as `local_path`. No provider-specific
//! logic lives here — by the time a row reaches this client its URL has
//! already been chosen by a `TextAdapter`/`ArtworkAdapter`.

use std::path::{Path, PathBuf};

use discograph_domain::Image;
use reqwest::Client;
use tracing::instrument;

use crate::error::AdapterError;

/// Content types this provider accepts; anything else is a permanent failure
/// rather than a retry, since a retried fetch would return the same body.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

pub struct ImageDownloader {
    client: Client,
    images_dir: PathBuf,
}

impl ImageDownloader {
    pub fn new(images_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            images_dir: images_dir.into(),
        }
    }

    /// Fetches `image.url`, writes it under the configured image tree, and
    /// returns the path to store in `local_path` (relative to `images_dir`,
    /// matching how the serving endpoint resolves it back into a full path).
    #[instrument(skip(self, image), fields(image_id = %image.id.0, url = %image.url))]
    pub async fn download(&self, image: &Image) -> Result<String, AdapterError> {
        let response = self.client.get(&image.url).send().await?;
        if !response.status().is_success() {
            return Err(AdapterError::from_status(
                response.status(),
                format!("fetching {}", image.url),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let extension = extension_for(&content_type)
            .ok_or_else(|| AdapterError::Permanent(format!("unsupported content type: {content_type}")))?;

        let bytes = response.bytes().await?;

        let relative_path = Path::new(image.entity_type.as_str())
            .join(image.entity_id.to_string())
            .join(format!("{}.{extension}", image.cover_type.as_str()));
        let full_path = self.images_dir.join(&relative_path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AdapterError::Permanent(format!("creating {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&full_path, &bytes)
            .await
            .map_err(|e| AdapterError::Permanent(format!("writing {}: {e}", full_path.display())))?;

        Ok(relative_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_content_types_map_to_the_jpg_extension() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/jpeg; charset=binary"), Some("jpg"));
    }

    #[test]
    fn an_unrecognized_content_type_has_no_extension() {
        assert_eq!(extension_for("text/html"), None);
    }
}
