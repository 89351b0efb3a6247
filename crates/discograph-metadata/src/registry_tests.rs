#[cfg(test)]
mod tests {
    use crate::error::AdapterError;
    use crate::fanarttv::FanartTvClient;
    use crate::lastfm::LastFmClient;
    use crate::registry::{ArtworkAdapter, TextAdapter};
    use discograph_domain::CoverType;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn lastfm_get_artist_text_returns_the_bio() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Radiohead",
                "bio": "An English rock band formed in Abingdon.",
                "tags": ["alternative rock"]
            })))
            .mount(&mock_server)
            .await;

        let client = LastFmClient::new("key".to_string(), Some(mock_server.uri()));
        let text = client.get_artist_text("Radiohead").await.unwrap();

        assert_eq!(
            text.as_deref(),
            Some("An English rock band formed in Abingdon.")
        );
    }

    #[tokio::test]
    async fn lastfm_get_album_text_has_no_capability_and_returns_none() {
        let client = LastFmClient::new("key".to_string(), None);
        let text = client.get_album_text("Radiohead", "OK Computer").await.unwrap();
        assert_eq!(text, None);
    }

    #[tokio::test]
    async fn fanarttv_artist_images_maps_categories_to_cover_types() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/music/mbid-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artistthumb": [{"url": "https://example.test/thumb.jpg", "likes": "3"}],
                "artistbackground": [{"url": "https://example.test/bg.jpg", "likes": "1"}],
                "hdmusiclogo": [{"url": "https://example.test/logo.png", "likes": "0"}]
            })))
            .mount(&mock_server)
            .await;

        let client = FanartTvClient::new("key".to_string(), None, Some(mock_server.uri()));
        let images = client.artist_images("mbid-123").await.unwrap();

        assert!(images.contains(&(CoverType::Thumb, "https://example.test/thumb.jpg".to_string())));
        assert!(images.contains(&(CoverType::Fanart, "https://example.test/bg.jpg".to_string())));
        assert!(images.contains(&(CoverType::Logo, "https://example.test/logo.png".to_string())));
    }

    #[tokio::test]
    async fn fanarttv_a_404_becomes_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/music/mbid-404"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&mock_server)
            .await;

        let client = FanartTvClient::new("key".to_string(), None, Some(mock_server.uri()));
        let result = client.artist_images("mbid-404").await;

        assert!(matches!(result.unwrap_err(), AdapterError::NotFound(_)));
    }
}
