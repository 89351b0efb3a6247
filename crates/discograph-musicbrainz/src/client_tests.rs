// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{AdapterError, CanonicalAdapter, MusicBrainzClient};
    use discograph_domain::ArtistId;
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RADIOHEAD_MBID: &str = "a74b1b7f-71a5-4011-9441-d0b5e4122711";

    fn artist_search_response() -> serde_json::Value {
        serde_json::json!({
            "created": "2026-01-08T12:00:00.000Z",
            "count": 1,
            "offset": 0,
            "artists": [{
                "id": RADIOHEAD_MBID,
                "name": "Radiohead",
                "sort-name": "Radiohead",
                "type": "Group",
                "country": "GB",
                "disambiguation": "",
                "score": 100
            }]
        })
    }

    fn artist_lookup_response() -> serde_json::Value {
        serde_json::json!({
            "id": RADIOHEAD_MBID,
            "name": "Radiohead",
            "sort-name": "Radiohead",
            "type": "Group",
            "country": "GB",
            "life-span": { "begin": "1985", "end": null, "ended": false }
        })
    }

    fn quick_client(base_url: String) -> MusicBrainzClient {
        MusicBrainzClient::builder()
            .base_url(base_url)
            .rate_limit_interval(Duration::from_millis(0))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn search_artist_normalizes_the_wire_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artist"))
            .and(query_param("query", "Radiohead"))
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_search_response()))
            .mount(&mock_server)
            .await;

        let client = quick_client(mock_server.uri());
        let artists = client.search_artist("Radiohead").await.unwrap();

        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name, "Radiohead");
        assert_eq!(artists[0].id, ArtistId::from_uuid(Uuid::parse_str(RADIOHEAD_MBID).unwrap()));
        assert_eq!(artists[0].country, Some("GB".to_string()));
    }

    #[tokio::test]
    async fn get_artist_pads_a_partial_begin_date() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artist/{}", RADIOHEAD_MBID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_lookup_response()))
            .mount(&mock_server)
            .await;

        let client = quick_client(mock_server.uri());
        let id = ArtistId::from_uuid(Uuid::parse_str(RADIOHEAD_MBID).unwrap());
        let artist = client.get_artist(id).await.unwrap();

        assert_eq!(artist.name, "Radiohead");
        assert_eq!(
            artist.begin_date,
            chrono::NaiveDate::from_ymd_opt(1985, 1, 1)
        );
        assert!(!artist.ended);
    }

    #[tokio::test]
    async fn a_404_is_reported_as_not_found_and_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artist/{}", RADIOHEAD_MBID)))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = quick_client(mock_server.uri());
        let id = ArtistId::from_uuid(Uuid::parse_str(RADIOHEAD_MBID).unwrap());
        let result = client.get_artist(id).await;

        assert!(matches!(result.unwrap_err(), AdapterError::NotFound(_)));
    }

    #[tokio::test]
    async fn a_403_is_reported_as_forbidden() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artist/{}", RADIOHEAD_MBID)))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let client = quick_client(mock_server.uri());
        let id = ArtistId::from_uuid(Uuid::parse_str(RADIOHEAD_MBID).unwrap());
        let result = client.get_artist(id).await;

        assert!(matches!(result.unwrap_err(), AdapterError::Forbidden(_)));
    }
}
