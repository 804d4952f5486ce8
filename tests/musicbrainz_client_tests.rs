//! Tests for the MusicBrainz client against a mock web service.

use album_catalog_server::metadata::{MetadataProvider, MusicBrainzClient, MusicBrainzConfig};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BARCODE: &str = "0077774644129";

fn make_client(mock_server: &MockServer) -> MusicBrainzClient {
    MusicBrainzClient::new(&MusicBrainzConfig {
        base_url: mock_server.uri(),
        user_agent: "AlbumCatalogTests/1.0".to_string(),
        timeout_sec: 1,
    })
    .expect("Failed to create client")
}

#[tokio::test]
async fn test_search_sends_barcode_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .and(query_param("query", format!("barcode:{}", BARCODE)))
        .and(query_param("fmt", "json"))
        .and(query_param("limit", "1"))
        .and(header("user-agent", "AlbumCatalogTests/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "releases": [{
                "id": "b84ee12a-09ef-421b-82de-0441a926375b",
                "title": "Abbey Road",
                "date": "1969-09-26",
                "artist-credit": [{ "name": "The Beatles" }],
                "genres": [{ "name": "rock" }]
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server);
    let result = client
        .search_by_barcode(BARCODE)
        .await
        .expect("Expected a match");

    assert_eq!(result.id, "b84ee12a-09ef-421b-82de-0441a926375b");
    assert_eq!(result.title.as_deref(), Some("Abbey Road"));
    assert_eq!(result.artist, "The Beatles");
    assert_eq!(result.year, Some(1969));
    assert_eq!(result.genre, "rock");
    assert_eq!(result.barcode, BARCODE);
}

#[tokio::test]
async fn test_multiple_artist_credits_are_joined() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "releases": [{
                "id": "r-1",
                "title": "Bridge over Troubled Water",
                "artist-credit": [
                    { "name": "Simon", "joinphrase": " & " },
                    { "name": "Garfunkel" }
                ]
            }]
        })))
        .mount(&mock_server)
        .await;

    let result = make_client(&mock_server)
        .search_by_barcode(BARCODE)
        .await
        .unwrap();

    assert_eq!(result.artist, "Simon, Garfunkel");
    assert_eq!(result.genre, "Unknown");
    assert_eq!(result.year, None);
}

#[tokio::test]
async fn test_zero_releases_is_a_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "releases": [] })),
        )
        .mount(&mock_server)
        .await;

    assert!(make_client(&mock_server)
        .search_by_barcode(BARCODE)
        .await
        .is_none());
}

#[tokio::test]
async fn test_error_status_is_a_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    assert!(make_client(&mock_server)
        .search_by_barcode(BARCODE)
        .await
        .is_none());
}

#[tokio::test]
async fn test_malformed_body_is_a_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    assert!(make_client(&mock_server)
        .search_by_barcode(BARCODE)
        .await
        .is_none());
}

#[tokio::test]
async fn test_slow_response_is_a_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/release"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "releases": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    assert!(make_client(&mock_server)
        .search_by_barcode(BARCODE)
        .await
        .is_none());
}

#[tokio::test]
async fn test_no_requests_after_shutdown() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "releases": [] })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = make_client(&mock_server);
    client.shutdown();

    assert!(client.search_by_barcode(BARCODE).await.is_none());
}
