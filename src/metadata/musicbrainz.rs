//! MusicBrainz client resolving barcodes to releases.

use super::{MetadataProvider, MetadataResult};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";
pub const DEFAULT_USER_AGENT: &str = "AlbumCatalog/1.0 ( https://musicbrainz.org/doc/MusicBrainz_API )";
pub const DEFAULT_TIMEOUT_SEC: u64 = 10;

const COVER_ART_ARCHIVE_BASE: &str = "https://coverartarchive.org";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_sec: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        MusicBrainzConfig {
            base_url: MUSICBRAINZ_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("MusicBrainz responded with status {0}")]
    Status(StatusCode),

    #[error("unparseable response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("client has been shut down")]
    ShutDown,
}

#[derive(Deserialize)]
struct ReleaseSearchResponse {
    #[serde(default)]
    releases: Vec<MbRelease>,
}

#[derive(Deserialize)]
struct MbRelease {
    id: Option<String>,
    title: Option<String>,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<MbArtistCredit>,
    date: Option<String>,
    #[serde(default)]
    genres: Vec<MbGenre>,
}

#[derive(Deserialize)]
struct MbArtistCredit {
    name: Option<String>,
    artist: Option<MbArtist>,
}

#[derive(Deserialize)]
struct MbArtist {
    name: Option<String>,
}

#[derive(Deserialize)]
struct MbGenre {
    name: Option<String>,
}

fn release_year(date: Option<&str>) -> Option<i32> {
    date?.split('-').next()?.trim().parse().ok()
}

fn release_to_result(release: MbRelease, barcode: &str) -> MetadataResult {
    let credited: Vec<String> = release
        .artist_credit
        .into_iter()
        .filter_map(|credit| credit.name.or_else(|| credit.artist.and_then(|a| a.name)))
        .filter(|name| !name.is_empty())
        .collect();
    let artist = if credited.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        credited.join(", ")
    };

    let genre = release
        .genres
        .into_iter()
        .find_map(|g| g.name)
        .unwrap_or_else(|| UNKNOWN_GENRE.to_string());

    let cover_url = release
        .id
        .as_ref()
        .map(|id| format!("{}/release/{}/front", COVER_ART_ARCHIVE_BASE, id));

    MetadataResult {
        id: release.id.unwrap_or_else(|| barcode.to_string()),
        title: release.title,
        artist,
        year: release_year(release.date.as_deref()),
        barcode: barcode.to_string(),
        cover_url,
        genre,
    }
}

/// Barcode lookups against the MusicBrainz release search.
///
/// The outbound client lives until [`MetadataProvider::shutdown`] is called.
pub struct MusicBrainzClient {
    client: Mutex<Option<Client>>,
    base_url: String,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self {
            client: Mutex::new(Some(client)),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn lookup(&self, barcode: &str) -> Result<Option<MetadataResult>, LookupError> {
        let client = {
            let guard = self.client.lock().unwrap_or_else(PoisonError::into_inner);
            guard.clone().ok_or(LookupError::ShutDown)?
        };

        let url = format!(
            "{}/release?query=barcode:{}&fmt=json&limit=1",
            self.base_url,
            urlencoding::encode(barcode)
        );
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let body = response.text().await?;
        let parsed: ReleaseSearchResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .releases
            .into_iter()
            .next()
            .map(|release| release_to_result(release, barcode)))
    }
}

#[async_trait]
impl MetadataProvider for MusicBrainzClient {
    async fn search_by_barcode(&self, barcode: &str) -> Option<MetadataResult> {
        match self.lookup(barcode).await {
            Ok(Some(result)) => {
                debug!("Barcode {} resolved to release {}", barcode, result.id);
                Some(result)
            }
            Ok(None) => {
                debug!("No MusicBrainz release for barcode {}", barcode);
                None
            }
            Err(err) => {
                warn!("MusicBrainz lookup for barcode {} failed: {}", barcode, err);
                None
            }
        }
    }

    fn shutdown(&self) {
        let mut client = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if client.take().is_some() {
            info!("MusicBrainz client shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_release(value: serde_json::Value) -> MbRelease {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_full_release() {
        let release = parse_release(json!({
            "id": "b84ee12a-09ef-421b-82de-0441a926375b",
            "title": "Abbey Road",
            "date": "1969-09-26",
            "artist-credit": [
                { "name": "The Beatles", "artist": { "name": "The Beatles" } }
            ],
            "genres": [ { "name": "rock" }, { "name": "pop" } ]
        }));

        let result = release_to_result(release, "0077774644129");

        assert_eq!(result.id, "b84ee12a-09ef-421b-82de-0441a926375b");
        assert_eq!(result.title.as_deref(), Some("Abbey Road"));
        assert_eq!(result.artist, "The Beatles");
        assert_eq!(result.year, Some(1969));
        assert_eq!(result.genre, "rock");
        assert_eq!(result.barcode, "0077774644129");
        assert_eq!(
            result.cover_url.as_deref(),
            Some("https://coverartarchive.org/release/b84ee12a-09ef-421b-82de-0441a926375b/front")
        );
    }

    #[test]
    fn joins_multiple_credits() {
        let release = parse_release(json!({
            "id": "r1",
            "title": "Collab",
            "artist-credit": [
                { "name": "Simon" },
                { "artist": { "name": "Garfunkel" } }
            ]
        }));

        assert_eq!(release_to_result(release, "1").artist, "Simon, Garfunkel");
    }

    #[test]
    fn falls_back_to_sentinels() {
        let release = parse_release(json!({ "title": "Bootleg", "date": "unknown" }));

        let result = release_to_result(release, "42");

        assert_eq!(result.id, "42");
        assert_eq!(result.artist, UNKNOWN_ARTIST);
        assert_eq!(result.genre, UNKNOWN_GENRE);
        assert_eq!(result.year, None);
        assert_eq!(result.cover_url, None);
    }

    #[test]
    fn parses_year_from_partial_dates() {
        assert_eq!(release_year(Some("1997")), Some(1997));
        assert_eq!(release_year(Some("2001-05")), Some(2001));
        assert_eq!(release_year(Some("")), None);
        assert_eq!(release_year(None), None);
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = MusicBrainzClient::new(&MusicBrainzConfig {
            base_url: "http://localhost:1234/ws/2/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(client.base_url(), "http://localhost:1234/ws/2");
    }

    #[tokio::test]
    async fn lookups_miss_after_shutdown() {
        let client = MusicBrainzClient::new(&MusicBrainzConfig::default()).unwrap();

        client.shutdown();

        assert!(matches!(
            client.lookup("0077774644129").await,
            Err(LookupError::ShutDown)
        ));
        assert!(client.search_by_barcode("0077774644129").await.is_none());
    }
}
