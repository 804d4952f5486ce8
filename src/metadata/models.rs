use serde::{Deserialize, Serialize};

/// Album information resolved from an external provider. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResult {
    /// Provider id of the release, or the searched barcode when the provider
    /// did not report one.
    pub id: String,
    pub title: Option<String>,
    pub artist: String,
    pub year: Option<i32>,
    pub barcode: String,
    pub cover_url: Option<String>,
    pub genre: String,
}
