//! Album metadata lookup by barcode.
//!
//! Lookups never fail from the caller's point of view: any fault on the way
//! to the provider is logged and reported as a miss.

mod models;
mod musicbrainz;

pub use models::MetadataResult;
pub use musicbrainz::{LookupError, MusicBrainzClient, MusicBrainzConfig};

use async_trait::async_trait;

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Returns the best matching release for `barcode`, or `None` on a miss.
    async fn search_by_barcode(&self, barcode: &str) -> Option<MetadataResult>;

    /// Releases any outbound resources. Later lookups report a miss.
    fn shutdown(&self);
}

