//! Album Catalog Server Library
//!
//! This library exposes the internal modules for testing and for the
//! auxiliary binaries.

pub mod catalog;
pub mod config;
pub mod metadata;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog::{normalize_title, CatalogError, CatalogStore, SqliteCatalogStore};
pub use metadata::{MetadataProvider, MetadataResult, MusicBrainzClient};
pub use server::{run_server, RequestsLoggingLevel, StatusCodeScheme};
