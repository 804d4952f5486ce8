//! Album catalog: users, the albums they own, and the rules that keep a
//! user's albums free of duplicates.

mod catalog_store;
mod error;
mod models;
mod normalize;
mod sqlite_catalog_store;
mod validation;

pub use catalog_store::CatalogStore;
pub use error::{CatalogError, CatalogErrorKind, CatalogResult};
pub use models::{Album, AlbumCheck, AlbumUpdate, CreatedUser, NewAlbum, User, UserId};
pub use normalize::normalize_title;
pub use sqlite_catalog_store::SqliteCatalogStore;
