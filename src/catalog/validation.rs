//! Field-level input limits, checked before any store access.

use super::error::{CatalogError, CatalogResult};
use super::models::{AlbumUpdate, NewAlbum};

pub const USERNAME_MAX_LEN: usize = 100;
pub const TITLE_MAX_LEN: usize = 255;
pub const BARCODE_MAX_LEN: usize = 64;
pub const ARTIST_MAX_LEN: usize = 255;
pub const GENRE_MAX_LEN: usize = 100;
pub const COVER_URL_MAX_LEN: usize = 500;

fn check_max_len(field: &'static str, value: Option<&str>, max: usize) -> CatalogResult<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(CatalogError::Validation(format!(
            "Field '{}' must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

pub fn validate_username(username: &str) -> CatalogResult<()> {
    if username.is_empty() {
        return Err(CatalogError::Validation(
            "Field 'username' is required but was empty".to_string(),
        ));
    }
    check_max_len("username", Some(username), USERNAME_MAX_LEN)
}

macro_rules! validate_album_fields {
    ($fields:expr) => {{
        let fields = $fields;
        check_max_len("title", fields.title.as_deref(), TITLE_MAX_LEN)?;
        check_max_len("barcode", fields.barcode.as_deref(), BARCODE_MAX_LEN)?;
        check_max_len("artist", fields.artist.as_deref(), ARTIST_MAX_LEN)?;
        check_max_len("genre", fields.genre.as_deref(), GENRE_MAX_LEN)?;
        check_max_len("cover_url", fields.cover_url.as_deref(), COVER_URL_MAX_LEN)?;
        Ok(())
    }};
}

pub fn validate_new_album(album: &NewAlbum) -> CatalogResult<()> {
    validate_album_fields!(album)
}

pub fn validate_album_update(update: &AlbumUpdate) -> CatalogResult<()> {
    validate_album_fields!(update)
}
