use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("User not found")]
    UserNotFound,

    #[error("Album not found")]
    AlbumNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Album title already saved")]
    DuplicateTitle,

    #[error("Album barcode already saved")]
    DuplicateBarcode,

    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogErrorKind {
    NotFound,
    Validation,
    Conflict,
    Persistence,
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            CatalogError::UserNotFound | CatalogError::AlbumNotFound => CatalogErrorKind::NotFound,
            CatalogError::Validation(_) => CatalogErrorKind::Validation,
            CatalogError::DuplicateTitle | CatalogError::DuplicateBarcode => {
                CatalogErrorKind::Conflict
            }
            CatalogError::Persistence { .. } => CatalogErrorKind::Persistence,
        }
    }

    pub(super) fn missing_title_and_barcode() -> Self {
        CatalogError::Validation("Provide title or barcode".to_string())
    }

    pub(super) fn no_changes() -> Self {
        CatalogError::Validation("No changes provided".to_string())
    }
}

pub(super) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(ffi::Error { code: ErrorCode::ConstraintViolation, extended_code }, _)
            if *extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Builds a mapper turning a write failure into a `CatalogError`.
///
/// A unique-constraint violation on the albums table becomes the matching
/// conflict; everything else is a persistence failure with `context` as its
/// message.
pub(super) fn write_error(context: &'static str) -> impl FnOnce(rusqlite::Error) -> CatalogError {
    move |source| {
        if is_unique_violation(&source) {
            if let rusqlite::Error::SqliteFailure(_, Some(message)) = &source {
                if message.contains("albums.normalized_title") {
                    return CatalogError::DuplicateTitle;
                }
                if message.contains("albums.barcode") {
                    return CatalogError::DuplicateBarcode;
                }
            }
        }
        CatalogError::Persistence { context, source }
    }
}

pub(super) fn read_error(source: rusqlite::Error) -> CatalogError {
    CatalogError::Persistence {
        context: "Failed to read catalog",
        source,
    }
}
