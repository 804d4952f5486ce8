//! Mapping of catalog outcomes to HTTP status codes.
//!
//! Existing clients of the catalog were written against a set of
//! non-standard codes (405 for a missing resource, 423 for bad input, 410 for
//! a duplicate, 401 for a storage failure). `Legacy` keeps serving those,
//! `Conventional` uses the usual ones.

use crate::catalog::{CatalogError, CatalogErrorKind};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCodeScheme {
    #[default]
    Legacy,
    Conventional,
}

impl std::fmt::Display for StatusCodeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl StatusCodeScheme {
    pub fn for_error(&self, kind: CatalogErrorKind) -> StatusCode {
        match (self, kind) {
            (StatusCodeScheme::Legacy, CatalogErrorKind::NotFound) => StatusCode::METHOD_NOT_ALLOWED,
            (StatusCodeScheme::Legacy, CatalogErrorKind::Validation) => StatusCode::LOCKED,
            (StatusCodeScheme::Legacy, CatalogErrorKind::Conflict) => StatusCode::GONE,
            (StatusCodeScheme::Legacy, CatalogErrorKind::Persistence) => StatusCode::UNAUTHORIZED,
            (StatusCodeScheme::Conventional, CatalogErrorKind::NotFound) => StatusCode::NOT_FOUND,
            (StatusCodeScheme::Conventional, CatalogErrorKind::Validation) => {
                StatusCode::BAD_REQUEST
            }
            (StatusCodeScheme::Conventional, CatalogErrorKind::Conflict) => StatusCode::CONFLICT,
            (StatusCodeScheme::Conventional, CatalogErrorKind::Persistence) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Status of a successful delete, sent with an empty body.
    pub fn deleted(&self) -> StatusCode {
        match self {
            StatusCodeScheme::Legacy => StatusCode::RESET_CONTENT,
            StatusCodeScheme::Conventional => StatusCode::NO_CONTENT,
        }
    }

    pub fn user_created(&self, is_new: bool) -> StatusCode {
        match self {
            StatusCodeScheme::Conventional if is_new => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    pub fn error_response(&self, err: &CatalogError) -> Response {
        let status = self.for_error(err.kind());
        match err {
            CatalogError::Persistence { source, .. } => error!("{}: {}", err, source),
            _ => debug!("Catalog request rejected with {}: {}", status, err),
        }
        detail_response(status, err.to_string())
    }
}

/// Error body shared by every endpoint.
pub fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_codes() {
        let scheme = StatusCodeScheme::Legacy;
        assert_eq!(scheme.for_error(CatalogErrorKind::NotFound).as_u16(), 405);
        assert_eq!(scheme.for_error(CatalogErrorKind::Validation).as_u16(), 423);
        assert_eq!(scheme.for_error(CatalogErrorKind::Conflict).as_u16(), 410);
        assert_eq!(scheme.for_error(CatalogErrorKind::Persistence).as_u16(), 401);
        assert_eq!(scheme.deleted().as_u16(), 205);
        assert_eq!(scheme.user_created(true), StatusCode::OK);
    }

    #[test]
    fn conventional_codes() {
        let scheme = StatusCodeScheme::Conventional;
        assert_eq!(scheme.for_error(CatalogErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(scheme.for_error(CatalogErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(scheme.for_error(CatalogErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(
            scheme.for_error(CatalogErrorKind::Persistence),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(scheme.deleted(), StatusCode::NO_CONTENT);
        assert_eq!(scheme.user_created(true), StatusCode::CREATED);
        assert_eq!(scheme.user_created(false), StatusCode::OK);
    }

    #[test]
    fn scheme_is_read_from_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            scheme: StatusCodeScheme,
        }
        let parsed: Wrapper = toml::from_str("scheme = \"conventional\"").unwrap();
        assert_eq!(parsed.scheme, StatusCodeScheme::Conventional);
    }
}
