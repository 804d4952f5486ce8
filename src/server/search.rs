//! Barcode metadata search routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::state::{GuardedMetadataProvider, ServerState};
use super::status_codes::detail_response;

async fn search_by_barcode(
    State(metadata_provider): State<GuardedMetadataProvider>,
    Path(barcode): Path<String>,
) -> Response {
    match metadata_provider.search_by_barcode(&barcode).await {
        Some(result) => Json(result).into_response(),
        None => detail_response(
            StatusCode::NOT_FOUND,
            format!("Album with barcode {} not found", barcode),
        ),
    }
}

pub fn make_search_routes(state: ServerState) -> Router {
    Router::new()
        .route("/barcode/{barcode}", get(search_by_barcode))
        .with_state(state)
}
