use anyhow::{Context, Result};
use std::time::Duration;

use tracing::{error, info};

use crate::catalog::{AlbumUpdate, CatalogResult, NewAlbum, UserId};
use tower_http::cors::{Any, CorsLayer};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{
    log_requests, make_search_routes, state::*, ServerConfig, StatusCodeScheme,
};

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct CreateUserBody {
    pub username: String,
}

#[derive(Deserialize, Debug)]
struct ListAlbumsQuery {
    pub q: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CheckAlbumQuery {
    pub title: Option<String>,
    pub barcode: Option<String>,
}

fn catalog_response<T: Serialize>(
    scheme: StatusCodeScheme,
    success: StatusCode,
    result: CatalogResult<T>,
) -> Response {
    match result {
        Ok(value) => (success, Json(value)).into_response(),
        Err(err) => scheme.error_response(&err),
    }
}

fn deletion_response(scheme: StatusCodeScheme, result: CatalogResult<()>) -> Response {
    match result {
        Ok(()) => scheme.deleted().into_response(),
        Err(err) => scheme.error_response(&err),
    }
}

async fn healthz(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn create_user(State(state): State<ServerState>, Json(body): Json<CreateUserBody>) -> Response {
    let scheme = state.config.status_codes;
    match state.catalog_store.create_user(&body.username) {
        Ok(created) => (scheme.user_created(created.is_new), Json(created.user)).into_response(),
        Err(err) => scheme.error_response(&err),
    }
}

async fn get_user(State(state): State<ServerState>, Path(user_id): Path<UserId>) -> Response {
    catalog_response(
        state.config.status_codes,
        StatusCode::OK,
        state.catalog_store.get_user(user_id),
    )
}

async fn delete_user(State(state): State<ServerState>, Path(user_id): Path<UserId>) -> Response {
    deletion_response(
        state.config.status_codes,
        state.catalog_store.delete_user(user_id),
    )
}

async fn add_album(
    State(state): State<ServerState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<NewAlbum>,
) -> Response {
    catalog_response(
        state.config.status_codes,
        StatusCode::OK,
        state.catalog_store.add_album(user_id, &body),
    )
}

async fn list_albums(
    State(state): State<ServerState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ListAlbumsQuery>,
) -> Response {
    catalog_response(
        state.config.status_codes,
        StatusCode::OK,
        state.catalog_store.list_albums(user_id, query.q.as_deref()),
    )
}

async fn check_album(
    State(state): State<ServerState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<CheckAlbumQuery>,
) -> Response {
    catalog_response(
        state.config.status_codes,
        StatusCode::OK,
        state.catalog_store.check_album(
            user_id,
            query.title.as_deref(),
            query.barcode.as_deref(),
        ),
    )
}

async fn delete_album(
    State(state): State<ServerState>,
    Path((user_id, album_id)): Path<(UserId, i64)>,
) -> Response {
    deletion_response(
        state.config.status_codes,
        state.catalog_store.delete_album(user_id, album_id),
    )
}

async fn update_album(
    State(state): State<ServerState>,
    Path((user_id, album_id)): Path<(UserId, i64)>,
    Json(body): Json<AlbumUpdate>,
) -> Response {
    catalog_response(
        state.config.status_codes,
        StatusCode::OK,
        state.catalog_store.update_album(user_id, album_id, &body),
    )
}

pub fn make_app(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    metadata_provider: GuardedMetadataProvider,
) -> Router {
    let state = ServerState::new(config, catalog_store, metadata_provider);

    let user_routes: Router = Router::new()
        .route("/", post(create_user))
        .route("/{user_id}", get(get_user).delete(delete_user))
        .route("/{user_id}/albums", get(list_albums).post(add_album))
        .route("/{user_id}/albums/check", get(check_album))
        .route(
            "/{user_id}/albums/{album_id}",
            put(update_album).delete(delete_album),
        )
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/healthz", get(healthz))
        .with_state(state.clone());

    home_router
        .nest("/users", user_routes)
        .nest("/api/search", make_search_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, initiating graceful shutdown");
}

/// Serves the catalog until Ctrl+C is received.
pub async fn run_server(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    metadata_provider: GuardedMetadataProvider,
) -> Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let app = make_app(config, catalog_store, metadata_provider);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
