use std::convert::Infallible;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::openapi;
use super::AppState;

/// Multipart framing on top of the raw image bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

fn pills_router(state: &AppState) -> Router<AppState> {
    let upload_limit = state.config.vision.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let image_search = get(handlers::pills::search_by_image)
        .post(handlers::pills::search_by_image)
        .layer::<_, Infallible>(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit));

    Router::new()
        .route("/", get(handlers::pills::list_pills))
        .route("/search/image", image_search)
        .route("/search/name", get(handlers::pills::search_by_name))
        .route("/search/engname", get(handlers::pills::search_by_engname))
        .route("/search/efficacy", get(handlers::pills::search_by_efficacy))
        .route("/{id}", get(handlers::pills::get_pill))
        .route(
            "/{id}/favoritecount",
            get(handlers::pills::get_favorite_count),
        )
        .route("/{id}/reviewcount", get(handlers::pills::get_review_count))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .nest("/pills", pills_router(&state));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
