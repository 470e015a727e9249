use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pillbox API",
        version = "1.0.0",
        description = "Pill catalog search, including identification from a photo of the pill.",
    ),
    paths(
        handlers::health::health_check,
        handlers::pills::list_pills,
        handlers::pills::get_pill,
        handlers::pills::get_favorite_count,
        handlers::pills::get_review_count,
        handlers::pills::search_by_name,
        handlers::pills::search_by_engname,
        handlers::pills::search_by_efficacy,
        handlers::pills::search_by_image,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Pills
        dto::ImageUploadForm,
        dto::PillResponse,
        dto::PillSummaryResponse,
        dto::ListPillsResponse,
        dto::PillSearchResponse,
        dto::FavoriteCountResponse,
        dto::ReviewCountResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::VisionStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "pills", description = "Pill catalog reads and searches"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
