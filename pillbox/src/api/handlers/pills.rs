//! Pill handlers.
//!
//! Catalog reads, text searches, and photo-based identification. All
//! responses are wrapped in [`ApiResponse`] envelopes.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};

use crate::api::dto::{
    EfficacySearchQuery, EngnameSearchQuery, FavoriteCountResponse, ImageUploadForm,
    ListPillsQuery, ListPillsResponse, NameSearchQuery, PageQuery, PillResponse,
    PillSearchResponse, ReviewCountResponse,
};
use crate::api::extractors::AppQuery;
use crate::api::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::PillboxError;
use crate::models::NameField;

const IMAGE_FIELD: &str = "image";

fn parse_pill_id(raw: &str) -> Result<i64, PillboxError> {
    raw.parse::<i64>()
        .map_err(|_| PillboxError::Validation(format!("Invalid pill id: {raw}")))
}

/// Reads the `image` field, enforcing the upload size limit and checking the
/// magic bytes for a known image format.
async fn read_image_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<Vec<u8>, PillboxError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| PillboxError::Validation(format!("Invalid multipart body: {e}")))?;

        let Some(field) = field else {
            return Err(PillboxError::Validation(format!(
                "Missing required '{IMAGE_FIELD}' field"
            )));
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| PillboxError::Validation(format!("Failed to read image: {e}")))?;

        if bytes.is_empty() {
            return Err(PillboxError::Validation("Uploaded image is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(PillboxError::Validation(format!(
                "Image too large: {} bytes (max {max_bytes} bytes)",
                bytes.len()
            )));
        }
        if !infer::is_image(&bytes) {
            return Err(PillboxError::Validation(
                "Uploaded file is not a supported image".to_string(),
            ));
        }

        return Ok(bytes.to_vec());
    }
}

/// `GET|POST /api/pills/search/image`
///
/// Identifies pills from a photo uploaded as multipart field `image`: printed
/// imprints are matched first, english names second.
#[utoipa::path(
    post,
    path = "/api/pills/search/image",
    tag = "pills",
    operation_id = "pills.searchByImage",
    params(PageQuery),
    request_body(content_type = "multipart/form-data", content = ImageUploadForm),
    responses(
        (status = 200, description = "Matching pills (possibly none)", body = PillSearchResponse),
        (status = 400, description = "Invalid pagination or upload", body = ApiError),
        (status = 500, description = "Search failed", body = ApiError),
        (status = 501, description = "No vision provider configured", body = ApiError),
    )
)]
pub async fn search_by_image(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PageQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResponse<PillSearchResponse> {
    let page = match query.page().and_then(|page| {
        state.pills.validate_page(page)?;
        Ok(page)
    }) {
        Ok(page) => page,
        Err(e) => return e.into(),
    };

    if !state.vision.is_available() {
        return ApiResponse::error(
            ErrorCode::NotImplemented,
            "Image search is not configured on this server",
        );
    }

    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            return ApiResponse::error(ErrorCode::InvalidRequest, rejection.body_text());
        }
    };

    let image = match read_image_field(&mut multipart, state.config.vision.max_upload_bytes).await
    {
        Ok(bytes) => bytes,
        Err(e) => return e.into(),
    };

    match state.pills.search_by_image(image, page).await {
        Ok(result) => ApiResponse::success(result.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills`
#[utoipa::path(
    get,
    path = "/api/pills",
    tag = "pills",
    operation_id = "pills.list",
    params(ListPillsQuery),
    responses(
        (status = 200, description = "One page of the catalog", body = ListPillsResponse),
        (status = 400, description = "Invalid pagination or sort", body = ApiError),
    )
)]
pub async fn list_pills(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListPillsQuery>,
) -> ApiResponse<ListPillsResponse> {
    let page = match query.page() {
        Ok(page) => page,
        Err(e) => return e.into(),
    };
    let (sort_by, order) = match query.sort() {
        Ok(sort) => sort,
        Err(e) => return e.into(),
    };

    match state.pills.list_pills(page, sort_by, order).await {
        Ok(listing) => ApiResponse::success(listing.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/{id}`
#[utoipa::path(
    get,
    path = "/api/pills/{id}",
    tag = "pills",
    operation_id = "pills.get",
    params(("id" = i64, Path, description = "Pill id")),
    responses(
        (status = 200, description = "Pill found", body = PillResponse),
        (status = 404, description = "Pill not found", body = ApiError),
    )
)]
pub async fn get_pill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<PillResponse> {
    let id = match parse_pill_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into(),
    };

    match state.pills.get_pill(id).await {
        Ok(pill) => ApiResponse::success(pill.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/{id}/favoritecount`
#[utoipa::path(
    get,
    path = "/api/pills/{id}/favoritecount",
    tag = "pills",
    operation_id = "pills.favoriteCount",
    params(("id" = i64, Path, description = "Pill id")),
    responses(
        (status = 200, description = "Number of users who favorited the pill", body = FavoriteCountResponse),
        (status = 400, description = "Invalid pill id", body = ApiError),
    )
)]
pub async fn get_favorite_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<FavoriteCountResponse> {
    let id = match parse_pill_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into(),
    };

    match state.pills.favorite_count(id).await {
        Ok(favorite_count) => ApiResponse::success(FavoriteCountResponse { favorite_count }),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/{id}/reviewcount`
#[utoipa::path(
    get,
    path = "/api/pills/{id}/reviewcount",
    tag = "pills",
    operation_id = "pills.reviewCount",
    params(("id" = i64, Path, description = "Pill id")),
    responses(
        (status = 200, description = "Number of reviews for the pill", body = ReviewCountResponse),
        (status = 400, description = "Invalid pill id", body = ApiError),
    )
)]
pub async fn get_review_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<ReviewCountResponse> {
    let id = match parse_pill_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into(),
    };

    match state.pills.review_count(id).await {
        Ok(review_count) => ApiResponse::success(ReviewCountResponse { review_count }),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/search/name`
#[utoipa::path(
    get,
    path = "/api/pills/search/name",
    tag = "pills",
    operation_id = "pills.searchByName",
    params(NameSearchQuery),
    responses(
        (status = 200, description = "Pills whose name starts with the query", body = PillSearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn search_by_name(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<NameSearchQuery>,
) -> ApiResponse<PillSearchResponse> {
    let (text, page) = match query.parts() {
        Ok(parts) => parts,
        Err(e) => return e.into(),
    };

    match state.pills.search_by_name(&text, NameField::Name, page).await {
        Ok(result) => ApiResponse::success(result.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/search/engname`
#[utoipa::path(
    get,
    path = "/api/pills/search/engname",
    tag = "pills",
    operation_id = "pills.searchByEngname",
    params(EngnameSearchQuery),
    responses(
        (status = 200, description = "Pills whose english name starts with the query", body = PillSearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn search_by_engname(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EngnameSearchQuery>,
) -> ApiResponse<PillSearchResponse> {
    let (text, page) = match query.parts() {
        Ok(parts) => parts,
        Err(e) => return e.into(),
    };

    match state
        .pills
        .search_by_name(&text, NameField::Engname, page)
        .await
    {
        Ok(result) => ApiResponse::success(result.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/pills/search/efficacy`
#[utoipa::path(
    get,
    path = "/api/pills/search/efficacy",
    tag = "pills",
    operation_id = "pills.searchByEfficacy",
    params(EfficacySearchQuery),
    responses(
        (status = 200, description = "Pills whose efficacy mentions every term", body = PillSearchResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn search_by_efficacy(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<EfficacySearchQuery>,
) -> ApiResponse<PillSearchResponse> {
    let (terms, page) = match query.parts() {
        Ok(parts) => parts,
        Err(e) => return e.into(),
    };

    match state.pills.search_by_efficacy(&terms, page).await {
        Ok(result) => ApiResponse::success(result.into()),
        Err(e) => e.into(),
    }
}
