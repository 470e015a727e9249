//! Pill request/response DTOs.
//!
//! Pill fields keep the catalog's column names on the wire (`engname`,
//! `companyname`, `type`, ...); envelope-level fields are camelCase.

use serde::{Deserialize, Serialize};

use crate::error::PillboxError;
use crate::models::{self, Page, PillSortField, SortOrder};

fn required_page(limit: Option<u32>, offset: Option<u32>) -> Result<Page, PillboxError> {
    let limit = limit.ok_or_else(|| {
        PillboxError::Validation("limit query parameter is required".to_string())
    })?;
    let offset = offset.ok_or_else(|| {
        PillboxError::Validation("offset query parameter is required".to_string())
    })?;
    Ok(Page::new(limit, offset))
}

fn required_text(value: Option<&str>, name: &str) -> Result<String, PillboxError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(PillboxError::Validation(format!(
            "{name} query parameter is required"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Pagination for `GET|POST /api/pills/search/image`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, `1..=SEARCH_MAX_LIMIT`. Required.
    pub limit: Option<u32>,
    /// Rows to skip. Required.
    pub offset: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> Result<Page, PillboxError> {
        required_page(self.limit, self.offset)
    }
}

/// Query parameters for `GET /api/pills`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ListPillsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// One of `id`, `name`, `engname`, `companyname`, `shape`, `type`,
    /// `favorite_count`. Defaults to `id`.
    pub sorted_by: Option<String>,
    /// `ASC` or `DESC`. Defaults to `ASC`.
    pub order: Option<String>,
}

impl ListPillsQuery {
    pub fn page(&self) -> Result<Page, PillboxError> {
        required_page(self.limit, self.offset)
    }

    pub fn sort(&self) -> Result<(PillSortField, SortOrder), PillboxError> {
        let sort_by = match self.sorted_by.as_deref().map(str::trim) {
            None | Some("") => PillSortField::default(),
            Some(raw) => raw.parse().map_err(PillboxError::Validation)?,
        };
        let order = match self.order.as_deref().map(str::trim) {
            None | Some("") => SortOrder::default(),
            Some(raw) => raw.parse().map_err(PillboxError::Validation)?,
        };
        Ok((sort_by, order))
    }
}

/// Query parameters for `GET /api/pills/search/name`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameSearchQuery {
    /// Case-insensitive prefix of the pill name.
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl NameSearchQuery {
    pub fn parts(&self) -> Result<(String, Page), PillboxError> {
        let page = required_page(self.limit, self.offset)?;
        Ok((required_text(self.name.as_deref(), "name")?, page))
    }
}

/// Query parameters for `GET /api/pills/search/engname`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EngnameSearchQuery {
    /// Case-insensitive prefix of the english name.
    pub engname: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl EngnameSearchQuery {
    pub fn parts(&self) -> Result<(String, Page), PillboxError> {
        let page = required_page(self.limit, self.offset)?;
        Ok((required_text(self.engname.as_deref(), "engname")?, page))
    }
}

/// Query parameters for `GET /api/pills/search/efficacy`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EfficacySearchQuery {
    /// Comma-separated terms; every term must appear in the efficacy text.
    pub efficacy: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl EfficacySearchQuery {
    pub fn parts(&self) -> Result<(String, Page), PillboxError> {
        let page = required_page(self.limit, self.offset)?;
        Ok((required_text(self.efficacy.as_deref(), "efficacy")?, page))
    }
}

/// Multipart body of the image search. Documentation only; the handler reads
/// the stream directly.
#[derive(Debug, utoipa::ToSchema)]
pub struct ImageUploadForm {
    /// Photo of the pill (JPEG, PNG, WebP, ...).
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Full pill record.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PillResponse {
    pub id: i64,
    pub name: String,
    pub engname: Option<String>,
    pub companyname: Option<String>,
    pub companyengname: Option<String>,
    pub ingredientname: Option<String>,
    pub ingredientengname: Option<String>,
    #[serde(rename = "type")]
    pub pill_type: Option<String>,
    pub shape: Option<String>,
    pub efficacy: Option<String>,
    pub dosage: Option<String>,
    pub caution: Option<String>,
    pub cautionwarning: Option<String>,
    pub interaction: Option<String>,
    pub sideeffect: Option<String>,
    pub storagemethod: Option<String>,
    pub imagepath: Option<String>,
}

impl From<models::PillRecord> for PillResponse {
    fn from(pill: models::PillRecord) -> Self {
        Self {
            id: pill.id,
            name: pill.name,
            engname: pill.engname,
            companyname: pill.companyname,
            companyengname: pill.companyengname,
            ingredientname: pill.ingredientname,
            ingredientengname: pill.ingredientengname,
            pill_type: pill.pill_type,
            shape: pill.shape,
            efficacy: pill.efficacy,
            dosage: pill.dosage,
            caution: pill.caution,
            cautionwarning: pill.cautionwarning,
            interaction: pill.interaction,
            sideeffect: pill.sideeffect,
            storagemethod: pill.storagemethod,
            imagepath: pill.imagepath,
        }
    }
}

/// Pill row in the catalog listing, with its favorite count.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PillSummaryResponse {
    #[serde(flatten)]
    pub pill: PillResponse,
    pub favorite_count: i64,
}

impl From<models::PillSummary> for PillSummaryResponse {
    fn from(summary: models::PillSummary) -> Self {
        Self {
            pill: summary.pill.into(),
            favorite_count: summary.favorite_count,
        }
    }
}

/// Response for `GET /api/pills`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPillsResponse {
    pub pills: Vec<PillSummaryResponse>,
    pub total_count: u64,
    pub total_pages: u64,
}

impl From<models::PillListing> for ListPillsResponse {
    fn from(listing: models::PillListing) -> Self {
        Self {
            pills: listing.pills.into_iter().map(Into::into).collect(),
            total_count: listing.total_count,
            total_pages: listing.total_pages,
        }
    }
}

/// Response for every pill search endpoint. `limit` and `offset` echo the
/// request; `total` is the number of distinct pills returned.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PillSearchResponse {
    pub pills: Vec<PillResponse>,
    pub total: usize,
    pub limit: u32,
    pub offset: u32,
}

impl From<models::PillSearchResult> for PillSearchResponse {
    fn from(result: models::PillSearchResult) -> Self {
        Self {
            pills: result.pills.into_iter().map(Into::into).collect(),
            total: result.total,
            limit: result.limit,
            offset: result.offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCountResponse {
    pub favorite_count: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCountResponse {
    pub review_count: u64,
}
