use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{Config, VisionConfig};
use crate::db::PillCatalog;
use crate::error::{PillboxError, Result};
use crate::models::{
    NameField, Page, PillListing, PillRecord, PillSearchResult, PillSortField, SortOrder,
};
use crate::search::{CandidateMatcher, TextExtractor};
use crate::vision::{preprocess_image, TextDetector};

/// Splits a comma-separated efficacy query into trimmed, non-empty terms.
pub fn parse_efficacy_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Clone)]
pub struct PillService {
    catalog: Arc<dyn PillCatalog>,
    extractor: TextExtractor,
    matcher: CandidateMatcher,
    vision: VisionConfig,
    max_limit: u32,
}

impl PillService {
    pub fn new(
        catalog: Arc<dyn PillCatalog>,
        detector: Arc<dyn TextDetector>,
        config: &Config,
    ) -> Self {
        Self {
            extractor: TextExtractor::new(detector),
            matcher: CandidateMatcher::new(catalog.clone()),
            catalog,
            vision: config.vision.clone(),
            max_limit: config.search.max_limit,
        }
    }

    pub fn validate_page(&self, page: Page) -> Result<()> {
        if page.limit == 0 || page.limit > self.max_limit {
            return Err(PillboxError::Validation(format!(
                "limit must be between 1 and {}",
                self.max_limit
            )));
        }
        Ok(())
    }

    /// Identifies pills from a photograph.
    ///
    /// Any failure below this point (vision, catalog) is logged and reported
    /// as `Search`; the original message is kept in the error for diagnostics.
    pub async fn search_by_image(&self, image: Vec<u8>, page: Page) -> Result<PillSearchResult> {
        self.validate_page(page)?;

        match self.identify(image, page).await {
            Ok(result) => {
                info!(
                    total = result.total,
                    limit = page.limit,
                    offset = page.offset,
                    "Image search completed"
                );
                Ok(result)
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Image search failed");
                Err(PillboxError::Search(format!(
                    "Failed to search pills by image: {e}"
                )))
            }
        }
    }

    async fn identify(&self, image: Vec<u8>, page: Page) -> Result<PillSearchResult> {
        let image = self.prepare_image(image).await;

        let fragments = self.extractor.extract(&image).await?;
        if fragments.is_empty() {
            return Ok(PillSearchResult::empty(page));
        }

        self.matcher.match_fragments(&fragments, page).await
    }

    /// Runs preprocessing off the async runtime. A photo the preprocessor
    /// cannot handle is sent to the provider unchanged.
    async fn prepare_image(&self, image: Vec<u8>) -> Vec<u8> {
        if !self.vision.preprocess {
            return image;
        }

        let config = self.vision.clone();
        let original = image.clone();
        match tokio::task::spawn_blocking(move || preprocess_image(&image, &config)).await {
            Ok(Ok(processed)) => processed,
            Ok(Err(e)) => {
                warn!(error = %e, "Image preprocessing skipped");
                original
            }
            Err(e) => {
                warn!(error = %e, "Image preprocessing task failed");
                original
            }
        }
    }

    pub async fn get_pill(&self, id: i64) -> Result<PillRecord> {
        self.catalog
            .get_pill_by_id(id)
            .await
            .map_err(|e| PillboxError::catalog("Failed to load pill", e))?
            .ok_or_else(|| PillboxError::NotFound(format!("Pill {id} not found")))
    }

    pub async fn list_pills(
        &self,
        page: Page,
        sort_by: PillSortField,
        order: SortOrder,
    ) -> Result<PillListing> {
        self.validate_page(page)?;

        let (pills, total) = self
            .catalog
            .list_pills(page, sort_by, order)
            .await
            .map_err(|e| PillboxError::catalog("Failed to list pills", e))?;

        Ok(PillListing::new(pills, total, page.limit))
    }

    pub async fn search_by_name(
        &self,
        text: &str,
        field: NameField,
        page: Page,
    ) -> Result<PillSearchResult> {
        self.validate_page(page)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(PillboxError::Validation(format!("{field} must not be empty")));
        }

        let pills = self
            .catalog
            .search_by_name_prefix(text, field, page)
            .await
            .map_err(|e| PillboxError::catalog("Failed to search pills by name", e))?;

        Ok(PillSearchResult::from_candidates(pills, page))
    }

    pub async fn search_by_efficacy(&self, raw: &str, page: Page) -> Result<PillSearchResult> {
        self.validate_page(page)?;
        let terms = parse_efficacy_terms(raw);
        if terms.is_empty() {
            return Err(PillboxError::Validation(
                "efficacy must contain at least one term".to_string(),
            ));
        }

        let pills = self
            .catalog
            .search_by_efficacy(&terms, page)
            .await
            .map_err(|e| PillboxError::catalog("Failed to search pills by efficacy", e))?;

        Ok(PillSearchResult::from_candidates(pills, page))
    }

    pub async fn favorite_count(&self, id: i64) -> Result<u64> {
        self.catalog
            .favorite_count(id)
            .await
            .map_err(|e| PillboxError::catalog("Failed to count favorites", e))
    }

    pub async fn review_count(&self, id: i64) -> Result<u64> {
        self.catalog
            .review_count(id)
            .await
            .map_err(|e| PillboxError::catalog("Failed to count reviews", e))
    }
}
