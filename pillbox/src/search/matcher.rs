use std::sync::Arc;

use tracing::debug;

use crate::db::PillCatalog;
use crate::error::{PillboxError, Result};
use crate::models::{ImprintPair, Page, PillSearchResult, TextFragment};

/// Resolves text fragments to catalog records.
///
/// 1. Imprint tier: `fragments[0]` as front, `fragments[1]` as back, looked up
///    once by exact match.
/// 2. Free-text tier, only when the imprint tier found nothing: each
///    non-blank fragment as a case-insensitive `engname` substring.
///
/// Candidates from both tiers are deduplicated by id.
#[derive(Clone)]
pub struct CandidateMatcher {
    catalog: Arc<dyn PillCatalog>,
}

impl CandidateMatcher {
    pub fn new(catalog: Arc<dyn PillCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn match_fragments(
        &self,
        fragments: &[TextFragment],
        page: Page,
    ) -> Result<PillSearchResult> {
        if fragments.is_empty() {
            return Ok(PillSearchResult::empty(page));
        }

        let mut candidates = Vec::new();

        if let Some(pair) = ImprintPair::from_fragments(fragments) {
            let found = self
                .catalog
                .search_by_imprint(&pair.front, pair.back.as_deref(), page)
                .await
                .map_err(|e| PillboxError::catalog("imprint lookup failed", e))?;
            debug!(front = %pair.front, back = ?pair.back, matched = found.len(), "Imprint tier");
            candidates.extend(found);
        }

        if candidates.is_empty() {
            for fragment in fragments.iter().filter(|f| !f.is_blank()) {
                let found = self
                    .catalog
                    .search_by_engname_contains(fragment.as_str(), page)
                    .await
                    .map_err(|e| PillboxError::catalog("engname lookup failed", e))?;
                debug!(fragment = %fragment, matched = found.len(), "Free-text tier");
                candidates.extend(found);
            }
        }

        Ok(PillSearchResult::from_candidates(candidates, page))
    }
}
