use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NameField, Page, PillRecord, PillSortField, PillSummary, SortOrder};

/// Read-only access to the pill catalog.
///
/// Services receive this as an injected `Arc<dyn PillCatalog>` so tests can
/// substitute an in-process double.
///
/// Text matching follows SQLite `LIKE`: case folding covers ASCII letters
/// only, so `é` and `É` are distinct.
#[async_trait]
pub trait PillCatalog: Send + Sync {
    async fn get_pill_by_id(&self, id: i64) -> Result<Option<PillRecord>>;

    /// One page of the catalog ordered by an allow-listed column, together
    /// with the total number of pills.
    async fn list_pills(
        &self,
        page: Page,
        sort_by: PillSortField,
        order: SortOrder,
    ) -> Result<(Vec<PillSummary>, u64)>;

    /// Case-insensitive prefix match on `name` or `engname`.
    async fn search_by_name_prefix(
        &self,
        text: &str,
        field: NameField,
        page: Page,
    ) -> Result<Vec<PillRecord>>;

    /// Every term must appear somewhere in `efficacy`, ASCII case-insensitive.
    async fn search_by_efficacy(&self, terms: &[String], page: Page) -> Result<Vec<PillRecord>>;

    /// Exact match on the printed front/back imprint. A missing `back`
    /// matches pills whose back face carries no imprint.
    async fn search_by_imprint(
        &self,
        front: &str,
        back: Option<&str>,
        page: Page,
    ) -> Result<Vec<PillRecord>>;

    /// Case-insensitive substring match on `engname`.
    async fn search_by_engname_contains(&self, text: &str, page: Page)
        -> Result<Vec<PillRecord>>;

    async fn favorite_count(&self, pill_id: i64) -> Result<u64>;
    async fn review_count(&self, pill_id: i64) -> Result<u64>;

    /// Refreshes a replicated catalog and confirms it answers queries.
    /// No-op for backends without a remote.
    async fn sync(&self) -> Result<()> {
        Ok(())
    }
}
