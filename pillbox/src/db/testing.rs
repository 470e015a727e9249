//! In-process catalog double for unit tests.
//!
//! Case folding is ASCII-only to match SQLite `LIKE`.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::PillCatalog;
use crate::error::{PillboxError, Result};
use crate::models::{NameField, Page, PillRecord, PillSortField, PillSummary, SortOrder};

#[derive(Default)]
pub struct CallCounts {
    pub imprint: AtomicUsize,
    pub engname: AtomicUsize,
    pub other: AtomicUsize,
}

impl CallCounts {
    pub fn imprint(&self) -> usize {
        self.imprint.load(Ordering::SeqCst)
    }

    pub fn engname(&self) -> usize {
        self.engname.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.imprint() + self.engname() + self.other.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct InMemoryCatalog {
    pub pills: Vec<PillRecord>,
    pub imprints: Vec<(i64, String, Option<String>)>,
    pub favorites: Vec<i64>,
    pub reviews: Vec<i64>,
    pub fail_with: Option<String>,
    pub calls: CallCounts,
}

impl InMemoryCatalog {
    pub fn with_pills(pills: Vec<PillRecord>) -> Self {
        Self {
            pills,
            ..Default::default()
        }
    }

    pub fn imprint(mut self, id: i64, front: &str, back: Option<&str>) -> Self {
        self.imprints
            .push((id, front.to_string(), back.map(String::from)));
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    fn check(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(PillboxError::Internal(message.clone())),
            None => Ok(()),
        }
    }

    fn pill(&self, id: i64) -> Option<PillRecord> {
        self.pills.iter().find(|p| p.id == id).cloned()
    }

    fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
        items
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect()
    }
}

pub fn pill(id: i64, name: &str, engname: &str) -> PillRecord {
    PillRecord {
        id,
        name: name.to_string(),
        engname: Some(engname.to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl PillCatalog for InMemoryCatalog {
    async fn get_pill_by_id(&self, id: i64) -> Result<Option<PillRecord>> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.pill(id))
    }

    async fn list_pills(
        &self,
        page: Page,
        _sort_by: PillSortField,
        _order: SortOrder,
    ) -> Result<(Vec<PillSummary>, u64)> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let summaries = self
            .pills
            .iter()
            .map(|p| PillSummary {
                pill: p.clone(),
                favorite_count: self.favorites.iter().filter(|&&f| f == p.id).count() as i64,
            })
            .collect();
        Ok((Self::paginate(summaries, page), self.pills.len() as u64))
    }

    async fn search_by_name_prefix(
        &self,
        text: &str,
        field: NameField,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let needle = text.to_ascii_lowercase();
        let found = self
            .pills
            .iter()
            .filter(|p| {
                let value = match field {
                    NameField::Name => Some(p.name.as_str()),
                    NameField::Engname => p.engname.as_deref(),
                };
                value.is_some_and(|v| v.to_ascii_lowercase().starts_with(&needle))
            })
            .cloned()
            .collect();
        Ok(Self::paginate(found, page))
    }

    async fn search_by_efficacy(&self, terms: &[String], page: Page) -> Result<Vec<PillRecord>> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let found = self
            .pills
            .iter()
            .filter(|p| {
                let efficacy = p.efficacy.as_deref().unwrap_or_default().to_ascii_lowercase();
                terms.iter().all(|t| efficacy.contains(&t.to_ascii_lowercase()))
            })
            .cloned()
            .collect();
        Ok(Self::paginate(found, page))
    }

    async fn search_by_imprint(
        &self,
        front: &str,
        back: Option<&str>,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        self.calls.imprint.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let found = self
            .imprints
            .iter()
            .filter(|(_, f, b)| {
                f == front
                    && match back {
                        Some(back) => b.as_deref() == Some(back),
                        None => b.as_deref().unwrap_or_default().is_empty(),
                    }
            })
            .filter_map(|(id, _, _)| self.pill(*id))
            .collect();
        Ok(Self::paginate(found, page))
    }

    async fn search_by_engname_contains(
        &self,
        text: &str,
        page: Page,
    ) -> Result<Vec<PillRecord>> {
        self.calls.engname.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let needle = text.to_ascii_lowercase();
        let found = self
            .pills
            .iter()
            .filter(|p| {
                p.engname
                    .as_deref()
                    .is_some_and(|e| e.to_ascii_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(Self::paginate(found, page))
    }

    async fn favorite_count(&self, pill_id: i64) -> Result<u64> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.favorites.iter().filter(|&&f| f == pill_id).count() as u64)
    }

    async fn review_count(&self, pill_id: i64) -> Result<u64> {
        self.calls.other.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.reviews.iter().filter(|&&r| r == pill_id).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn folds_case_like_sqlite() {
        let catalog = InMemoryCatalog::with_pills(vec![pill(1, "에피돌", "ÉPIDOL Tab.")]);
        let page = Page::new(10, 0);

        let hits = catalog.search_by_engname_contains("pidol", page).await.unwrap();
        assert_eq!(hits.len(), 1);

        let hits = catalog.search_by_engname_contains("épidol", page).await.unwrap();
        assert!(hits.is_empty());
    }
}
