use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{PillRecord, PillSummary};

/// One span returned by a text-detection provider.
///
/// Providers return these in order; the first entry is conventionally the
/// aggregate text of the whole image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl TextAnnotation {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            locale: None,
        }
    }
}

/// A cleaned text token that survived the extractor's noise filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextFragment(String);

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for TextFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TextFragment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Pagination window: `limit` rows after skipping `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

/// Front/back imprint pair used for the structured lookup tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprintPair {
    pub front: String,
    pub back: Option<String>,
}

impl ImprintPair {
    /// Reads `fragments[0]` as the front face and `fragments[1]` as the back.
    pub fn from_fragments(fragments: &[TextFragment]) -> Option<Self> {
        let front = fragments.first()?;
        if front.is_blank() {
            return None;
        }
        let back = fragments
            .get(1)
            .filter(|f| !f.is_blank())
            .map(|f| f.as_str().to_string());

        Some(Self {
            front: front.as_str().to_string(),
            back,
        })
    }
}

/// Deduplicated result of a pill search.
///
/// `pills` never holds two records with the same id and `total` always equals
/// `pills.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillSearchResult {
    pub pills: Vec<PillRecord>,
    pub total: usize,
    pub limit: u32,
    pub offset: u32,
}

impl PillSearchResult {
    pub fn empty(page: Page) -> Self {
        Self {
            pills: Vec::new(),
            total: 0,
            limit: page.limit,
            offset: page.offset,
        }
    }

    /// Collapses candidates by id. A later duplicate replaces the earlier
    /// record in place, so output order follows first insertion.
    pub fn from_candidates(candidates: Vec<PillRecord>, page: Page) -> Self {
        let mut positions: HashMap<i64, usize> = HashMap::with_capacity(candidates.len());
        let mut pills: Vec<PillRecord> = Vec::with_capacity(candidates.len());

        for pill in candidates {
            match positions.get(&pill.id) {
                Some(&idx) => pills[idx] = pill,
                None => {
                    positions.insert(pill.id, pills.len());
                    pills.push(pill);
                }
            }
        }

        Self {
            total: pills.len(),
            pills,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillListing {
    pub pills: Vec<PillSummary>,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PillListing {
    pub fn new(pills: Vec<PillSummary>, total_count: u64, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_count.div_ceil(u64::from(limit))
        };
        Self {
            pills,
            total_count,
            total_pages,
        }
    }
}
