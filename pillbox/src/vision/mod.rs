//! Text detection for pill photographs.
//!
//! Backends are picked from `VisionConfig::model` by provider prefix:
//! - `google/...` calls Cloud Vision `images:annotate` with TEXT_DETECTION
//! - `openai/<model>` asks an OpenAI-compatible vision chat model to transcribe
//!   the printed text
//!
//! A provider that cannot be configured (missing key, unknown prefix) stays
//! constructible and reports itself unavailable; every detection call then
//! fails with `VisionUnavailable`.

mod api;
mod preprocessing;
mod provider;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::TextAnnotation;

pub use preprocessing::preprocess_image;
pub use provider::VisionProvider;

/// Capability to find printed text in an image.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Returns annotations in provider order. Element 0, when present, is the
    /// aggregate text of the whole image.
    async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextAnnotation>>;

    fn is_available(&self) -> bool {
        true
    }
}
