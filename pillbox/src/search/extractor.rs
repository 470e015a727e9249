use std::sync::Arc;

use tracing::debug;

use crate::error::{PillboxError, Result};
use crate::models::TextFragment;
use crate::vision::TextDetector;

/// Dosage strings ("500mg (x10)") and dotted tokens ("X.Y") are packaging
/// noise, never imprints.
pub fn is_noise(text: &str) -> bool {
    text.contains(['.', '(', ')'])
}

#[derive(Clone)]
pub struct TextExtractor {
    detector: Arc<dyn TextDetector>,
}

impl TextExtractor {
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self { detector }
    }

    /// Detects text in `image_bytes` and keeps the annotations that survive
    /// the noise filter, in provider order. No detected text is an empty
    /// result, not an error.
    pub async fn extract(&self, image_bytes: &[u8]) -> Result<Vec<TextFragment>> {
        let annotations = self
            .detector
            .detect_text(image_bytes)
            .await
            .map_err(|e| match e {
                PillboxError::VisionService(_) | PillboxError::VisionUnavailable(_) => e,
                other => PillboxError::VisionService(other.to_string()),
            })?;

        if annotations.is_empty() {
            debug!("No text detected in image");
            return Ok(Vec::new());
        }

        let fragments: Vec<TextFragment> = annotations
            .into_iter()
            .map(|a| a.description)
            .filter(|text| !is_noise(text))
            .map(|text| TextFragment::new(text.trim()))
            .collect();

        debug!(count = fragments.len(), ?fragments, "Extracted text fragments");
        Ok(fragments)
    }
}
