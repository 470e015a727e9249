//! Pill identification from detected text.
//!
//! [`TextExtractor`] turns an image into cleaned fragments via a
//! [`TextDetector`](crate::vision::TextDetector); [`CandidateMatcher`] resolves
//! fragments to catalog records, first by exact imprint pair and, when that
//! finds nothing, by english-name substring per fragment.

mod extractor;
mod matcher;

pub use extractor::{is_noise, TextExtractor};
pub use matcher::CandidateMatcher;
