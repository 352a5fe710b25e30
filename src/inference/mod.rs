//! Frame classification.
//!
//! Wraps the ONNX runtime behind a small adapter: a frame goes in, a ranked
//! list of (species, confidence) pairs comes out. The classifier is treated
//! as a black box by the rest of the crate; per-frame inference errors are
//! equivalent to "no detection" at the call site.

mod engine;
mod labels;

pub use engine::{ImageClassifier, init_runtime};
pub use labels::read_labels;

use chrono::{DateTime, Local};

/// A single ranked prediction for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPrediction {
    /// Species label from the model's label file.
    pub label: String,
    /// Confidence score in [0, 1].
    pub confidence: f32,
}

/// Classification results for one camera frame.
///
/// Immutable once produced; the visit debouncer and the consensus aggregator
/// both read it in the same processing step.
#[derive(Debug, Clone)]
pub struct ClassifiedFrame {
    /// Predictions ordered by descending confidence, truncated to top-K and
    /// filtered by the confidence threshold. Empty means no detection.
    pub ranked: Vec<RankedPrediction>,
    /// Wall-clock time the frame was classified.
    pub timestamp: DateTime<Local>,
}

impl ClassifiedFrame {
    /// The top-1 prediction, if any.
    pub fn top(&self) -> Option<&RankedPrediction> {
        self.ranked.first()
    }

    /// Labels of all ranked predictions, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.ranked.iter().map(|p| p.label.as_str()).collect()
    }
}
