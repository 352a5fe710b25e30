//! ONNX classifier wrapper around ort.

use crate::config::{DetectionConfig, ModelConfig};
use crate::error::{Error, Result};
use crate::inference::{ClassifiedFrame, RankedPrediction, read_labels};
use chrono::{DateTime, Local};
use image::{DynamicImage, imageops::FilterType};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use tracing::info;

/// Initialize the ONNX runtime environment. Must be called once at startup.
pub fn init_runtime() {
    ort::init().commit();
}

/// Image classifier producing ranked species predictions per frame.
pub struct ImageClassifier {
    session: Session,
    labels: Vec<String>,
    output_name: String,
    input_width: u32,
    input_height: u32,
    top_k: usize,
    threshold: f32,
}

impl ImageClassifier {
    /// Build a classifier from the resolved model and detection settings.
    ///
    /// Model layout problems (missing files, more than one input or output
    /// tensor) are fatal here, before any frame is processed.
    pub fn from_config(model: &ModelConfig, detection: &DetectionConfig) -> Result<Self> {
        let path = model
            .path
            .as_ref()
            .ok_or_else(|| Error::ConfigValidation {
                message: "no model path specified".to_string(),
            })?;
        let labels_path = model
            .labels
            .as_ref()
            .ok_or_else(|| Error::ConfigValidation {
                message: "no labels path specified".to_string(),
            })?;

        let labels = read_labels(labels_path)?;

        let builder = Session::builder().map_err(|e| Error::ClassifierBuild {
            reason: e.to_string(),
        })?;
        let mut builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::ClassifierBuild {
                reason: e.to_string(),
            })?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| Error::ClassifierBuild {
                reason: e.to_string(),
            })?;

        if session.inputs().len() != 1 {
            return Err(Error::ModelShape {
                message: format!(
                    "classification model should have exactly 1 input tensor, this model has {}",
                    session.inputs().len()
                ),
            });
        }
        if session.outputs().len() != 1 {
            return Err(Error::ModelShape {
                message: format!(
                    "classification model should have exactly 1 output tensor, this model has {}",
                    session.outputs().len()
                ),
            });
        }
        let output_name = session.outputs()[0].name().to_string();

        info!(
            "Loaded model: {} ({} labels, input {}x{})",
            path.display(),
            labels.len(),
            model.input_width,
            model.input_height
        );

        Ok(Self {
            session,
            labels,
            output_name,
            input_width: model.input_width,
            input_height: model.input_height,
            top_k: detection.top_k,
            threshold: detection.threshold,
        })
    }

    /// Classify a single camera frame.
    ///
    /// Returns ranked predictions above the confidence threshold, truncated
    /// to top-K. An empty `ranked` list means no detection.
    pub fn classify(
        &mut self,
        image: &DynamicImage,
        now: DateTime<Local>,
    ) -> Result<ClassifiedFrame> {
        let tensor = self.build_input(image)?;

        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let value = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| Error::Inference {
                reason: format!("model output '{}' missing from results", self.output_name),
            })?;
        let (_, scores) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        let ranked = rank_scores(scores, &self.labels, self.top_k, self.threshold);

        Ok(ClassifiedFrame {
            ranked,
            timestamp: now,
        })
    }

    /// Resize and normalize a frame into an NHWC float tensor.
    fn build_input(&self, image: &DynamicImage) -> Result<Tensor<f32>> {
        let resized = image
            .resize_exact(self.input_width, self.input_height, FilterType::Nearest)
            .to_rgb8();

        let data: Vec<f32> = resized
            .as_raw()
            .iter()
            .map(|&b| f32::from(b) / 255.0)
            .collect();

        Tensor::from_array((
            [
                1,
                self.input_height as usize,
                self.input_width as usize,
                3,
            ],
            data,
        ))
        .map_err(|e| Error::Inference {
            reason: e.to_string(),
        })
    }
}

/// Rank raw model scores: pair with labels, sort descending, apply the
/// confidence threshold, truncate to top-K.
fn rank_scores(
    scores: &[f32],
    labels: &[String],
    top_k: usize,
    threshold: f32,
) -> Vec<RankedPrediction> {
    let mut indexed: Vec<(usize, f32)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, score)| score >= threshold)
        .collect();

    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(top_k);

    indexed
        .into_iter()
        .map(|(index, confidence)| {
            let label = labels
                .get(index)
                .filter(|l| !l.is_empty())
                .map_or_else(|| format!("class {index}"), Clone::clone);
            RankedPrediction { label, confidence }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec![
            "background".to_string(),
            "Cardinalis cardinalis (Northern Cardinal)".to_string(),
            "Cyanocitta cristata (Blue Jay)".to_string(),
        ]
    }

    #[test]
    fn test_rank_scores_orders_by_confidence() {
        let ranked = rank_scores(&[0.1, 0.9, 0.5], &labels(), 3, 0.0);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].label, "Cardinalis cardinalis (Northern Cardinal)");
        assert_eq!(ranked[1].label, "Cyanocitta cristata (Blue Jay)");
    }

    #[test]
    fn test_rank_scores_applies_threshold() {
        let ranked = rank_scores(&[0.1, 0.9, 0.5], &labels(), 3, 0.4);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|p| p.confidence >= 0.4));
    }

    #[test]
    fn test_rank_scores_truncates_to_top_k() {
        let ranked = rank_scores(&[0.6, 0.9, 0.5], &labels(), 1, 0.0);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].label, "Cardinalis cardinalis (Northern Cardinal)");
    }

    #[test]
    fn test_rank_scores_empty_when_all_below_threshold() {
        let ranked = rank_scores(&[0.1, 0.2, 0.3], &labels(), 3, 0.4);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_rank_scores_unknown_index_gets_placeholder() {
        let ranked = rank_scores(&[0.0, 0.0, 0.0, 0.9], &labels(), 1, 0.4);
        assert_eq!(ranked[0].label, "class 3");
    }

    #[test]
    fn test_from_config_requires_model_path() {
        let model = ModelConfig::default();
        let result = ImageClassifier::from_config(&model, &DetectionConfig::default());
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_from_config_requires_labels_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"stub").unwrap();

        let model = ModelConfig {
            path: Some(path),
            ..ModelConfig::default()
        };
        let result = ImageClassifier::from_config(&model, &DetectionConfig::default());
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }
}
