//! MobileNetV2 image classifier.

use std::path::Path;

use async_trait::async_trait;
use image::DynamicImage;
use ort::value::Value;

use crate::error::ModelError;
use crate::math::softmax;
use crate::models::ImageClassifier;
use crate::types::ClassificationPrediction;

use super::labels::Labels;
use super::preprocess::{into_ort_parts, preprocess, Resize, MOBILENET};
use super::session::{run_blocking, SharedSession};
use super::{CONFIG_FILENAME, MODEL_FILENAME};

/// Google's export reserves class 0 for "no ImageNet class".
const BACKGROUND_LABEL: &str = "background";

pub struct MobileNetClassifier {
    session: SharedSession,
    input_name: String,
    labels: std::sync::Arc<Labels>,
    image_size: u32,
}

impl MobileNetClassifier {
    /// Load `model.onnx` and `config.json` from `dir`.
    pub fn load(dir: &Path, image_size: u32) -> Result<Self, ModelError> {
        let session = SharedSession::load(&dir.join(MODEL_FILENAME))?;
        let labels = Labels::load(&dir.join(CONFIG_FILENAME))?;
        let input_name = session.first_input_or("pixel_values");

        Ok(Self {
            session,
            input_name,
            labels: std::sync::Arc::new(labels),
            image_size,
        })
    }
}

#[async_trait]
impl ImageClassifier for MobileNetClassifier {
    async fn classify(
        &self,
        image: &DynamicImage,
        top_k: usize,
    ) -> Result<Vec<ClassificationPrediction>, ModelError> {
        let tensor = preprocess(image, Resize::Exact(self.image_size), MOBILENET);
        let (shape, data) = into_ort_parts(&tensor);

        let session = self.session.clone();
        let input_name = self.input_name.clone();
        let labels = self.labels.clone();

        run_blocking(move || {
            let input_value = Value::from_array((shape, data))
                .map_err(|e| ModelError::new(format!("Failed to create input tensor: {e}")))?;

            let mut session = session.lock()?;
            let outputs = session
                .run(ort::inputs![input_name.as_str() => input_value])
                .map_err(|e| ModelError::new(format!("ONNX inference failed: {e}")))?;

            let logits = outputs
                .iter()
                .find(|(name, _)| *name == "logits")
                .ok_or_else(|| ModelError::new("Model did not produce logits"))?;

            let (_shape, data) = logits
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::new(format!("Failed to extract logits tensor: {e}")))?;

            Ok(top_k_predictions(data, &labels, top_k))
        })
        .await
    }
}

/// Softmax the logits and keep the `top_k` most probable labelled classes.
fn top_k_predictions(logits: &[f32], labels: &Labels, top_k: usize) -> Vec<ClassificationPrediction> {
    let probabilities = softmax(logits);

    let mut ranked: Vec<(usize, f32)> = probabilities.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .filter_map(|(index, probability)| {
            labels
                .get(index)
                .filter(|label| *label != BACKGROUND_LABEL)
                .map(|label| ClassificationPrediction::new(label, probability))
        })
        .take(top_k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Labels {
        Labels::from_config_json(
            r#"{"id2label": {"0": "background", "1": "tench, Tinca tinca",
                "2": "goldfish, Carassius auratus", "3": "Labrador retriever"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_top_k_sorted_descending() {
        let predictions = top_k_predictions(&[0.0, 1.0, 3.0, 2.0], &labels(), 3);
        let names: Vec<&str> = predictions.iter().map(|p| p.label()).collect();
        assert_eq!(
            names,
            vec![
                "goldfish, Carassius auratus",
                "Labrador retriever",
                "tench, Tinca tinca"
            ]
        );
        assert!(predictions[0].probability() > predictions[1].probability());
    }

    #[test]
    fn test_background_class_skipped() {
        let predictions = top_k_predictions(&[9.0, 1.0, 0.0, 0.0], &labels(), 2);
        assert_eq!(predictions.len(), 2);
        assert!(predictions.iter().all(|p| p.label() != "background"));
    }

    #[test]
    fn test_top_k_larger_than_label_count() {
        let predictions = top_k_predictions(&[0.1, 0.2, 0.3, 0.4], &labels(), 50);
        assert_eq!(predictions.len(), 3);
    }
}
