//! DETR (ResNet-50) object detector trained on COCO.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use ort::value::Value;

use crate::error::ModelError;
use crate::math::softmax;
use crate::models::ObjectDetector;
use crate::types::{BoundingBox, DetectionPrediction};

use super::labels::Labels;
use super::preprocess::{into_ort_parts, preprocess, Resize, IMAGENET};
use super::session::{run_blocking, SharedSession};
use super::{CONFIG_FILENAME, MODEL_FILENAME};

/// Placeholder entries in the COCO label table.
const UNUSED_LABEL: &str = "N/A";

pub struct DetrDetector {
    session: SharedSession,
    labels: Arc<Labels>,
    image_size: u32,
    min_score: f32,
}

impl DetrDetector {
    pub fn load(dir: &Path, image_size: u32, min_score: f32) -> Result<Self, ModelError> {
        let session = SharedSession::load(&dir.join(MODEL_FILENAME))?;
        let labels = Labels::load(&dir.join(CONFIG_FILENAME))?;

        Ok(Self {
            session,
            labels: Arc::new(labels),
            image_size,
            min_score,
        })
    }
}

#[async_trait]
impl ObjectDetector for DetrDetector {
    async fn detect(
        &self,
        image: &DynamicImage,
        max_results: usize,
    ) -> Result<Vec<DetectionPrediction>, ModelError> {
        let original_size = image.dimensions();
        let tensor = preprocess(image, Resize::LongestEdge(self.image_size), IMAGENET);
        let (shape, data) = into_ort_parts(&tensor);

        let session = self.session.clone();
        let labels = self.labels.clone();
        let min_score = self.min_score;

        run_blocking(move || {
            let (height, width) = (shape[2], shape[3]);
            let pixel_values = Value::from_array((shape, data))
                .map_err(|e| ModelError::new(format!("Failed to create input tensor: {e}")))?;

            let mut session_guard = session.lock()?;
            let run_result = if session.has_input("pixel_mask") {
                let mask = vec![1i64; (height * width) as usize];
                let pixel_mask = Value::from_array((vec![1, height, width], mask))
                    .map_err(|e| ModelError::new(format!("Failed to create mask tensor: {e}")))?;
                session_guard.run(ort::inputs![
                    "pixel_values" => pixel_values,
                    "pixel_mask" => pixel_mask
                ])
            } else {
                session_guard.run(ort::inputs!["pixel_values" => pixel_values])
            };
            let outputs =
                run_result.map_err(|e| ModelError::new(format!("ONNX inference failed: {e}")))?;

            let logits = outputs
                .iter()
                .find(|(name, _)| *name == "logits")
                .ok_or_else(|| ModelError::new("Detector did not produce logits"))?;
            let boxes = outputs
                .iter()
                .find(|(name, _)| *name == "pred_boxes")
                .ok_or_else(|| ModelError::new("Detector did not produce pred_boxes"))?;

            let (_shape, logits) = logits
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::new(format!("Failed to extract logits: {e}")))?;
            let (_shape, boxes) = boxes
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::new(format!("Failed to extract pred_boxes: {e}")))?;

            decode_detections(
                logits,
                boxes,
                &labels,
                original_size,
                min_score,
                max_results,
            )
        })
        .await
    }
}

/// Turn raw DETR outputs into scored, labelled, pixel-space detections.
///
/// `logits` is `[queries, classes + 1]` (last class is "no object") and
/// `boxes` is `[queries, 4]` as normalized `(cx, cy, w, h)`.
fn decode_detections(
    logits: &[f32],
    boxes: &[f32],
    labels: &Labels,
    (image_width, image_height): (u32, u32),
    min_score: f32,
    max_results: usize,
) -> Result<Vec<DetectionPrediction>, ModelError> {
    let queries = boxes.len() / 4;
    if queries == 0 || logits.len() % queries != 0 {
        return Err(ModelError::new(format!(
            "Mismatched detector outputs: {} logits for {} boxes",
            logits.len(),
            queries
        )));
    }
    let width = logits.len() / queries;
    if width < 2 {
        return Err(ModelError::new("Detector produced no object classes"));
    }

    let mut detections: Vec<DetectionPrediction> = logits
        .chunks(width)
        .zip(boxes.chunks(4))
        .filter_map(|(row, bbox)| {
            let probabilities = softmax(row);
            let (class, score) = probabilities[..width - 1]
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))?;

            if score < min_score {
                return None;
            }
            let label = labels.get(class).filter(|l| *l != UNUSED_LABEL)?;

            Some(DetectionPrediction::new(
                label,
                score,
                to_pixel_box(bbox, image_width as f32, image_height as f32),
            ))
        })
        .collect();

    detections.sort_by(|a, b| b.score().total_cmp(&a.score()));
    detections.truncate(max_results);
    Ok(detections)
}

fn to_pixel_box(bbox: &[f32], image_width: f32, image_height: f32) -> BoundingBox {
    let (cx, cy, w, h) = (bbox[0], bbox[1], bbox[2], bbox[3]);
    let x0 = ((cx - w / 2.0) * image_width).clamp(0.0, image_width);
    let y0 = ((cy - h / 2.0) * image_height).clamp(0.0, image_height);
    let x1 = ((cx + w / 2.0) * image_width).clamp(0.0, image_width);
    let y1 = ((cy + h / 2.0) * image_height).clamp(0.0, image_height);

    BoundingBox {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }
}
