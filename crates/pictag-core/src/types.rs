//! Core data types for recognition results and suggestions.
//!
//! Predictions are produced by the model backends, collected into a
//! [`RecognitionResult`], and turned into tags and a name by the synthesizers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::synthesis::TagSet;

/// Clamp a model score into [0, 1]. NaN becomes 0.
fn unit_interval(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One whole-image classification.
///
/// The label is free text and may hold comma-separated synonyms
/// (e.g. "tabby, tabby cat").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationPrediction {
    label: String,
    probability: f32,
}

impl ClassificationPrediction {
    pub fn new(label: impl Into<String>, probability: f32) -> Self {
        Self {
            label: label.into(),
            probability: unit_interval(probability),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn probability(&self) -> f32 {
        self.probability
    }
}

/// Axis-aligned box in source-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One detected object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionPrediction {
    class_label: String,
    score: f32,
    bounding_box: BoundingBox,
}

impl DetectionPrediction {
    pub fn new(class_label: impl Into<String>, score: f32, bounding_box: BoundingBox) -> Self {
        Self {
            class_label: class_label.into(),
            score: unit_interval(score),
            bounding_box,
        }
    }

    pub fn class_label(&self) -> &str {
        &self.class_label
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }
}

/// Combined output of the classifier and the detector for one image.
///
/// Either side may be empty; an empty side is a valid model output, not a
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecognitionResult {
    /// Descending by probability; index 0 is the best classification
    pub classification: Vec<ClassificationPrediction>,

    /// No order guaranteed
    pub object_detection: Vec<DetectionPrediction>,
}

impl RecognitionResult {
    pub fn new(
        classification: Vec<ClassificationPrediction>,
        object_detection: Vec<DetectionPrediction>,
    ) -> Self {
        Self {
            classification,
            object_detection,
        }
    }

    /// True when neither model reported anything.
    pub fn is_empty(&self) -> bool {
        self.classification.is_empty() && self.object_detection.is_empty()
    }

    /// The highest-ranked classification, if any.
    pub fn top_classification(&self) -> Option<&ClassificationPrediction> {
        self.classification.first()
    }
}

/// A zero-shot score for one candidate label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Tags and a display name for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub tags: TagSet,
    pub name: String,
}

/// Everything the CLI reports for one image file.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSuggestion {
    // === File Identification ===
    /// Path to the source file
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// BLAKE3 hash of the file contents
    pub content_hash: String,

    // === Image Properties ===
    pub width: u32,
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    // === Suggestions ===
    pub tags: TagSet,
    pub name: String,

    /// Zero-shot keywords (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,

    /// Raw model output (only when requested)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition: Option<RecognitionResult>,
}

/// Statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Total images tagged successfully
    pub succeeded: usize,

    /// Total images that failed
    pub failed: usize,

    /// Images per second
    pub images_per_second: f64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}
