//! Name synthesis: recognition output → one display name.
//!
//! A strict priority chain. A confident classification always wins; the
//! detector only names the image when the classifier is unsure, and the
//! fallback covers everything else.

use serde::{Deserialize, Serialize};

use crate::types::RecognitionResult;

use super::text::format_class_name;

/// Top-1 classification must score strictly above this to name the image.
pub const CLASSIFICATION_NAME_THRESHOLD: f32 = 0.5;

/// Detections must score strictly above this to appear in a composite name.
pub const DETECTION_NAME_THRESHOLD: f32 = 0.7;

/// At most this many detections are joined into a composite name.
const MAX_NAMED_DETECTIONS: usize = 2;

/// Fixed strings used to build names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameStyle {
    /// Name used when recognition gives nothing usable
    pub fallback: String,

    /// Placed between detected object names
    pub connector: String,

    /// Appended after the detected object names
    pub suffix: String,
}

impl Default for NameStyle {
    fn default() -> Self {
        Self {
            fallback: "Beautiful Wallpaper".to_string(),
            connector: " and ".to_string(),
            suffix: " Scene".to_string(),
        }
    }
}

/// Name an image using the default [`NameStyle`].
pub fn synthesize_name(result: &RecognitionResult) -> String {
    synthesize_name_with(result, &NameStyle::default())
}

/// Name an image using the given style.
pub fn synthesize_name_with(result: &RecognitionResult, style: &NameStyle) -> String {
    if result.is_empty() {
        return style.fallback.clone();
    }

    if let Some(top) = result.top_classification() {
        if top.probability() > CLASSIFICATION_NAME_THRESHOLD {
            let primary = top.label().split(',').next().unwrap_or_default();
            let name = format_class_name(primary);
            if !name.is_empty() {
                return name;
            }
        }
    }

    let objects: Vec<String> = result
        .object_detection
        .iter()
        .filter(|d| d.score() > DETECTION_NAME_THRESHOLD)
        .map(|d| format_class_name(d.class_label()))
        .filter(|name| !name.is_empty())
        .take(MAX_NAMED_DETECTIONS)
        .collect();

    if objects.is_empty() {
        return style.fallback.clone();
    }

    format!("{}{}", objects.join(&style.connector), style.suffix)
}
