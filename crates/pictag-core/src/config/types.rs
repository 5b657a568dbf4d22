//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.pictag/models"),
        }
    }
}

/// Batch processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of images recognized concurrently in a batch
    pub parallel_workers: usize,

    /// File extensions picked up when walking a directory
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 4,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Deadline for one recognition or keyword call, model loading included
    pub inference_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            inference_timeout_ms: 120_000,
        }
    }
}

/// Output caps for the two recognition models.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Classifier predictions kept per image
    pub classification_top_k: usize,

    /// Detector predictions kept per image
    pub detection_max_results: usize,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            classification_top_k: 5,
            detection_max_results: 10,
        }
    }
}

/// Model selection, one sub-table per slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub classifier: ClassifierConfig,
    pub detector: DetectorConfig,
    pub zero_shot: ZeroShotConfig,
}

/// Image classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Directory name under `model_dir`
    pub model: String,

    /// Square input size in pixels
    pub image_size: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: "mobilenet_v2_1.0_224".to_string(),
            image_size: 224,
        }
    }
}

/// Object detector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Directory name under `model_dir`
    pub model: String,

    /// Longest edge of the image fed to the detector
    pub image_size: u32,

    /// Detections scoring below this are dropped by the detector itself
    pub min_score: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model: "detr-resnet-50".to_string(),
            image_size: 800,
            min_score: 0.5,
        }
    }
}

/// Zero-shot (CLIP) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroShotConfig {
    /// Directory name under `model_dir`
    pub model: String,

    /// Square input size in pixels
    pub image_size: u32,
}

impl Default for ZeroShotConfig {
    fn default() -> Self {
        Self {
            model: "clip-vit-base-patch32".to_string(),
            image_size: 224,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
