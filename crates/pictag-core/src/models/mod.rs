//! Model interfaces and lifecycle.
//!
//! The recognition engine talks to three pretrained models through the
//! traits below. A [`ModelRegistry`] owns the loaded handles and loads each
//! one lazily through an injected [`ModelLoader`]; the ONNX Runtime backends
//! in [`onnx`] are the production implementation.

pub mod onnx;
pub mod registry;
mod single_flight;

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::ModelError;
use crate::types::{ClassificationPrediction, DetectionPrediction, LabelScore};

pub use registry::{ModelRegistry, RecognitionModels};

/// Whole-image label predictor.
///
/// Uses `async_trait` so handles can be shared as `Arc<dyn ImageClassifier>`.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Return up to `top_k` predictions, descending by probability.
    async fn classify(
        &self,
        image: &DynamicImage,
        top_k: usize,
    ) -> Result<Vec<ClassificationPrediction>, ModelError>;
}

/// Multi-object detector.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Return up to `max_results` detections. Callers must not rely on order.
    async fn detect(
        &self,
        image: &DynamicImage,
        max_results: usize,
    ) -> Result<Vec<DetectionPrediction>, ModelError>;
}

/// Text–image similarity model scoring an image against free-text labels.
#[async_trait]
pub trait ZeroShotScorer: Send + Sync {
    /// Return one score per candidate, in candidate order.
    async fn score(
        &self,
        image: &DynamicImage,
        candidates: &[String],
    ) -> Result<Vec<LabelScore>, ModelError>;
}

/// Source of model handles for the registry.
///
/// Loading may be slow (large files, network, session setup). The registry
/// guarantees each method is in flight at most once per slot at a time.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load_classifier(&self) -> Result<Arc<dyn ImageClassifier>, ModelError>;

    async fn load_detector(&self) -> Result<Arc<dyn ObjectDetector>, ModelError>;

    async fn load_zero_shot(&self) -> Result<Arc<dyn ZeroShotScorer>, ModelError>;
}
