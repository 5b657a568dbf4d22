//! Lazy, single-flight cache of loaded model handles.

use std::sync::Arc;

use crate::error::{ModelKind, RecognitionError};

use super::single_flight::SingleFlight;
use super::{ImageClassifier, ModelLoader, ObjectDetector, ZeroShotScorer};

/// The two handles the inference coordinator needs.
#[derive(Clone)]
pub struct RecognitionModels {
    pub classifier: Arc<dyn ImageClassifier>,
    pub detector: Arc<dyn ObjectDetector>,
}

/// Owns the classifier, detector and zero-shot handles.
///
/// Each slot is loaded on first use and kept for the registry's lifetime.
/// Concurrent requests for a slot that is still loading share that load.
pub struct ModelRegistry {
    loader: Arc<dyn ModelLoader>,
    classifier: SingleFlight<dyn ImageClassifier>,
    detector: SingleFlight<dyn ObjectDetector>,
    zero_shot: SingleFlight<dyn ZeroShotScorer>,
}

impl ModelRegistry {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            classifier: SingleFlight::new(),
            detector: SingleFlight::new(),
            zero_shot: SingleFlight::new(),
        }
    }

    /// Ensure the classifier and detector are loaded, loading both
    /// concurrently if needed.
    ///
    /// On failure the failing slot stays unloaded; the next call tries again.
    pub async fn ensure_ready(&self) -> Result<RecognitionModels, RecognitionError> {
        if let Some(models) = self.loaded() {
            return Ok(models);
        }

        tracing::debug!("Loading recognition models");

        let classifier = async {
            let loader = self.loader.clone();
            self.classifier
                .get_or_load(move || async move { loader.load_classifier().await })
                .await
                .map_err(|source| RecognitionError::ModelInit {
                    model: ModelKind::Classifier,
                    source,
                })
        };
        let detector = async {
            let loader = self.loader.clone();
            self.detector
                .get_or_load(move || async move { loader.load_detector().await })
                .await
                .map_err(|source| RecognitionError::ModelInit {
                    model: ModelKind::Detector,
                    source,
                })
        };

        let (classifier, detector) = tokio::try_join!(classifier, detector).inspect_err(|e| {
            tracing::error!("Model initialization failed: {e}");
        })?;

        Ok(RecognitionModels {
            classifier,
            detector,
        })
    }

    /// Ensure the zero-shot pipeline is loaded. Independent of the
    /// classifier and detector.
    pub async fn ensure_zero_shot_ready(
        &self,
    ) -> Result<Arc<dyn ZeroShotScorer>, RecognitionError> {
        let loader = self.loader.clone();
        self.zero_shot
            .get_or_load(move || async move { loader.load_zero_shot().await })
            .await
            .map_err(|source| {
                tracing::error!("Zero-shot model initialization failed: {source}");
                RecognitionError::ModelInit {
                    model: ModelKind::ZeroShot,
                    source,
                }
            })
    }

    /// True once both the classifier and the detector are loaded.
    pub fn is_ready(&self) -> bool {
        self.loaded().is_some()
    }

    /// True once the zero-shot pipeline is loaded.
    pub fn is_zero_shot_ready(&self) -> bool {
        self.zero_shot.get().is_some()
    }

    fn loaded(&self) -> Option<RecognitionModels> {
        Some(RecognitionModels {
            classifier: self.classifier.get()?,
            detector: self.detector.get()?,
        })
    }
}
