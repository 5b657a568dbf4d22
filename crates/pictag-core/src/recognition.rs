//! Runs the classifier and detector over one image.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;

use crate::config::RecognitionConfig;
use crate::error::{ModelKind, RecognitionError};
use crate::models::ModelRegistry;
use crate::pipeline::ImageDecoder;
use crate::types::RecognitionResult;

/// Produces a [`RecognitionResult`] from an image.
///
/// Both model calls are issued concurrently on the caller's task and joined;
/// the first failure aborts the call and the other result is discarded.
pub struct InferenceCoordinator {
    registry: Arc<ModelRegistry>,
    config: RecognitionConfig,
    decoder: ImageDecoder,
}

impl InferenceCoordinator {
    pub fn new(registry: Arc<ModelRegistry>, config: RecognitionConfig, decoder: ImageDecoder) -> Self {
        Self {
            registry,
            config,
            decoder,
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub async fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, RecognitionError> {
        let models = self.registry.ensure_ready().await?;
        let start = Instant::now();

        let classify = async {
            models
                .classifier
                .classify(image, self.config.classification_top_k)
                .await
                .map_err(|source| RecognitionError::Inference {
                    model: ModelKind::Classifier,
                    source,
                })
        };
        let detect = async {
            models
                .detector
                .detect(image, self.config.detection_max_results)
                .await
                .map_err(|source| RecognitionError::Inference {
                    model: ModelKind::Detector,
                    source,
                })
        };

        let (mut classification, mut object_detection) = tokio::try_join!(classify, detect)?;
        classification.truncate(self.config.classification_top_k);
        object_detection.truncate(self.config.detection_max_results);

        tracing::debug!(
            "Recognized {} classes and {} objects in {:?}",
            classification.len(),
            object_detection.len(),
            start.elapsed()
        );

        Ok(RecognitionResult::new(classification, object_detection))
    }

    /// Decode `bytes` and recognize the result.
    ///
    /// Decode failures are reported before any model is touched.
    pub async fn recognize_bytes(
        &self,
        bytes: Vec<u8>,
        source_name: &str,
    ) -> Result<RecognitionResult, RecognitionError> {
        let decoded = self.decoder.decode_bytes(bytes, source_name).await?;
        tracing::trace!(
            "Decoded {} ({}x{})",
            source_name,
            decoded.width,
            decoded.height
        );
        self.recognize(&decoded.image).await
    }
}
