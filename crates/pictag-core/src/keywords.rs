//! Zero-shot keyword extraction over a fixed vocabulary.

use std::sync::Arc;

use image::DynamicImage;

use crate::error::{ModelKind, RecognitionError};
use crate::models::ModelRegistry;
use crate::pipeline::ImageDecoder;
use crate::types::LabelScore;

/// The vocabulary every image is scored against, in scoring order.
pub const CANDIDATE_LABELS: [&str; 20] = [
    "nature",
    "mountain",
    "forest",
    "city",
    "cat",
    "dog",
    "sunset",
    "sky",
    "person",
    "portrait",
    "car",
    "flower",
    "tree",
    "landscape",
    "building",
    "street",
    "ocean",
    "night",
    "art",
    "minimalism",
];

/// Keywords returned per image.
pub const KEYWORD_COUNT: usize = 3;

/// Labels of the `n` highest scores, best first.
///
/// No score floor is applied; ties keep candidate order.
pub fn rank_keywords(mut scores: Vec<LabelScore>, n: usize) -> Vec<String> {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores.into_iter().take(n).map(|s| s.label).collect()
}

pub struct KeywordExtractor {
    registry: Arc<ModelRegistry>,
    decoder: ImageDecoder,
    candidates: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(registry: Arc<ModelRegistry>, decoder: ImageDecoder) -> Self {
        Self {
            registry,
            decoder,
            candidates: CANDIDATE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Top [`KEYWORD_COUNT`] vocabulary labels for `image`.
    pub async fn extract_keywords(&self, image: &DynamicImage) -> Result<Vec<String>, RecognitionError> {
        let scorer = self.registry.ensure_zero_shot_ready().await?;

        let scores = scorer
            .score(image, &self.candidates)
            .await
            .map_err(|source| RecognitionError::Inference {
                model: ModelKind::ZeroShot,
                source,
            })?;

        let keywords = rank_keywords(scores, KEYWORD_COUNT);
        tracing::debug!("Keywords: {:?}", keywords);
        Ok(keywords)
    }

    pub async fn extract_keywords_from_bytes(
        &self,
        bytes: Vec<u8>,
        source_name: &str,
    ) -> Result<Vec<String>, RecognitionError> {
        let decoded = self.decoder.decode_bytes(bytes, source_name).await?;
        self.extract_keywords(&decoded.image).await
    }
}
