//! CLIP (ViT-B/32) zero-shot scorer.
//!
//! Image and candidate labels are embedded by separate ONNX graphs; scores
//! are a softmax over the scaled cosine similarities, so they sum to 1
//! across the candidate list.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::DynamicImage;
use ort::value::Value;
use tokenizers::Tokenizer;

use crate::error::ModelError;
use crate::math::{dot, l2_normalize, softmax};
use crate::models::ZeroShotScorer;
use crate::types::LabelScore;

use super::preprocess::{into_ort_parts, preprocess, Resize, CLIP};
use super::session::{run_blocking, SharedSession};
use super::{TEXT_MODEL_FILENAME, TOKENIZER_FILENAME, VISION_MODEL_FILENAME};

/// CLIP's learned temperature, `exp(logit_scale)`.
const LOGIT_SCALE: f32 = 100.0;

/// CLIP's context window.
const MAX_TOKENS: usize = 77;

type TextEmbeddings = Arc<Vec<Vec<f32>>>;

pub struct ClipZeroShot {
    vision: SharedSession,
    text: SharedSession,
    tokenizer: Arc<Tokenizer>,
    image_size: u32,
    /// Embeddings for the most recent candidate list.
    text_cache: Mutex<Option<(Vec<String>, TextEmbeddings)>>,
}

impl ClipZeroShot {
    pub fn load(dir: &Path, image_size: u32) -> Result<Self, ModelError> {
        let vision = SharedSession::load(&dir.join(VISION_MODEL_FILENAME))?;
        let text = SharedSession::load(&dir.join(TEXT_MODEL_FILENAME))?;

        let tokenizer_path = dir.join(TOKENIZER_FILENAME);
        if !tokenizer_path.exists() {
            return Err(ModelError::new(format!(
                "Tokenizer not found at {}. Run `pictag models download` first.",
                tokenizer_path.display()
            )));
        }
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::new(format!("Failed to load tokenizer: {e}")))?;

        Ok(Self {
            vision,
            text,
            tokenizer: Arc::new(tokenizer),
            image_size,
            text_cache: Mutex::new(None),
        })
    }

    async fn embed_image(&self, image: &DynamicImage) -> Result<Vec<f32>, ModelError> {
        let tensor = preprocess(image, Resize::CenterCrop(self.image_size), CLIP);
        let (shape, data) = into_ort_parts(&tensor);
        let session = self.vision.clone();

        run_blocking(move || {
            let pixel_values = Value::from_array((shape, data))
                .map_err(|e| ModelError::new(format!("Failed to create input tensor: {e}")))?;

            let mut session = session.lock()?;
            let outputs = session
                .run(ort::inputs!["pixel_values" => pixel_values])
                .map_err(|e| ModelError::new(format!("Vision encoder inference failed: {e}")))?;

            let embeds = outputs
                .iter()
                .find(|(name, _)| *name == "image_embeds")
                .ok_or_else(|| ModelError::new("Vision encoder did not produce image_embeds"))?;

            let (_shape, data) = embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::new(format!("Failed to extract image_embeds: {e}")))?;

            Ok(l2_normalize(data))
        })
        .await
    }

    async fn embed_texts(&self, candidates: &[String]) -> Result<TextEmbeddings, ModelError> {
        if let Some(cached) = self.cached_texts(candidates) {
            return Ok(cached);
        }

        let session = self.text.clone();
        let tokenizer = self.tokenizer.clone();
        let texts = candidates.to_vec();

        let embeddings = run_blocking(move || {
            let encodings = tokenizer
                .encode_batch(texts.clone(), true)
                .map_err(|e| ModelError::new(format!("Tokenization failed: {e}")))?;
            let token_ids: Vec<Vec<u32>> = encodings.iter().map(|e| e.get_ids().to_vec()).collect();
            let (shape, input_ids, attention_mask) = pad_token_batch(&token_ids);

            let ids_value = Value::from_array((shape.clone(), input_ids))
                .map_err(|e| ModelError::new(format!("Failed to create input tensor: {e}")))?;

            let mut session_guard = session.lock()?;
            let run_result = if session.has_input("attention_mask") {
                let mask_value = Value::from_array((shape, attention_mask))
                    .map_err(|e| ModelError::new(format!("Failed to create mask tensor: {e}")))?;
                session_guard.run(ort::inputs![
                    "input_ids" => ids_value,
                    "attention_mask" => mask_value
                ])
            } else {
                session_guard.run(ort::inputs!["input_ids" => ids_value])
            };
            let outputs = run_result
                .map_err(|e| ModelError::new(format!("Text encoder inference failed: {e}")))?;

            let embeds = outputs
                .iter()
                .find(|(name, _)| *name == "text_embeds")
                .ok_or_else(|| ModelError::new("Text encoder did not produce text_embeds"))?;

            let (_shape, data) = embeds
                .1
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::new(format!("Failed to extract text_embeds: {e}")))?;

            let dim = data.len() / texts.len();
            if dim == 0 {
                return Err(ModelError::new("Text encoder produced empty embeddings"));
            }
            Ok(data.chunks(dim).map(l2_normalize).collect::<Vec<_>>())
        })
        .await?;

        let embeddings = Arc::new(embeddings);
        if let Ok(mut cache) = self.text_cache.lock() {
            *cache = Some((candidates.to_vec(), embeddings.clone()));
        }
        Ok(embeddings)
    }

    fn cached_texts(&self, candidates: &[String]) -> Option<TextEmbeddings> {
        let cache = self.text_cache.lock().ok()?;
        match cache.as_ref() {
            Some((labels, embeddings)) if labels.as_slice() == candidates => {
                Some(embeddings.clone())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl ZeroShotScorer for ClipZeroShot {
    async fn score(
        &self,
        image: &DynamicImage,
        candidates: &[String],
    ) -> Result<Vec<LabelScore>, ModelError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let image_embedding = self.embed_image(image).await?;
        let text_embeddings = self.embed_texts(candidates).await?;

        Ok(label_scores(&image_embedding, &text_embeddings, candidates))
    }
}

/// Right-pad token sequences with id 0 into `[batch, len]` id and mask tensors.
fn pad_token_batch(token_ids: &[Vec<u32>]) -> (Vec<i64>, Vec<i64>, Vec<i64>) {
    let len = token_ids
        .iter()
        .map(|ids| ids.len().min(MAX_TOKENS))
        .max()
        .unwrap_or(0)
        .max(1);

    let mut input_ids = vec![0i64; token_ids.len() * len];
    let mut attention_mask = vec![0i64; token_ids.len() * len];
    for (row, ids) in token_ids.iter().enumerate() {
        for (col, &id) in ids.iter().take(len).enumerate() {
            input_ids[row * len + col] = id as i64;
            attention_mask[row * len + col] = 1;
        }
    }

    (
        vec![token_ids.len() as i64, len as i64],
        input_ids,
        attention_mask,
    )
}

/// Softmax over scaled cosine similarity, one score per candidate in order.
fn label_scores(image: &[f32], texts: &[Vec<f32>], candidates: &[String]) -> Vec<LabelScore> {
    let logits: Vec<f32> = texts
        .iter()
        .map(|text| LOGIT_SCALE * dot(image, text))
        .collect();

    candidates
        .iter()
        .zip(softmax(&logits))
        .map(|(label, score)| LabelScore::new(label.clone(), score))
        .collect()
}
