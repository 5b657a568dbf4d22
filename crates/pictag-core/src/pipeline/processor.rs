//! Per-file orchestration: validate, read, hash, decode, recognize, suggest.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::RecognitionError;
use crate::keywords::KeywordExtractor;
use crate::models::ModelRegistry;
use crate::recognition::InferenceCoordinator;
use crate::synthesis::{suggest, NameStyle};
use crate::types::{ImageSuggestion, Suggestion};

use super::decode::{format_to_string, ImageDecoder};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::hash::content_hash;
use super::validate::Validator;

/// Options for one `process` call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Also run zero-shot keyword extraction
    pub keywords: bool,
    /// Attach the raw classifier and detector output
    pub include_recognition: bool,
}

/// Turns image files into [`ImageSuggestion`]s.
pub struct ImageProcessor {
    validator: Validator,
    decoder: ImageDecoder,
    discovery: FileDiscovery,
    coordinator: InferenceCoordinator,
    keywords: KeywordExtractor,
    naming: NameStyle,
    inference_timeout_ms: u64,
}

impl ImageProcessor {
    pub fn new(config: &Config, registry: Arc<ModelRegistry>) -> Self {
        let decoder = ImageDecoder::new(config.limits.clone());
        Self {
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(&config.processing),
            coordinator: InferenceCoordinator::new(
                registry.clone(),
                config.recognition.clone(),
                decoder.clone(),
            ),
            keywords: KeywordExtractor::new(registry, decoder.clone()),
            decoder,
            naming: config.naming.clone(),
            inference_timeout_ms: config.limits.inference_timeout_ms,
        }
    }

    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    pub async fn process(
        &self,
        path: &Path,
        options: ProcessOptions,
    ) -> Result<ImageSuggestion, RecognitionError> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", path);

        let bytes = self.read_validated(path).await?;
        let content_hash = content_hash(&bytes);
        tracing::trace!("  Read + hash: {:?}", start.elapsed());

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let decoded = self.decoder.decode_bytes(bytes, &file_name).await?;
        tracing::trace!("  Decode: {:?}", start.elapsed());

        let recognition = self
            .with_deadline("recognition", self.coordinator.recognize(&decoded.image))
            .await?;
        let suggestion = suggest(&recognition, &self.naming);

        let keywords = if options.keywords {
            Some(
                self.with_deadline("keywords", self.keywords.extract_keywords(&decoded.image))
                    .await?,
            )
        } else {
            None
        };

        tracing::debug!(
            "Processed {:?} in {:?} -> {:?}",
            file_name,
            start.elapsed(),
            suggestion.name
        );

        Ok(ImageSuggestion {
            file_path: path.to_path_buf(),
            file_name,
            content_hash,
            width: decoded.width,
            height: decoded.height,
            format: format_to_string(decoded.format),
            tags: suggestion.tags,
            name: suggestion.name,
            keywords,
            recognition: options.include_recognition.then_some(recognition),
        })
    }

    /// Tag and name an in-memory image.
    pub async fn suggest_bytes(
        &self,
        bytes: Vec<u8>,
        source_name: &str,
    ) -> Result<Suggestion, RecognitionError> {
        let decoded = self.decoder.decode_bytes(bytes, source_name).await?;
        let recognition = self
            .with_deadline("recognition", self.coordinator.recognize(&decoded.image))
            .await?;
        Ok(suggest(&recognition, &self.naming))
    }

    /// Zero-shot keywords for one image file.
    pub async fn extract_keywords(&self, path: &Path) -> Result<Vec<String>, RecognitionError> {
        let bytes = self.read_validated(path).await?;
        let source_name = path.display().to_string();
        let decoded = self.decoder.decode_bytes(bytes, &source_name).await?;
        self.with_deadline("keywords", self.keywords.extract_keywords(&decoded.image))
            .await
    }

    async fn read_validated(&self, path: &Path) -> Result<Vec<u8>, RecognitionError> {
        let container = self.validator.validate(path)?;
        tracing::trace!("  Signature: {container}");

        tokio::fs::read(path)
            .await
            .map_err(|e| RecognitionError::Decode {
                source_name: path.display().to_string(),
                message: format!("Cannot read file: {e}"),
            })
    }

    async fn with_deadline<T>(
        &self,
        stage: &str,
        work: impl Future<Output = Result<T, RecognitionError>>,
    ) -> Result<T, RecognitionError> {
        tokio::time::timeout(Duration::from_millis(self.inference_timeout_ms), work)
            .await
            .map_err(|_| RecognitionError::Timeout {
                stage: stage.to_string(),
                timeout_ms: self.inference_timeout_ms,
            })?
    }
}
