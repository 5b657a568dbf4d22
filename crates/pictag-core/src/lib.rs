//! Pictag Core - image recognition to tags and a display name.
//!
//! Pictag runs an image classifier and an object detector over a picture,
//! then derives a small keyword tag set and a short human-readable name
//! from their predictions. A zero-shot model can additionally pick the best
//! matching keywords from a fixed vocabulary.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Decode → Classify ┐
//!                  Detect   ┴→ RecognitionResult → Tags + Name → JSON
//!                  Zero-shot ─→ Keywords
//! ```
//!
//! Models are loaded lazily, once, by a shared [`ModelRegistry`]; the
//! synthesizers in [`synthesis`] are pure functions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pictag_core::{Config, Pictag, ProcessOptions};
//!
//! #[tokio::main]
//! async fn main() -> pictag_core::Result<()> {
//!     let config = Config::load()?;
//!     let pictag = Pictag::new(config);
//!
//!     let result = pictag.process("./beach.jpg".as_ref(), ProcessOptions::default()).await?;
//!     println!("{}: {:?}", result.name, result.tags);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod keywords;
pub mod math;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod recognition;
pub mod synthesis;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use config::Config;
pub use error::{ConfigError, ModelError, ModelKind, PictagError, RecognitionError, Result};
pub use keywords::{KeywordExtractor, CANDIDATE_LABELS, KEYWORD_COUNT};
pub use models::{ModelLoader, ModelRegistry};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DiscoveredFile, FileDiscovery, ImageProcessor, ProcessOptions};
pub use recognition::InferenceCoordinator;
pub use synthesis::{suggest, synthesize_name, synthesize_name_with, synthesize_tags, NameStyle, TagSet};
pub use types::{
    BoundingBox, ClassificationPrediction, DetectionPrediction, ImageSuggestion, LabelScore,
    ProcessingStats, RecognitionResult, Suggestion,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main entry point: one registry, one processor, shared across calls.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Pictag {
    config: Config,
    registry: Arc<ModelRegistry>,
    processor: ImageProcessor,
}

impl Pictag {
    /// Create an instance backed by the ONNX models under
    /// `general.model_dir`. Nothing is loaded until the first call.
    pub fn new(config: Config) -> Self {
        let loader = models::onnx::OnnxModelLoader::new(config.model_dir(), config.models.clone());
        Self::with_loader(config, Arc::new(loader))
    }

    /// Create an instance with a custom model source.
    pub fn with_loader(config: Config, loader: Arc<dyn ModelLoader>) -> Self {
        tracing::debug!("Initializing Pictag v{}", VERSION);
        let registry = Arc::new(ModelRegistry::new(loader));
        let processor = ImageProcessor::new(&config, registry.clone());
        Self {
            config,
            registry,
            processor,
        }
    }

    /// Create an instance from the default config file.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(Config::load()?))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn model_dir(&self) -> PathBuf {
        self.config.model_dir()
    }

    /// Tag and name one image file.
    pub async fn process(&self, path: &Path, options: ProcessOptions) -> Result<ImageSuggestion> {
        Ok(self.processor.process(path, options).await?)
    }

    /// Tag and name an in-memory image.
    pub async fn suggest_bytes(&self, bytes: Vec<u8>, source_name: &str) -> Result<Suggestion> {
        Ok(self.processor.suggest_bytes(bytes, source_name).await?)
    }

    /// Zero-shot keywords for one image file.
    pub async fn keywords(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.processor.extract_keywords(path).await?)
    }

    /// Supported image files at `path` (a file or a directory tree).
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.processor.discover(path)
    }
}
