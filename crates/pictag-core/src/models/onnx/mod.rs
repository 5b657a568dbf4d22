//! ONNX Runtime backends for the three recognition models.
//!
//! Models are the Hugging Face ONNX exports (Xenova namespace by default),
//! laid out one directory per model under `general.model_dir`:
//!
//! ```text
//! models/
//!   mobilenet_v2_1.0_224/   model.onnx  config.json
//!   detr-resnet-50/         model.onnx  config.json
//!   clip-vit-base-patch32/  vision_model.onnx  text_model.onnx  tokenizer.json
//! ```

mod classifier;
mod clip;
mod detector;
mod labels;
mod preprocess;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::ModelsConfig;
use crate::error::{ModelError, ModelKind};
use crate::models::{ImageClassifier, ModelLoader, ObjectDetector, ZeroShotScorer};

pub use classifier::MobileNetClassifier;
pub use clip::ClipZeroShot;
pub use detector::DetrDetector;
pub use labels::Labels;

pub const MODEL_FILENAME: &str = "model.onnx";
pub const CONFIG_FILENAME: &str = "config.json";
pub const VISION_MODEL_FILENAME: &str = "vision_model.onnx";
pub const TEXT_MODEL_FILENAME: &str = "text_model.onnx";
pub const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Namespace assumed for model names without an explicit owner.
const DEFAULT_HUB_NAMESPACE: &str = "Xenova";

/// A file fetched from a model repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path inside the repository
    pub remote: &'static str,
    /// Filename inside the local model directory
    pub local: &'static str,
}

const SINGLE_GRAPH_FILES: &[RemoteFile] = &[
    RemoteFile {
        remote: "onnx/model.onnx",
        local: MODEL_FILENAME,
    },
    RemoteFile {
        remote: "config.json",
        local: CONFIG_FILENAME,
    },
];

const CLIP_FILES: &[RemoteFile] = &[
    RemoteFile {
        remote: "onnx/vision_model.onnx",
        local: VISION_MODEL_FILENAME,
    },
    RemoteFile {
        remote: "onnx/text_model.onnx",
        local: TEXT_MODEL_FILENAME,
    },
    RemoteFile {
        remote: "tokenizer.json",
        local: TOKENIZER_FILENAME,
    },
];

/// Files a model slot needs on disk.
pub fn required_files(kind: ModelKind) -> &'static [RemoteFile] {
    match kind {
        ModelKind::Classifier | ModelKind::Detector => SINGLE_GRAPH_FILES,
        ModelKind::ZeroShot => CLIP_FILES,
    }
}

/// Hub repository id for a configured model name.
///
/// `"detr-resnet-50"` resolves to `"Xenova/detr-resnet-50"`; names that
/// already carry an owner are used as-is.
pub fn repo_id(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("{DEFAULT_HUB_NAMESPACE}/{model}")
    }
}

/// Local directory name for a configured model name.
pub fn local_dir_name(model: &str) -> String {
    model.replace('/', "--")
}

/// Loads the ONNX backends from a model directory.
#[derive(Debug, Clone)]
pub struct OnnxModelLoader {
    model_dir: PathBuf,
    models: ModelsConfig,
}

impl OnnxModelLoader {
    pub fn new(model_dir: impl Into<PathBuf>, models: ModelsConfig) -> Self {
        Self {
            model_dir: model_dir.into(),
            models,
        }
    }

    /// Configured model name for a slot.
    pub fn model_name(&self, kind: ModelKind) -> &str {
        match kind {
            ModelKind::Classifier => &self.models.classifier.model,
            ModelKind::Detector => &self.models.detector.model,
            ModelKind::ZeroShot => &self.models.zero_shot.model,
        }
    }

    /// Directory holding a slot's files.
    pub fn model_path(&self, kind: ModelKind) -> PathBuf {
        self.model_dir.join(local_dir_name(self.model_name(kind)))
    }

    /// Whether every file the slot needs is present.
    pub fn is_installed(&self, kind: ModelKind) -> bool {
        let dir = self.model_path(kind);
        required_files(kind)
            .iter()
            .all(|file| dir.join(file.local).exists())
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}

/// Build a backend on the blocking pool; session creation reads and
/// optimizes the whole graph.
async fn load_blocking<T, F>(kind: ModelKind, dir: PathBuf, build: F) -> Result<T, ModelError>
where
    F: FnOnce(&Path) -> Result<T, ModelError> + Send + 'static,
    T: Send + 'static,
{
    let start = Instant::now();
    tracing::info!("Loading {kind} from {:?}", dir);

    let loaded = tokio::task::spawn_blocking(move || build(&dir))
        .await
        .map_err(|e| ModelError::new(format!("Model load task failed: {e}")))??;

    tracing::info!(
        "Loaded {kind} in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(loaded)
}

#[async_trait]
impl ModelLoader for OnnxModelLoader {
    async fn load_classifier(&self) -> Result<Arc<dyn ImageClassifier>, ModelError> {
        let image_size = self.models.classifier.image_size;
        let dir = self.model_path(ModelKind::Classifier);
        let classifier = load_blocking(ModelKind::Classifier, dir, move |dir| {
            MobileNetClassifier::load(dir, image_size)
        })
        .await?;
        Ok(Arc::new(classifier))
    }

    async fn load_detector(&self) -> Result<Arc<dyn ObjectDetector>, ModelError> {
        let image_size = self.models.detector.image_size;
        let min_score = self.models.detector.min_score;
        let dir = self.model_path(ModelKind::Detector);
        let detector = load_blocking(ModelKind::Detector, dir, move |dir| {
            DetrDetector::load(dir, image_size, min_score)
        })
        .await?;
        Ok(Arc::new(detector))
    }

    async fn load_zero_shot(&self) -> Result<Arc<dyn ZeroShotScorer>, ModelError> {
        let image_size = self.models.zero_shot.image_size;
        let dir = self.model_path(ModelKind::ZeroShot);
        let scorer = load_blocking(ModelKind::ZeroShot, dir, move |dir| {
            ClipZeroShot::load(dir, image_size)
        })
        .await?;
        Ok(Arc::new(scorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_id_defaults_namespace() {
        assert_eq!(repo_id("detr-resnet-50"), "Xenova/detr-resnet-50");
        assert_eq!(repo_id("openai/clip-vit-base-patch32"), "openai/clip-vit-base-patch32");
        assert_eq!(
            local_dir_name("openai/clip-vit-base-patch32"),
            "openai--clip-vit-base-patch32"
        );
    }

    #[test]
    fn test_is_installed_checks_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OnnxModelLoader::new(dir.path(), ModelsConfig::default());
        assert!(!loader.is_installed(ModelKind::Classifier));

        let classifier_dir = loader.model_path(ModelKind::Classifier);
        std::fs::create_dir_all(&classifier_dir).unwrap();
        std::fs::write(classifier_dir.join(MODEL_FILENAME), b"").unwrap();
        assert!(!loader.is_installed(ModelKind::Classifier));

        std::fs::write(classifier_dir.join(CONFIG_FILENAME), b"{}").unwrap();
        assert!(loader.is_installed(ModelKind::Classifier));
        assert!(!loader.is_installed(ModelKind::Detector));
    }

    #[tokio::test]
    async fn test_missing_model_reports_download_hint() {
        let dir = tempfile::tempdir().unwrap();
        let loader = OnnxModelLoader::new(dir.path(), ModelsConfig::default());

        let err = match loader.load_detector().await {
            Ok(_) => panic!("detector should not load from an empty directory"),
            Err(e) => e,
        };
        assert!(err.message().contains("pictag models download"));
    }
}
