//! Error types for the Pictag recognition engine.
//!
//! Recognition failures are split by where they happen (model load, model
//! call, image decode) so callers can tell a broken install from a broken
//! input. Synthesis never fails and has no error type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Pictag operations.
#[derive(Error, Debug)]
pub enum PictagError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recognition errors (model load, inference, decode)
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Which of the three model slots an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Classifier,
    Detector,
    ZeroShot,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Classifier => "classifier",
            ModelKind::Detector => "detector",
            ModelKind::ZeroShot => "zero-shot",
        };
        f.write_str(name)
    }
}

/// Failure reported by a model backend, either while loading or while
/// running inference.
///
/// `Clone` so a single failed load can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ModelError {
    message: String,
}

impl ModelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that abort a recognition or keyword-extraction call.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// A required model could not be loaded
    #[error("Failed to initialize {model} model: {source}")]
    ModelInit {
        model: ModelKind,
        #[source]
        source: ModelError,
    },

    /// A loaded model failed while running
    #[error("{model} inference failed: {source}")]
    Inference {
        model: ModelKind,
        #[source]
        source: ModelError,
    },

    /// Input bytes could not be decoded into an image
    #[error("Decode error for {source_name}: {message}")]
    Decode { source_name: String, message: String },

    /// Operation exceeded the caller's deadline
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {source_name} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        source_name: String,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Unsupported image format
    #[error("Unsupported format for {source_name}: {format}")]
    UnsupportedFormat { source_name: String, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl RecognitionError {
    /// The model slot involved, if the error came from a model.
    pub fn model(&self) -> Option<ModelKind> {
        match self {
            RecognitionError::ModelInit { model, .. }
            | RecognitionError::Inference { model, .. } => Some(*model),
            _ => None,
        }
    }
}

/// Convenience type alias for Pictag results.
pub type Result<T> = std::result::Result<T, PictagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_init_message_names_model() {
        let err = RecognitionError::ModelInit {
            model: ModelKind::Detector,
            source: ModelError::new("model.onnx missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("detector"));
        assert!(msg.contains("model.onnx missing"));
        assert_eq!(err.model(), Some(ModelKind::Detector));
    }

    #[test]
    fn test_inference_error_keeps_source() {
        use std::error::Error;

        let err = RecognitionError::Inference {
            model: ModelKind::Classifier,
            source: ModelError::new("session poisoned"),
        };
        let source = err.source().expect("inference error should carry a source");
        assert_eq!(source.to_string(), "session poisoned");
    }

    #[test]
    fn test_decode_error_has_no_model() {
        let err = RecognitionError::Decode {
            source_name: "upload.bin".to_string(),
            message: "invalid header".to_string(),
        };
        assert_eq!(err.model(), None);
    }
}
