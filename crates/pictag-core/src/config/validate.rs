//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.inference_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.inference_timeout_ms must be > 0".into(),
            ));
        }
        if self.recognition.classification_top_k == 0 {
            return Err(ConfigError::ValidationError(
                "recognition.classification_top_k must be > 0".into(),
            ));
        }
        if self.recognition.detection_max_results == 0 {
            return Err(ConfigError::ValidationError(
                "recognition.detection_max_results must be > 0".into(),
            ));
        }
        if self.models.classifier.image_size == 0
            || self.models.detector.image_size == 0
            || self.models.zero_shot.image_size == 0
        {
            return Err(ConfigError::ValidationError(
                "models.*.image_size must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.models.detector.min_score) {
            return Err(ConfigError::ValidationError(
                "models.detector.min_score must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }
}
