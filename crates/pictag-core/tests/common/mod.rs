//! Scripted model backends for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pictag_core::models::{ImageClassifier, ModelLoader, ObjectDetector, ZeroShotScorer};
use pictag_core::{BoundingBox, ClassificationPrediction, DetectionPrediction, LabelScore, ModelError};

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([10, 200, 90])));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

/// Returns fixed predictions, or a fixed error.
pub struct ScriptedModel {
    classes: Vec<(String, f32)>,
    objects: Vec<(String, f32)>,
    scores: Vec<(String, f32)>,
    failure: Option<String>,
    delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            objects: Vec::new(),
            scores: Vec::new(),
            failure: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn classes(mut self, classes: &[(&str, f32)]) -> Self {
        self.classes = owned(classes);
        self
    }

    pub fn objects(mut self, objects: &[(&str, f32)]) -> Self {
        self.objects = owned(objects);
        self
    }

    pub fn scores(mut self, scores: &[(&str, f32)]) -> Self {
        self.scores = owned(scores);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn respond(&self) -> Result<(), ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            Some(message) => Err(ModelError::new(message.clone())),
            None => Ok(()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn owned(pairs: &[(&str, f32)]) -> Vec<(String, f32)> {
    pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect()
}

#[async_trait]
impl ImageClassifier for ScriptedModel {
    async fn classify(
        &self,
        _image: &DynamicImage,
        top_k: usize,
    ) -> Result<Vec<ClassificationPrediction>, ModelError> {
        self.respond().await?;
        Ok(self
            .classes
            .iter()
            .take(top_k)
            .map(|(label, p)| ClassificationPrediction::new(label.as_str(), *p))
            .collect())
    }
}

#[async_trait]
impl ObjectDetector for ScriptedModel {
    async fn detect(
        &self,
        _image: &DynamicImage,
        max_results: usize,
    ) -> Result<Vec<DetectionPrediction>, ModelError> {
        self.respond().await?;
        Ok(self
            .objects
            .iter()
            .take(max_results)
            .map(|(label, s)| DetectionPrediction::new(label.as_str(), *s, BoundingBox::default()))
            .collect())
    }
}

#[async_trait]
impl ZeroShotScorer for ScriptedModel {
    async fn score(
        &self,
        _image: &DynamicImage,
        candidates: &[String],
    ) -> Result<Vec<LabelScore>, ModelError> {
        self.respond().await?;
        Ok(candidates
            .iter()
            .map(|label| {
                let score = self
                    .scores
                    .iter()
                    .find(|(l, _)| l == label)
                    .map(|(_, s)| *s)
                    .unwrap_or(0.0);
                LabelScore::new(label.as_str(), score)
            })
            .collect())
    }
}

/// Hands out scripted models and counts loads per slot.
pub struct ScriptedLoader {
    pub classifier: Arc<ScriptedModel>,
    pub detector: Arc<ScriptedModel>,
    pub zero_shot: Arc<ScriptedModel>,
    pub classifier_load_error: Option<String>,
    pub load_delay: Duration,
    pub classifier_loads: AtomicUsize,
    pub detector_loads: AtomicUsize,
    pub zero_shot_loads: AtomicUsize,
}

impl ScriptedLoader {
    pub fn new(classifier: ScriptedModel, detector: ScriptedModel) -> Self {
        Self {
            classifier: Arc::new(classifier),
            detector: Arc::new(detector),
            zero_shot: Arc::new(ScriptedModel::new()),
            classifier_load_error: None,
            load_delay: Duration::ZERO,
            classifier_loads: AtomicUsize::new(0),
            detector_loads: AtomicUsize::new(0),
            zero_shot_loads: AtomicUsize::new(0),
        }
    }

    pub fn with_zero_shot(mut self, scorer: ScriptedModel) -> Self {
        self.zero_shot = Arc::new(scorer);
        self
    }

    pub fn total_loads(&self) -> usize {
        self.classifier_loads.load(Ordering::SeqCst)
            + self.detector_loads.load(Ordering::SeqCst)
            + self.zero_shot_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for ScriptedLoader {
    async fn load_classifier(&self) -> Result<Arc<dyn ImageClassifier>, ModelError> {
        self.classifier_loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_delay).await;
        if let Some(message) = &self.classifier_load_error {
            return Err(ModelError::new(message.clone()));
        }
        Ok(self.classifier.clone())
    }

    async fn load_detector(&self) -> Result<Arc<dyn ObjectDetector>, ModelError> {
        self.detector_loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_delay).await;
        Ok(self.detector.clone())
    }

    async fn load_zero_shot(&self) -> Result<Arc<dyn ZeroShotScorer>, ModelError> {
        self.zero_shot_loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_delay).await;
        Ok(self.zero_shot.clone())
    }
}
