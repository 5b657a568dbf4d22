//! End-to-end recognition, synthesis and keyword behaviour over scripted
//! model backends.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::{png_bytes, ScriptedLoader, ScriptedModel};
use pictag_core::config::{LimitsConfig, RecognitionConfig};
use pictag_core::pipeline::ImageDecoder;
use pictag_core::{
    suggest, InferenceCoordinator, KeywordExtractor, ModelKind, ModelRegistry, NameStyle,
    RecognitionError, KEYWORD_COUNT,
};

fn coordinator(loader: Arc<ScriptedLoader>) -> InferenceCoordinator {
    InferenceCoordinator::new(
        Arc::new(ModelRegistry::new(loader)),
        RecognitionConfig::default(),
        ImageDecoder::new(LimitsConfig::default()),
    )
}

#[tokio::test]
async fn test_labrador_is_named_by_classifier() {
    let loader = Arc::new(ScriptedLoader::new(
        ScriptedModel::new().classes(&[("labrador retriever", 0.8)]),
        ScriptedModel::new(),
    ));

    let result = coordinator(loader)
        .recognize_bytes(png_bytes(32, 32), "dog.png")
        .await
        .unwrap();
    let suggestion = suggest(&result, &NameStyle::default());

    assert!(suggestion.tags.contains("labrador"));
    assert!(suggestion.tags.contains("retriever"));
    assert!(suggestion.tags.contains("labrador retriever"));
    assert_eq!(suggestion.name, "Labrador Retriever");
}

#[tokio::test]
async fn test_confident_detections_name_a_scene() {
    let loader = Arc::new(ScriptedLoader::new(
        ScriptedModel::new(),
        ScriptedModel::new().objects(&[("cat", 0.9), ("dog", 0.75)]),
    ));

    let result = coordinator(loader)
        .recognize_bytes(png_bytes(32, 32), "pets.png")
        .await
        .unwrap();
    let suggestion = suggest(&result, &NameStyle::default());

    assert_eq!(suggestion.name, "Cat and Dog Scene");
    assert_eq!(suggestion.tags.as_slice(), ["cat", "dog"]);
}

#[tokio::test]
async fn test_empty_outputs_are_valid() {
    let loader = Arc::new(ScriptedLoader::new(ScriptedModel::new(), ScriptedModel::new()));

    let result = coordinator(loader)
        .recognize_bytes(png_bytes(8, 8), "blank.png")
        .await
        .unwrap();
    assert!(result.is_empty());

    let suggestion = suggest(&result, &NameStyle::default());
    assert!(suggestion.tags.is_empty());
    assert_eq!(suggestion.name, NameStyle::default().fallback);
}

#[tokio::test]
async fn test_undecodable_bytes_never_reach_the_models() {
    let loader = Arc::new(ScriptedLoader::new(
        ScriptedModel::new().classes(&[("cat", 0.9)]),
        ScriptedModel::new(),
    ));

    let err = coordinator(loader.clone())
        .recognize_bytes(b"<html>not an image</html>".to_vec(), "page.html")
        .await
        .unwrap_err();

    assert!(matches!(err, RecognitionError::Decode { .. }), "got {err:?}");
    assert_eq!(loader.total_loads(), 0);
    assert_eq!(loader.classifier.call_count(), 0);
}

#[tokio::test]
async fn test_detector_failure_fails_the_whole_call() {
    let loader = Arc::new(ScriptedLoader::new(
        ScriptedModel::new().classes(&[("tabby, tabby cat", 0.9)]),
        ScriptedModel::new().failing("output tensor missing"),
    ));

    let err = coordinator(loader)
        .recognize_bytes(png_bytes(16, 16), "cat.png")
        .await
        .unwrap_err();

    match err {
        RecognitionError::Inference { model, source } => {
            assert_eq!(model, ModelKind::Detector);
            assert_eq!(source.message(), "output tensor missing");
        }
        other => panic!("expected Inference, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_failure_is_model_init() {
    let mut loader = ScriptedLoader::new(ScriptedModel::new(), ScriptedModel::new());
    loader.classifier_load_error = Some("model.onnx not found".to_string());
    let loader = Arc::new(loader);
    let coordinator = coordinator(loader.clone());

    let err = coordinator
        .recognize_bytes(png_bytes(16, 16), "x.png")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RecognitionError::ModelInit {
            model: ModelKind::Classifier,
            ..
        }
    ));
    assert!(!coordinator.registry().is_ready());
    assert_eq!(loader.detector.call_count(), 0);
}

#[tokio::test]
async fn test_concurrent_recognition_loads_each_model_once() {
    let mut loader = ScriptedLoader::new(
        ScriptedModel::new().classes(&[("seashore", 0.7)]),
        ScriptedModel::new(),
    );
    loader.load_delay = Duration::from_millis(30);
    let loader = Arc::new(loader);
    let coordinator = coordinator(loader.clone());

    let calls = (0..6).map(|_| coordinator.recognize_bytes(png_bytes(8, 8), "shore.png"));
    let outcomes = futures_util::future::join_all(calls).await;

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(loader.classifier_loads.load(Ordering::SeqCst), 1);
    assert_eq!(loader.detector_loads.load(Ordering::SeqCst), 1);
    assert_eq!(loader.classifier.call_count(), 6);
}

#[tokio::test]
async fn test_output_caps_apply() {
    let classes: Vec<(String, f32)> = (0..8).map(|i| (format!("class {i}"), 0.1)).collect();
    let class_refs: Vec<(&str, f32)> = classes.iter().map(|(l, s)| (l.as_str(), *s)).collect();
    let objects: Vec<(&str, f32)> = (0..14).map(|_| ("person", 0.9)).collect();

    let loader = Arc::new(ScriptedLoader::new(
        ScriptedModel::new().classes(&class_refs),
        ScriptedModel::new().objects(&objects),
    ));

    let result = coordinator(loader)
        .recognize_bytes(png_bytes(8, 8), "crowd.png")
        .await
        .unwrap();

    assert_eq!(result.classification.len(), 5);
    assert_eq!(result.object_detection.len(), 10);
}

#[tokio::test]
async fn test_keywords_are_top_three_without_floor() {
    let loader = Arc::new(
        ScriptedLoader::new(ScriptedModel::new(), ScriptedModel::new()).with_zero_shot(
            ScriptedModel::new().scores(&[
                ("ocean", 0.004),
                ("sky", 0.003),
                ("sunset", 0.002),
                ("night", 0.001),
            ]),
        ),
    );
    let registry = Arc::new(ModelRegistry::new(loader.clone()));
    let extractor =
        KeywordExtractor::new(registry.clone(), ImageDecoder::new(LimitsConfig::default()));

    let keywords = extractor
        .extract_keywords_from_bytes(png_bytes(16, 16), "sea.png")
        .await
        .unwrap();

    assert_eq!(keywords.len(), KEYWORD_COUNT);
    assert_eq!(keywords, vec!["ocean", "sky", "sunset"]);
    assert!(registry.is_zero_shot_ready());
    assert!(!registry.is_ready());
}

#[tokio::test]
async fn test_keyword_scorer_failure_is_inference_error() {
    let loader = Arc::new(
        ScriptedLoader::new(ScriptedModel::new(), ScriptedModel::new())
            .with_zero_shot(ScriptedModel::new().failing("tokenizer exploded")),
    );
    let extractor = KeywordExtractor::new(
        Arc::new(ModelRegistry::new(loader)),
        ImageDecoder::new(LimitsConfig::default()),
    );

    let err = extractor
        .extract_keywords_from_bytes(png_bytes(16, 16), "sea.png")
        .await
        .unwrap_err();
    assert_eq!(err.model(), Some(ModelKind::ZeroShot));
}
