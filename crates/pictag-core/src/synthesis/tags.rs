//! Tag synthesis: recognition output → bounded, deduplicated tag list.

use serde::Serialize;

use crate::types::RecognitionResult;

use super::text::{is_stop_word, tokenize};

/// Maximum number of tags kept per image.
pub const MAX_TAGS: usize = 15;

/// Tokens must be longer than this (in characters) to become tags.
const MIN_TOKEN_CHARS: usize = 2;

/// Whole labels up to this length (commas removed) are kept as one tag.
const MAX_WHOLE_LABEL_CHARS: usize = 20;

/// Detections must score strictly above this to contribute a tag.
pub const DETECTION_TAG_THRESHOLD: f32 = 0.5;

/// Lowercase tags in first-insertion order, deduplicated, at most
/// [`MAX_TAGS`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag. Duplicates and anything past the cap are ignored.
    ///
    /// Returns whether the tag was added.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.is_empty() || self.tags.len() >= MAX_TAGS || self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tags
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Build the tag set for a recognition result.
///
/// Every classification contributes its significant tokens and, when short
/// enough, the whole label. Detections contribute their class label when
/// they score above [`DETECTION_TAG_THRESHOLD`].
pub fn synthesize_tags(result: &RecognitionResult) -> TagSet {
    let mut tags = TagSet::new();

    for prediction in &result.classification {
        let label = prediction.label().to_lowercase();

        for token in tokenize(&label) {
            if token.chars().count() > MIN_TOKEN_CHARS && !is_stop_word(token) {
                tags.insert(token);
            }
        }

        let whole = label.replace(',', "");
        let whole = whole.trim();
        if whole.chars().count() <= MAX_WHOLE_LABEL_CHARS {
            tags.insert(whole);
        }
    }

    for detection in &result.object_detection {
        if detection.score() > DETECTION_TAG_THRESHOLD {
            tags.insert(detection.class_label().to_lowercase());
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, ClassificationPrediction, DetectionPrediction};

    fn class(label: &str, probability: f32) -> ClassificationPrediction {
        ClassificationPrediction::new(label, probability)
    }

    fn det(label: &str, score: f32) -> DetectionPrediction {
        DetectionPrediction::new(label, score, BoundingBox::default())
    }

    #[test]
    fn test_empty_result_gives_empty_tags() {
        assert!(synthesize_tags(&RecognitionResult::default()).is_empty());
    }

    #[test]
    fn test_labrador_tokens_and_whole_label() {
        let result = RecognitionResult::new(vec![class("labrador retriever", 0.8)], vec![]);
        let tags = synthesize_tags(&result);
        assert!(tags.contains("labrador"));
        assert!(tags.contains("retriever"));
        assert!(tags.contains("labrador retriever"));
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_short_tokens_and_stop_words_excluded() {
        let result = RecognitionResult::new(
            vec![class("Man of war with an ox cart and sail boat", 0.3)],
            vec![],
        );
        let tags = synthesize_tags(&result);
        for excluded in ["of", "an", "ox", "with", "and"] {
            assert!(!tags.contains(excluded), "{excluded} should be excluded");
        }
        for included in ["man", "war", "cart", "sail", "boat"] {
            assert!(tags.contains(included), "{included} should be included");
        }
        // Too long to keep whole
        assert!(!tags.contains("man of war with an ox cart and sail boat"));
    }

    #[test]
    fn test_comma_label_whole_form_drops_commas() {
        let result = RecognitionResult::new(vec![class("tabby, tabby cat", 0.6)], vec![]);
        let tags = synthesize_tags(&result);
        assert_eq!(tags.as_slice(), &["tabby", "cat", "tabby tabby cat"]);
    }

    #[test]
    fn test_all_classifications_considered() {
        let result = RecognitionResult::new(
            vec![class("seashore", 0.4), class("sandbar", 0.2), class("lakeside", 0.1)],
            vec![],
        );
        let tags = synthesize_tags(&result);
        assert!(tags.contains("seashore"));
        assert!(tags.contains("sandbar"));
        assert!(tags.contains("lakeside"));
    }

    #[test]
    fn test_detection_threshold_is_exclusive() {
        let result = RecognitionResult::new(vec![], vec![det("cat", 0.5), det("dog", 0.5001)]);
        let tags = synthesize_tags(&result);
        assert!(!tags.contains("cat"));
        assert!(tags.contains("dog"));
    }

    #[test]
    fn test_detection_labels_lowercased_and_deduplicated() {
        let result = RecognitionResult::new(
            vec![class("Persian cat", 0.7)],
            vec![det("Cat", 0.9), det("cat", 0.8)],
        );
        let tags = synthesize_tags(&result);
        assert_eq!(tags.as_slice(), &["persian", "cat", "persian cat"]);
    }

    #[test]
    fn test_cap_at_fifteen_keeps_first_inserted() {
        let classification: Vec<_> = (0..10)
            .map(|i| class(&format!("alpha{i} beta{i}"), 0.1))
            .collect();
        let result = RecognitionResult::new(classification, vec![det("zebra", 0.99)]);
        let tags = synthesize_tags(&result);
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags.as_slice()[0], "alpha0");
        assert_eq!(tags.as_slice()[1], "beta0");
        assert_eq!(tags.as_slice()[2], "alpha0 beta0");
        assert!(!tags.contains("zebra"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let result = RecognitionResult::new(
            vec![class("sports car, sport car", 0.55), class("convertible", 0.2)],
            vec![det("car", 0.95), det("person", 0.6)],
        );
        assert_eq!(synthesize_tags(&result), synthesize_tags(&result));
    }

    #[test]
    fn test_tag_set_rejects_empty_and_duplicates() {
        let mut tags = TagSet::new();
        assert!(tags.insert("sky"));
        assert!(!tags.insert("sky"));
        assert!(!tags.insert(""));
        assert_eq!(tags.len(), 1);
    }
}
