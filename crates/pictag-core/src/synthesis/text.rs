//! Text normalization shared by the tag and name synthesizers.

/// Function words never used as tags.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "among", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must",
];

/// Case-insensitive stop-word check.
pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

/// Split a label on runs of commas and spaces, dropping empty pieces.
pub fn tokenize(label: &str) -> impl Iterator<Item = &str> {
    label
        .split(|c: char| c == ',' || c == ' ')
        .filter(|token| !token.is_empty())
}

/// Turn a model label into display form.
///
/// "golden_retriever" → "Golden Retriever", "labrador retriever" →
/// "Labrador Retriever". Only the first character of each word is
/// upper-cased; the rest is left as the model wrote it.
pub fn format_class_name(label: &str) -> String {
    label
        .split(|c: char| c == '_' || c.is_whitespace())
        .map(|word| word.replace(',', ""))
        .filter(|word| !word.is_empty())
        .map(|word| capitalize_first(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
