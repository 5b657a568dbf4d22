//! Tag and name synthesis from recognition results.
//!
//! Both synthesizers are pure, total functions: they never fail, and an
//! empty [`RecognitionResult`](crate::types::RecognitionResult) yields an
//! empty tag set and the fallback name.

pub mod name;
pub mod tags;
pub(crate) mod text;

pub use name::{synthesize_name, synthesize_name_with, NameStyle};
pub use tags::{synthesize_tags, TagSet, MAX_TAGS};

use crate::types::{RecognitionResult, Suggestion};

/// Run both synthesizers over one result.
pub fn suggest(result: &RecognitionResult, style: &NameStyle) -> Suggestion {
    Suggestion {
        tags: synthesize_tags(result),
        name: synthesize_name_with(result, style),
    }
}
