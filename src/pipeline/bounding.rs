//! Word-count bounding for generated text.
//!
//! Model output is trimmed; when it exceeds the limit, only the first
//! `limit` words are kept (re-joined with single spaces) and the
//! truncation marker is glued to the last kept word, so the bounded text
//! never exceeds `limit` words.

use serde::{Deserialize, Serialize};

/// Specialist reports are asked for ~50 words; 10 words of slack.
pub const SPECIALIST_WORD_LIMIT: usize = 60;

/// Diagnoses and condition summaries are asked for ~100 words; 20 words of slack.
pub const DIAGNOSIS_WORD_LIMIT: usize = 120;

pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedText {
    pub text: String,
    pub truncated: bool,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Bound `raw` to at most `limit` whitespace-separated words.
///
/// A trailing marker on text that was not truncated is stripped, so the
/// marker appears exactly when `truncated` is set.
pub fn bound_words(raw: &str, limit: usize) -> BoundedText {
    let trimmed = strip_marker(raw);
    if word_count(trimmed) <= limit {
        return BoundedText {
            text: trimmed.to_string(),
            truncated: false,
        };
    }

    let mut text = trimmed
        .split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ");
    text.push_str(TRUNCATION_MARKER);

    BoundedText {
        text,
        truncated: true,
    }
}

fn strip_marker(raw: &str) -> &str {
    let mut text = raw.trim();
    while let Some(rest) = text.strip_suffix(TRUNCATION_MARKER) {
        text = rest.trim_end();
    }
    text
}

/// Whether `raw` has anything left once whitespace and markers are removed.
pub fn has_content(raw: &str) -> bool {
    !strip_marker(raw).is_empty()
}
