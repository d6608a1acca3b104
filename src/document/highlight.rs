//! Highlight spans: shadow runs from the model, words re-labelled.

use super::Document;
use crate::error::{Error, Result};
use crate::reduced::{ShadowOracle, ShadowState};

/// Characters that separate words inside live code.
pub const DELIMITERS: &str = " \t\n\r{}()[].+-/*;:=!@#$%^&*~<>?,\"`'|";

/// Reserved words highlighted as keywords.
pub const KEYWORDS: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "const", "continue", "default",
    "do", "else", "enum", "extends", "final", "finally", "for", "goto", "if", "implements",
    "import", "instanceof", "interface", "native", "new", "package", "private", "protected",
    "public", "return", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "try", "volatile", "while", "true", "false", "null",
];

/// Built-in type names, highlighted ahead of keywords.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

/// Highlight category of a span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightStatus {
    Normal,
    Commented,
    SingleQuoted,
    DoubleQuoted,
    Keyword,
    Type,
    Number,
}

impl From<ShadowState> for HighlightStatus {
    fn from(state: ShadowState) -> Self {
        match state {
            ShadowState::Free => Self::Normal,
            ShadowState::LineComment | ShadowState::BlockComment => Self::Commented,
            ShadowState::SingleQuote => Self::SingleQuoted,
            ShadowState::DoubleQuote => Self::DoubleQuoted,
        }
    }
}

/// A run of characters with one highlight status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    pub location: usize,
    pub length: usize,
    pub status: HighlightStatus,
}

impl<O: ShadowOracle> Document<O> {
    /// Highlight spans covering `start..end`, in order and without gaps.
    ///
    /// The caret is restored afterwards.
    pub fn get_highlight_status(&mut self, start: usize, end: usize) -> Result<Vec<HighlightSpan>> {
        if start > end || end > self.len() {
            return Err(Error::InvalidRange {
                offset: start,
                len: end.saturating_sub(start),
                doc_len: self.len(),
            });
        }
        let caret = self.current_location();
        self.set_current_location(start)?;
        let runs = self.model.get_shadow_runs(&mut self.oracle, end - start);
        self.set_current_location(caret)?;

        let mut spans = Vec::new();
        for run in runs? {
            let status = HighlightStatus::from(run.state);
            if status == HighlightStatus::Normal {
                let text = self.text.slice(run.location, run.length)?;
                split_words(&text, run.location, &mut spans);
            } else {
                push_span(&mut spans, run.location, run.length, status);
            }
        }
        Ok(spans)
    }
}

fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(ch)
}

fn is_number(word: &str) -> bool {
    word.starts_with(|ch: char| ch.is_ascii_digit())
        && word.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

fn classify(word: &str) -> HighlightStatus {
    if PRIMITIVE_TYPES.contains(&word) {
        HighlightStatus::Type
    } else if KEYWORDS.contains(&word) {
        HighlightStatus::Keyword
    } else if is_number(word) {
        HighlightStatus::Number
    } else {
        HighlightStatus::Normal
    }
}

/// Split live text at delimiters and label each word.
fn split_words(text: &str, location: usize, spans: &mut Vec<HighlightSpan>) {
    let mut word = String::new();
    let mut word_start = location;
    let mut pos = location;
    for ch in text.chars() {
        if is_delimiter(ch) {
            if !word.is_empty() {
                push_span(spans, word_start, pos - word_start, classify(&word));
                word.clear();
            }
            push_span(spans, pos, 1, HighlightStatus::Normal);
        } else {
            if word.is_empty() {
                word_start = pos;
            }
            word.push(ch);
        }
        pos += 1;
    }
    if !word.is_empty() {
        push_span(spans, word_start, pos - word_start, classify(&word));
    }
}

/// Append a span, extending the last one when the status repeats.
fn push_span(spans: &mut Vec<HighlightSpan>, location: usize, length: usize, status: HighlightStatus) {
    if let Some(last) = spans.last_mut() {
        if last.status == status && last.location + last.length == location {
            last.length += length;
            return;
        }
    }
    spans.push(HighlightSpan {
        location,
        length,
        status,
    });
}
