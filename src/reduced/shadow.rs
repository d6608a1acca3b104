//! Shadow oracles: the comment/string classification the model consults.
//!
//! The reduced model does not lex comments or strings itself. Queries that
//! need to know whether a brace is live code ask a [`ShadowOracle`], anchored
//! at the model's cursor, about characters at positions relative to it.

use std::ops::Range;

use super::token::ShadowState;

/// Source of shadowing information for the characters of a document.
pub trait ShadowOracle {
    /// Anchor subsequent relative queries at absolute position `anchor`.
    fn reset_location(&mut self, anchor: usize);

    /// State of the character `rel` positions from the anchor.
    fn state_at_rel_location(&self, rel: isize) -> ShadowState;

    /// Text of `inserted` characters replaced `removed` characters at `offset`.
    fn text_changed(&mut self, offset: usize, inserted: usize, removed: usize) {
        let _ = (offset, inserted, removed);
    }
}

/// Oracle that reports every character as live code.
#[derive(Clone, Copy, Debug, Default)]
pub struct FreeOracle;

impl ShadowOracle for FreeOracle {
    fn reset_location(&mut self, _anchor: usize) {}

    fn state_at_rel_location(&self, _rel: isize) -> ShadowState {
        ShadowState::Free
    }
}

/// Oracle backed by a sorted list of shadowed character ranges.
///
/// Ranges are absolute, half-open and non-overlapping; characters outside
/// every range are [`ShadowState::Free`]. Edits reported through
/// [`ShadowOracle::text_changed`] shift the ranges along with the text.
#[derive(Clone, Debug, Default)]
pub struct ShadowSpans {
    spans: Vec<(Range<usize>, ShadowState)>,
    anchor: usize,
}

impl ShadowSpans {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_span(mut self, range: Range<usize>, state: ShadowState) -> Self {
        self.push(range, state);
        self
    }

    /// Mark `range` as shadowed by `state`. Empty ranges are ignored.
    pub fn push(&mut self, range: Range<usize>, state: ShadowState) {
        if range.is_empty() {
            return;
        }
        let at = self.spans.partition_point(|(r, _)| r.start < range.start);
        self.spans.insert(at, (range, state));
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }

    #[must_use]
    pub fn spans(&self) -> &[(Range<usize>, ShadowState)] {
        &self.spans
    }

    /// State of the character at absolute position `position`.
    #[must_use]
    pub fn state_at(&self, position: usize) -> ShadowState {
        let idx = self.spans.partition_point(|(r, _)| r.end <= position);
        match self.spans.get(idx) {
            Some((range, state)) if range.contains(&position) => *state,
            _ => ShadowState::Free,
        }
    }
}

impl ShadowOracle for ShadowSpans {
    fn reset_location(&mut self, anchor: usize) {
        self.anchor = anchor;
    }

    fn state_at_rel_location(&self, rel: isize) -> ShadowState {
        self.anchor
            .checked_add_signed(rel)
            .map_or(ShadowState::Free, |position| self.state_at(position))
    }

    fn text_changed(&mut self, offset: usize, inserted: usize, removed: usize) {
        let end = offset + removed;
        let squeeze = |b: usize| {
            if b <= offset {
                b
            } else if b >= end {
                b - removed
            } else {
                offset
            }
        };
        // Text typed strictly inside a span extends it; text at either edge
        // stays outside.
        for (range, _) in &mut self.spans {
            let start = squeeze(range.start);
            let stop = squeeze(range.end);
            let start = if start >= offset { start + inserted } else { start };
            let stop = if stop > offset { stop + inserted } else { stop };
            *range = start..stop;
        }
        self.spans.retain(|(range, _)| !range.is_empty());
    }
}
