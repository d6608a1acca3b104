//! Editor-facing document driver.
//!
//! A [`Document`] owns the text, the [`ReducedModel`] mirroring it and a
//! [`ShadowOracle`]. Every edit goes to all three, so the model's cursor and
//! the document's edit point never diverge: the model's location *is* the
//! document's current location.
//!
//! # Example
//!
//! ```
//! use reduced_lex::Document;
//!
//! let mut doc = Document::new();
//! doc.insert_string(0, "if (x) {\n  foo();\n").unwrap();
//! assert_eq!(doc.indent_line().unwrap(), 2);
//! ```

mod highlight;
mod indent;
mod text;

pub use highlight::{DELIMITERS, HighlightSpan, HighlightStatus, KEYWORDS, PRIMITIVE_TYPES};
pub use text::DocumentText;

use std::ops::Range;

use crate::error::{Error, Result};
use crate::event::emit_event;
use crate::reduced::{FreeOracle, ReducedModel, ShadowOracle};

/// Document configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Columns per indentation level.
    pub indent_width: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Handle to a position marker created with [`Document::create_position`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PositionId(usize);

/// Text document with an attached reduced model.
#[derive(Debug)]
pub struct Document<O: ShadowOracle = FreeOracle> {
    text: DocumentText,
    model: ReducedModel,
    oracle: O,
    options: DocumentOptions,
    positions: Vec<Option<usize>>,
}

impl Default for Document<FreeOracle> {
    fn default() -> Self {
        Self::new()
    }
}

impl Document<FreeOracle> {
    /// Empty document in which every character is live code.
    #[must_use]
    pub fn new() -> Self {
        Self::with_oracle(FreeOracle)
    }

    /// Document holding `text`, caret at the end.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut doc = Self::new();
        doc.insert_string(0, text)?;
        Ok(doc)
    }
}

impl<O: ShadowOracle> Document<O> {
    #[must_use]
    pub fn with_oracle(oracle: O) -> Self {
        Self::with_options(oracle, DocumentOptions::default())
    }

    #[must_use]
    pub fn with_options(oracle: O, options: DocumentOptions) -> Self {
        Self {
            text: DocumentText::new(),
            model: ReducedModel::new(),
            oracle,
            options,
            positions: Vec::new(),
        }
    }

    #[must_use]
    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// Change the indentation unit.
    pub fn set_indent(&mut self, indent_width: usize) {
        self.options.indent_width = indent_width;
    }

    #[must_use]
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Mutable access to the oracle, e.g. to register comment spans.
    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    #[must_use]
    pub fn model(&self) -> &ReducedModel {
        &self.model
    }

    #[must_use]
    pub fn text(&self) -> &DocumentText {
        &self.text
    }

    /// Document length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Insert `text` at `offset`. The caret ends up after the inserted text.
    pub fn insert_string(&mut self, offset: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.check_offset(offset);
        }
        self.text.insert(offset, text)?;
        let inserted = text.chars().count();
        for marker in self.positions.iter_mut().flatten() {
            if *marker > offset || (*marker == offset && offset != 0) {
                *marker += inserted;
            }
        }
        self.oracle.text_changed(offset, inserted, 0);
        self.set_current_location(offset)?;
        self.model.insert_str(text)?;
        emit_event("insert", &format!("{offset}:{inserted}"));
        Ok(())
    }

    /// Remove `len` characters starting at `offset`. The caret ends up at
    /// `offset`.
    pub fn remove(&mut self, offset: usize, len: usize) -> Result<()> {
        if len == 0 {
            return self.check_offset(offset);
        }
        self.text.remove(offset, len)?;
        let end = offset + len;
        for marker in self.positions.iter_mut().flatten() {
            if *marker >= end {
                *marker -= len;
            } else if *marker > offset {
                *marker = offset;
            }
        }
        self.oracle.text_changed(offset, 0, len);
        self.set_current_location(offset)?;
        self.model.delete(len as isize)?;
        emit_event("remove", &format!("{offset}:{len}"));
        Ok(())
    }

    fn check_offset(&self, offset: usize) -> Result<()> {
        let doc_len = self.len();
        if offset > doc_len {
            return Err(Error::InvalidRange {
                offset,
                len: 0,
                doc_len,
            });
        }
        Ok(())
    }

    /// The caret, i.e. the model's location.
    #[must_use]
    pub fn current_location(&self) -> usize {
        self.model.location()
    }

    /// Move the caret to `location` by relative movement of the model.
    pub fn set_current_location(&mut self, location: usize) -> Result<()> {
        self.check_offset(location)?;
        let delta = location as isize - self.model.location() as isize;
        self.model.move_by(delta)
    }

    /// Create a marker at `offset` that follows later edits.
    pub fn create_position(&mut self, offset: usize) -> Result<PositionId> {
        self.check_offset(offset)?;
        if let Some(slot) = self.positions.iter().position(Option::is_none) {
            self.positions[slot] = Some(offset);
            return Ok(PositionId(slot));
        }
        self.positions.push(Some(offset));
        Ok(PositionId(self.positions.len() - 1))
    }

    /// Current offset of a marker; `None` once released.
    #[must_use]
    pub fn position_offset(&self, id: PositionId) -> Option<usize> {
        self.positions.get(id.0).copied().flatten()
    }

    pub fn release_position(&mut self, id: PositionId) {
        if let Some(slot) = self.positions.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Distance to the brace matching the open brace right of the caret.
    pub fn balance_forward(&mut self) -> Option<usize> {
        self.model.balance_forward(&mut self.oracle)
    }

    /// Distance back to the brace matching the close brace left of the caret.
    pub fn balance_backward(&mut self) -> Option<usize> {
        self.model.balance_backward(&mut self.oracle)
    }

    /// Range covered by the brace pair at the caret, for brace highlighting.
    /// A close brace left of the caret wins over an open brace right of it.
    pub fn matching_brace_span(&mut self) -> Option<Range<usize>> {
        let caret = self.current_location();
        if let Some(distance) = self.balance_backward() {
            return Some(caret - distance..caret);
        }
        self.balance_forward().map(|distance| caret..caret + distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_reach_text_and_model() {
        let mut doc = Document::from_text("ab{cd").unwrap();
        assert_eq!(doc.current_location(), 5);
        doc.remove(2, 1).unwrap();
        assert_eq!(doc.text().to_string(), "abcd");
        assert_eq!(doc.model().to_string(), "_4 @2");
        doc.insert_string(4, "(x)").unwrap();
        assert_eq!(doc.model().to_string(), "_4|(|_1|) @7");
        doc.model().check_invariants().unwrap();
    }

    #[test]
    fn test_out_of_range_edits_are_rejected() {
        let mut doc = Document::from_text("abc").unwrap();
        assert!(matches!(
            doc.insert_string(4, "x"),
            Err(Error::InvalidRange { offset: 4, .. })
        ));
        assert!(matches!(doc.remove(2, 2), Err(Error::InvalidRange { .. })));
        assert!(doc.set_current_location(9).is_err());
        assert_eq!(doc.text().to_string(), "abc");
        assert_eq!(doc.current_location(), 3);
    }

    #[test]
    fn test_positions_follow_edits() {
        let mut doc = Document::from_text("hello world").unwrap();
        let start = doc.create_position(0).unwrap();
        let world = doc.create_position(6).unwrap();
        let end = doc.create_position(11).unwrap();

        doc.insert_string(0, ">> ").unwrap();
        assert_eq!(doc.position_offset(start), Some(0));
        assert_eq!(doc.position_offset(world), Some(9));

        doc.insert_string(9, "big ").unwrap();
        assert_eq!(doc.position_offset(world), Some(13));

        doc.remove(5, 10).unwrap();
        assert_eq!(doc.text().to_string(), ">> herld");
        assert_eq!(doc.position_offset(world), Some(5));
        assert_eq!(doc.position_offset(end), Some(8));

        doc.release_position(world);
        assert_eq!(doc.position_offset(world), None);
        let reused = doc.create_position(1).unwrap();
        assert_eq!(reused, world);
    }

    #[test]
    fn test_matching_brace_span() {
        let mut doc = Document::from_text("f(a[1]) {}").unwrap();
        doc.set_current_location(7).unwrap();
        assert_eq!(doc.matching_brace_span(), Some(1..7));
        doc.set_current_location(1).unwrap();
        assert_eq!(doc.matching_brace_span(), Some(1..7));
        doc.set_current_location(3).unwrap();
        assert_eq!(doc.matching_brace_span(), Some(3..6));
        doc.set_current_location(0).unwrap();
        assert_eq!(doc.matching_brace_span(), None);
    }
}
