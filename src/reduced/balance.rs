//! Structural queries over the reduced model.
//!
//! Every scan works on a disposable copy of the model cursor, re-anchors the
//! shadow oracle at the model's location first, and refreshes the shadow tag
//! of each brace it passes before deciding whether the brace is matchable.

use super::model::ReducedModel;
use super::shadow::ShadowOracle;
use super::stream::{Cursor, TokenStream};
use super::token::{Lexeme, ShadowState, Token};
use crate::error::{Direction, Error, Result};

/// Indentation facts gathered around the cursor.
///
/// Distances are measured backward from the cursor in characters. `None`
/// means the thing was not found (or, for `dist_to_newline`, that the
/// enclosing-brace search has consumed it).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndentInfo {
    /// Brace enclosing the start of the cursor's line.
    pub brace_type: Option<Lexeme>,
    /// Distance to the start of the line holding that brace.
    pub dist_to_newline: Option<usize>,
    /// Distance to that brace.
    pub dist_to_brace: Option<usize>,
    /// Distance to the start of the cursor's own line.
    pub dist_to_prev_newline: Option<usize>,
    /// Brace enclosing the cursor itself.
    pub brace_type_current: Option<Lexeme>,
    pub dist_to_brace_current: Option<usize>,
    pub dist_to_newline_current: Option<usize>,
}

/// A maximal run of characters sharing one shadow state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShadowRun {
    pub location: usize,
    pub length: usize,
    pub state: ShadowState,
}

impl ReducedModel {
    /// Distance from the cursor to just past the brace matching the open
    /// brace immediately right of it, both braces included.
    ///
    /// `None` when there is no FREE open brace right of the cursor, when a
    /// mismatched close brace is met first, or when the stream runs out.
    pub fn balance_forward(&mut self, oracle: &mut dyn ShadowOracle) -> Option<usize> {
        oracle.reset_location(self.location);
        let mut iter = self.stream.copy(&self.cursor);
        if self.stream.at_start(&iter) {
            self.stream.next(&mut iter);
        }
        let distance = scan_forward(&mut self.stream, &mut iter, oracle);
        self.stream.dispose(iter);
        distance
    }

    /// Distance from the cursor back to the brace matching the close brace
    /// immediately left of it, both braces included.
    pub fn balance_backward(&mut self, oracle: &mut dyn ShadowOracle) -> Option<usize> {
        oracle.reset_location(self.location);
        let mut iter = self.stream.copy(&self.cursor);
        let distance = scan_backward(&mut self.stream, &mut iter, oracle);
        self.stream.dispose(iter);
        distance
    }

    /// Find the brace enclosing the start of the line `info.dist_to_newline`
    /// characters back (that distance points at the line's newline's far
    /// side, i.e. the line start).
    ///
    /// On success `brace_type` and `dist_to_brace` are filled in. The
    /// newline distance is consumed either way.
    pub fn get_dist_to_enclosing_brace(
        &mut self,
        oracle: &mut dyn ShadowOracle,
        info: &mut IndentInfo,
    ) -> Result<()> {
        let Some(dist_to_newline) = info.dist_to_newline.take() else {
            return Ok(());
        };
        oracle.reset_location(self.location);
        let start = dist_to_newline + 1;
        let mut iter = self.stream.copy(&self.cursor);
        let found = self
            .stream
            .move_by(&mut iter, -signed(start))
            .map(|()| scan_enclosing(&mut self.stream, &mut iter, oracle, start));
        self.stream.dispose(iter);
        if let Some((lexeme, distance)) = found? {
            info.brace_type = Some(lexeme);
            info.dist_to_brace = Some(distance);
        }
        Ok(())
    }

    /// Find the brace enclosing the cursor itself, filling in the `_current`
    /// fields of `info`.
    pub fn get_dist_to_enclosing_brace_current(
        &mut self,
        oracle: &mut dyn ShadowOracle,
        info: &mut IndentInfo,
    ) -> Result<()> {
        oracle.reset_location(self.location);
        let mut iter = self.stream.copy(&self.cursor);
        let found = scan_enclosing(&mut self.stream, &mut iter, oracle, 0);
        self.stream.dispose(iter);
        if let Some((lexeme, distance)) = found {
            info.brace_type_current = Some(lexeme);
            info.dist_to_brace_current = Some(distance);
            info.dist_to_newline_current = self.get_dist_to_previous_newline(distance)?.map(|d| d + distance);
        }
        Ok(())
    }

    /// Characters from the cursor to the next newline, or to the end of the
    /// document when there is none.
    #[must_use]
    pub fn get_dist_to_next_newline(&self) -> usize {
        let stream = &self.stream;
        let mut iter = stream.copy(&self.cursor);
        if stream.at_start(&iter) {
            stream.next(&mut iter);
        }
        let mut distance = 0;
        let mut offset = iter.offset;
        while let Some(token) = stream.current(&iter) {
            if token.is_newline() {
                break;
            }
            distance += token.len() - offset;
            offset = 0;
            stream.next(&mut iter);
        }
        stream.dispose(iter);
        distance
    }

    /// Characters between the start of the line holding position
    /// `location - from` and that position. `None` on the first line.
    pub fn get_dist_to_previous_newline(&self, from: usize) -> Result<Option<usize>> {
        let stream = &self.stream;
        let mut iter = stream.copy(&self.cursor);
        let distance = stream
            .move_by(&mut iter, -signed(from))
            .map(|()| scan_previous_newline(stream, &mut iter));
        stream.dispose(iter);
        distance
    }

    /// Everything [`indent_line`](crate::Document::indent_line) needs, read
    /// at the cursor.
    pub fn get_indent_information(&mut self, oracle: &mut dyn ShadowOracle) -> Result<IndentInfo> {
        let mut info = IndentInfo {
            dist_to_prev_newline: self.get_dist_to_previous_newline(0)?,
            ..IndentInfo::default()
        };
        info.dist_to_newline = info.dist_to_prev_newline;
        self.get_dist_to_enclosing_brace(oracle, &mut info)?;
        if let Some(dist_to_brace) = info.dist_to_brace {
            info.dist_to_newline = self
                .get_dist_to_previous_newline(dist_to_brace)?
                .map(|d| d + dist_to_brace);
        }
        self.get_dist_to_enclosing_brace_current(oracle, &mut info)?;
        Ok(info)
    }

    /// Shadow states of the `length` characters starting at the cursor,
    /// merged into maximal runs.
    pub fn get_shadow_runs(&self, oracle: &mut dyn ShadowOracle, length: usize) -> Result<Vec<ShadowRun>> {
        let available = self.len - self.location;
        if length > available {
            return Err(Error::Boundary {
                requested: length,
                available,
                direction: Direction::Forward,
            });
        }
        oracle.reset_location(self.location);
        let mut runs: Vec<ShadowRun> = Vec::new();
        for i in 0..length {
            let state = oracle.state_at_rel_location(signed(i));
            match runs.last_mut() {
                Some(run) if run.state == state => run.length += 1,
                _ => runs.push(ShadowRun {
                    location: self.location + i,
                    length: 1,
                    state,
                }),
            }
        }
        Ok(runs)
    }
}

fn signed(n: usize) -> isize {
    n as isize
}

/// Refresh the shadow tag of the brace under `iter` from the oracle, `rel`
/// being the brace's position relative to the oracle's anchor.
fn refresh(stream: &mut TokenStream, iter: &Cursor, oracle: &dyn ShadowOracle, rel: isize) -> Option<Token> {
    let token = stream.current_mut(iter)?;
    if token.is_brace() {
        token.set_shadow(oracle.state_at_rel_location(rel));
    }
    Some(*token)
}

fn scan_forward(stream: &mut TokenStream, iter: &mut Cursor, oracle: &dyn ShadowOracle) -> Option<usize> {
    if iter.offset != 0 {
        return None;
    }
    let first = refresh(stream, iter, oracle, 0)?;
    if !(first.is_open() && first.is_matchable()) {
        return None;
    }
    let mut stack = vec![first.lexeme()?];
    let mut distance = first.len();
    stream.next(iter);
    while let Some(&open) = stack.last() {
        let token = refresh(stream, iter, oracle, signed(distance))?;
        if token.is_matchable() {
            let lexeme = token.lexeme()?;
            if token.is_open() {
                stack.push(lexeme);
            } else if open.matches(lexeme) {
                stack.pop();
            } else {
                return None;
            }
        }
        distance += token.len();
        stream.next(iter);
    }
    Some(distance)
}

fn scan_backward(stream: &mut TokenStream, iter: &mut Cursor, oracle: &dyn ShadowOracle) -> Option<usize> {
    if iter.offset != 0 || stream.at_start(iter) {
        return None;
    }
    stream.prev(iter);
    let mut distance = stream.current(iter)?.len();
    let last = refresh(stream, iter, oracle, -signed(distance))?;
    if !(last.is_close() && last.is_matchable()) {
        return None;
    }
    let mut stack = vec![last.lexeme()?];
    stream.prev(iter);
    while let Some(&close) = stack.last() {
        distance += stream.current(iter)?.len();
        let token = refresh(stream, iter, oracle, -signed(distance))?;
        if token.is_matchable() {
            let lexeme = token.lexeme()?;
            if token.is_close() {
                stack.push(lexeme);
            } else if close.matches(lexeme) {
                stack.pop();
            } else {
                return None;
            }
        }
        stream.prev(iter);
    }
    Some(distance)
}

/// Walk backward from `iter`, which sits `start` characters before the
/// model cursor, to the first unmatched FREE open brace. Returns its lexeme
/// and its distance from the model cursor.
fn scan_enclosing(
    stream: &mut TokenStream,
    iter: &mut Cursor,
    oracle: &dyn ShadowOracle,
    start: usize,
) -> Option<(Lexeme, usize)> {
    let mut distance = start + iter.offset;
    let mut stack: Vec<Lexeme> = Vec::new();
    loop {
        if stream.at_start(iter) {
            return None;
        }
        stream.prev(iter);
        distance += stream.current(iter)?.len();
        let token = refresh(stream, iter, oracle, -signed(distance))?;
        if !token.is_matchable() {
            continue;
        }
        let lexeme = token.lexeme()?;
        if token.is_close() {
            stack.push(lexeme);
            continue;
        }
        match stack.pop() {
            None => return Some((lexeme, distance)),
            Some(close) if close.matches(lexeme) => {}
            Some(_) => return None,
        }
    }
}

fn scan_previous_newline(stream: &TokenStream, iter: &mut Cursor) -> Option<usize> {
    let mut distance = iter.offset;
    loop {
        if stream.at_start(iter) {
            return None;
        }
        stream.prev(iter);
        let token = stream.current(iter)?;
        if token.is_newline() {
            return Some(distance);
        }
        distance += token.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduced::shadow::{FreeOracle, ShadowSpans};

    fn at(text: &str, location: usize) -> ReducedModel {
        let mut model = ReducedModel::from_text(text).unwrap();
        let back = text.chars().count() - location;
        model.move_by(-(back as isize)).unwrap();
        model
    }

    #[test]
    fn balance_forward_spans_both_braces() {
        let mut m = at("(abc(def)ghi)", 0);
        assert_eq!(m.balance_forward(&mut FreeOracle), Some(13));
        let mut m = at("x(abc(def)ghi)", 5);
        assert_eq!(m.balance_forward(&mut FreeOracle), Some(5));
        assert_eq!(m.stream().live_copies(), 0);
    }

    #[test]
    fn balance_forward_needs_open_brace_at_cursor() {
        let mut m = at("a(b)", 0);
        assert_eq!(m.balance_forward(&mut FreeOracle), None);
        let mut m = at("a(b)", 4);
        assert_eq!(m.balance_forward(&mut FreeOracle), None);
    }

    #[test]
    fn balance_forward_mismatch_and_exhaustion() {
        let mut m = at("(a]", 0);
        assert_eq!(m.balance_forward(&mut FreeOracle), None);
        let mut m = at("((a)", 0);
        assert_eq!(m.balance_forward(&mut FreeOracle), None);
    }

    #[test]
    fn balance_backward_mirrors_forward() {
        let mut m = at("{}", 2);
        assert_eq!(m.balance_backward(&mut FreeOracle), Some(2));
        let mut m = at("(abc(def)ghi)", 13);
        assert_eq!(m.balance_backward(&mut FreeOracle), Some(13));
        let mut m = at("[(])", 4);
        assert_eq!(m.balance_backward(&mut FreeOracle), None);
        let mut m = at("a)", 0);
        assert_eq!(m.balance_backward(&mut FreeOracle), None);
    }

    #[test]
    fn shadowed_braces_are_skipped() {
        // "{ /* } */ }": the inner close brace sits inside a comment.
        let text = "{ /* } */ }";
        let mut oracle = ShadowSpans::new().with_span(2..9, ShadowState::BlockComment);
        let mut m = at(text, 0);
        assert_eq!(m.balance_forward(&mut oracle), Some(11));
        let mut m = at(text, 11);
        assert_eq!(m.balance_backward(&mut oracle), Some(11));
        // Without shadowing the inner brace wins.
        let mut m = at(text, 0);
        assert_eq!(m.balance_forward(&mut FreeOracle), Some(6));
    }

    #[test]
    fn shadowed_open_brace_is_not_a_start() {
        let mut oracle = ShadowSpans::new().with_span(0..3, ShadowState::LineComment);
        let mut m = at("(a)", 0);
        assert_eq!(m.balance_forward(&mut oracle), None);
    }

    #[test]
    fn newline_distances() {
        let m = at("ab\ncdef\ngh", 5);
        assert_eq!(m.get_dist_to_next_newline(), 2);
        assert_eq!(m.get_dist_to_previous_newline(0).unwrap(), Some(2));
        assert_eq!(m.get_dist_to_previous_newline(3).unwrap(), None);
        assert!(m.get_dist_to_previous_newline(6).unwrap_err().is_boundary());

        let m = at("ab\ncd", 3);
        assert_eq!(m.get_dist_to_previous_newline(0).unwrap(), Some(0));
        assert_eq!(m.get_dist_to_next_newline(), 2);
        let m = at("ab", 0);
        assert_eq!(m.get_dist_to_next_newline(), 2);
        assert_eq!(m.stream().live_copies(), 0);
    }

    #[test]
    fn enclosing_brace_of_line() {
        // Cursor at the end of "  y" inside the braces.
        let text = "f(x) {\n  y";
        let mut m = at(text, 10);
        let mut info = IndentInfo {
            dist_to_newline: Some(3),
            ..IndentInfo::default()
        };
        m.get_dist_to_enclosing_brace(&mut FreeOracle, &mut info).unwrap();
        assert_eq!(info.brace_type, Some(Lexeme::OpenCurly));
        assert_eq!(info.dist_to_brace, Some(5));
        assert_eq!(info.dist_to_newline, None);
    }

    #[test]
    fn enclosing_brace_skips_balanced_pairs() {
        let text = "{ (a) [b]\nc";
        let mut m = at(text, 11);
        let info = m.get_indent_information(&mut FreeOracle).unwrap();
        assert_eq!(info.brace_type, Some(Lexeme::OpenCurly));
        assert_eq!(info.dist_to_brace, Some(11));
        assert_eq!(info.dist_to_prev_newline, Some(1));
        assert_eq!(info.dist_to_newline, None);
    }

    #[test]
    fn indent_information_nested() {
        let text = "a\n  {\n    b(c,\n";
        let len = text.len();
        let mut m = at(text, len);
        let info = m.get_indent_information(&mut FreeOracle).unwrap();
        assert_eq!(info.dist_to_prev_newline, Some(0));
        assert_eq!(info.brace_type, Some(Lexeme::OpenParen));
        // "(" is 4 characters back: "c,\n" plus the paren itself.
        assert_eq!(info.dist_to_brace, Some(4));
        assert_eq!(info.dist_to_newline, Some(9));
        assert_eq!(info.brace_type_current, Some(Lexeme::OpenParen));
        assert_eq!(info.dist_to_brace_current, Some(4));
        assert_eq!(info.dist_to_newline_current, Some(9));
        assert_eq!(m.stream().live_copies(), 0);
    }

    #[test]
    fn indent_information_top_level() {
        let mut m = at("abc", 3);
        let info = m.get_indent_information(&mut FreeOracle).unwrap();
        assert_eq!(info, IndentInfo::default());
    }

    #[test]
    fn mismatched_enclosure_yields_nothing() {
        let mut m = at("(]\nx", 4);
        let info = m.get_indent_information(&mut FreeOracle).unwrap();
        assert_eq!(info.brace_type, None);
        assert_eq!(info.dist_to_brace, None);
    }

    #[test]
    fn shadow_runs_merge_states() {
        let mut oracle = ShadowSpans::new()
            .with_span(2..5, ShadowState::DoubleQuote)
            .with_span(7..9, ShadowState::LineComment);
        let m = at("0123456789", 1);
        let runs = m.get_shadow_runs(&mut oracle, 9).unwrap();
        let summary: Vec<(usize, usize, ShadowState)> =
            runs.iter().map(|r| (r.location, r.length, r.state)).collect();
        assert_eq!(
            summary,
            vec![
                (1, 1, ShadowState::Free),
                (2, 3, ShadowState::DoubleQuote),
                (5, 2, ShadowState::Free),
                (7, 2, ShadowState::LineComment),
                (9, 1, ShadowState::Free),
            ]
        );
        assert!(m.get_shadow_runs(&mut oracle, 10).unwrap_err().is_boundary());
    }
}
