//! Character-level editing of the token stream.

use std::fmt;

use super::stream::{Cursor, TokenStream};
use super::token::{Lexeme, ShadowState, Token};
use crate::error::{Direction, Error, Result};
use crate::event::{LogLevel, emit_log_with};

/// Incrementally maintained brace/gap view of a document.
///
/// The model only knows where structural lexemes are and how long the runs
/// of ordinary text between them are. Every edit touches the tokens next to
/// the cursor and nothing else, so the cost of an operation is bounded by
/// the distance it travels.
///
/// The model owns the one authoritative caret position of the document,
/// [`location`](Self::location). It moves with every insert, delete and
/// relative move.
#[derive(Debug)]
pub struct ReducedModel {
    pub(super) stream: TokenStream,
    pub(super) cursor: Cursor,
    pub(super) location: usize,
    pub(super) len: usize,
}

impl Default for ReducedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ReducedModel {
    /// Create a model for an empty document.
    #[must_use]
    pub fn new() -> Self {
        let stream = TokenStream::new();
        let cursor = stream.cursor();
        Self {
            stream,
            cursor,
            location: 0,
            len: 0,
        }
    }

    /// Create a model holding `text`, cursor at the end.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut model = Self::new();
        model.insert_str(text)?;
        Ok(model)
    }

    /// Document length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Absolute position of the cursor.
    #[must_use]
    pub fn location(&self) -> usize {
        self.location
    }

    #[must_use]
    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Token under the cursor; `None` at the start or end of the stream.
    #[must_use]
    pub fn current(&self) -> Option<&Token> {
        self.stream.current(&self.cursor)
    }

    /// Insert one character at the cursor; the cursor ends up after it.
    pub fn insert_char(&mut self, ch: char) -> Result<()> {
        match Lexeme::structural(ch) {
            Some(lexeme) => self.insert_brace(lexeme),
            None => self.insert_gap(1),
        }
    }

    /// Insert `text` one character at a time.
    pub fn insert_str(&mut self, text: &str) -> Result<()> {
        text.chars().try_for_each(|ch| self.insert_char(ch))
    }

    /// Insert a pseudo-delimiter token, e.g. a comment marker recognised by
    /// a lexically aware host.
    pub fn insert_lexeme(&mut self, lexeme: Lexeme) -> Result<()> {
        self.insert_brace(lexeme)
    }

    fn insert_gap(&mut self, length: usize) -> Result<()> {
        let stream = &mut self.stream;
        let cursor = &mut self.cursor;
        if stream.at_start(cursor) {
            if stream.next_item(cursor).is_some_and(Token::is_gap) {
                stream.next(cursor);
                grow(stream.current_mut(cursor), length)?;
                cursor.offset = length;
            } else {
                stream.insert(cursor, Token::gap(length));
            }
        } else if stream.at_end(cursor) {
            if stream.prev_item(cursor).is_some_and(Token::is_gap) {
                grow(stream.prev_item_mut(cursor), length)?;
            } else {
                stream.insert(cursor, Token::gap(length));
            }
        } else if cursor.offset > 0 && stream.current(cursor).is_some_and(Token::is_multi_char_brace) {
            self.split_lexeme()?;
            return self.insert_gap(length);
        } else if stream.current(cursor).is_some_and(Token::is_gap) {
            grow(stream.current_mut(cursor), length)?;
            cursor.offset += length;
        } else if !stream.at_first_item(cursor) && stream.prev_item(cursor).is_some_and(Token::is_gap) {
            grow(stream.prev_item_mut(cursor), length)?;
        } else {
            stream.insert(cursor, Token::gap(length));
        }
        self.location += length;
        self.len += length;
        Ok(())
    }

    fn insert_brace(&mut self, lexeme: Lexeme) -> Result<()> {
        let stream = &mut self.stream;
        let cursor = &mut self.cursor;
        let brace = Token::brace(lexeme);
        if stream.at_start(cursor) || stream.at_end(cursor) {
            stream.insert(cursor, brace);
        } else if cursor.offset > 0 && stream.current(cursor).is_some_and(Token::is_multi_char_brace) {
            self.split_lexeme()?;
            return self.insert_brace(lexeme);
        } else if cursor.offset > 0 {
            // Inside a gap: the gap keeps the text after the cursor and the
            // text before it becomes a new gap ahead of the brace.
            let before = cursor.offset;
            stream
                .current_mut(cursor)
                .ok_or(Error::Invariant("cursor offset past the tail"))?
                .shrink(before)?;
            stream.insert(cursor, Token::gap(before));
            stream.insert(cursor, brace);
            cursor.offset = 0;
        } else {
            stream.insert(cursor, brace);
        }
        self.location += lexeme.len();
        self.len += lexeme.len();
        Ok(())
    }

    /// Break the two-character lexeme the cursor sits inside into its halves.
    fn split_lexeme(&mut self) -> Result<()> {
        let stream = &mut self.stream;
        let cursor = &mut self.cursor;
        let token = *stream
            .current(cursor)
            .ok_or(Error::Invariant("split at a sentinel"))?;
        let (first, second) = token
            .lexeme()
            .and_then(Lexeme::halves)
            .ok_or(Error::Invariant("split of a single-character token"))?;
        if let Some(slot) = stream.current_mut(cursor) {
            *slot = half_token(second, token.shadow());
        }
        stream.insert(cursor, half_token(first, token.shadow()));
        cursor.offset = 0;
        coalesce(stream, cursor)
    }

    /// Move the cursor by `count` characters (negative moves backward).
    ///
    /// Asking for more characters than exist on that side is a boundary
    /// error; the cursor does not move.
    pub fn move_by(&mut self, count: isize) -> Result<()> {
        self.check_reach(count)?;
        self.stream.move_by(&mut self.cursor, count)?;
        self.location = self.location.wrapping_add_signed(count);
        Ok(())
    }

    /// Delete `count` characters after the cursor, or `-count` characters
    /// before it when `count` is negative.
    pub fn delete(&mut self, count: isize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.check_reach(count)?;
        let mut from = self.stream.copy(&self.cursor);
        let mut to = self.stream.copy(&self.cursor);
        let result = self.delete_span(&mut from, &mut to, count);
        if result.is_ok() {
            let removed = count.unsigned_abs();
            self.cursor.set_to(&to);
            self.len -= removed;
            if count < 0 {
                self.location -= removed;
            }
        }
        self.stream.dispose(from);
        self.stream.dispose(to);
        result.inspect_err(|err| {
            emit_log_with(LogLevel::Error, || format!("delete({count}) failed: {err}"));
        })
    }

    fn delete_span(&mut self, from: &mut Cursor, to: &mut Cursor, count: isize) -> Result<()> {
        let stream = &mut self.stream;
        if count > 0 {
            stream.move_by(to, count)?;
        } else {
            stream.move_by(from, count)?;
        }

        if from.same_token(to) && stream.current(from).is_some_and(Token::is_gap) {
            stream
                .current_mut(from)
                .ok_or(Error::Invariant("gap expected"))?
                .shrink(count.unsigned_abs())?;
            to.set_to(from);
            return Ok(());
        }

        clip_front(stream, to)?;
        if from.offset == 0 {
            stream.prev(from);
        } else {
            clip_back(stream, from)?;
        }
        stream.collapse(from, to)?;
        coalesce(stream, to)
    }

    fn check_reach(&self, count: isize) -> Result<()> {
        let requested = count.unsigned_abs();
        let (available, direction) = if count >= 0 {
            (self.len - self.location, Direction::Forward)
        } else {
            (self.location, Direction::Backward)
        };
        if requested <= available {
            return Ok(());
        }
        let err = Error::Boundary {
            requested,
            available,
            direction,
        };
        emit_log_with(LogLevel::Warn, || format!("rejected at {}: {err}", self.location));
        Err(err)
    }

    /// Verify the structural invariants. Walks the whole stream.
    pub fn check_invariants(&self) -> Result<()> {
        let mut total = 0;
        let mut prev_gap = false;
        for token in self.stream.iter() {
            if token.is_empty() {
                return Err(Error::Invariant("zero-length token"));
            }
            if prev_gap && token.is_gap() {
                return Err(Error::Invariant("adjacent gaps"));
            }
            prev_gap = token.is_gap();
            total += token.len();
        }
        if total != self.len {
            return Err(Error::Invariant("token lengths differ from document length"));
        }
        if !self.stream.is_linked(&self.cursor) {
            return Err(Error::Invariant("cursor references a removed token"));
        }
        let within = self
            .current()
            .map_or(self.cursor.offset == 0, |token| self.cursor.offset < token.len());
        if !within {
            return Err(Error::Invariant("cursor parked at a token end"));
        }
        if self.stream.position_of(&self.cursor) != self.location {
            return Err(Error::Invariant("location out of sync with cursor"));
        }
        if self.stream.live_copies() != 0 {
            return Err(Error::Invariant("cursor copy not disposed"));
        }
        Ok(())
    }
}

impl fmt::Display for ReducedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.stream, self.location)
    }
}

fn grow(token: Option<&mut Token>, by: usize) -> Result<()> {
    token.ok_or(Error::Invariant("gap expected"))?.grow(by)
}

fn half_token(half: Option<Lexeme>, shadow: ShadowState) -> Token {
    match half {
        Some(lexeme) => Token::Brace { lexeme, shadow },
        None => Token::Gap { len: 1, shadow },
    }
}

/// Drop the first `to.offset` characters of the token at `to`.
fn clip_front(stream: &mut TokenStream, to: &mut Cursor) -> Result<()> {
    if to.offset == 0 {
        return Ok(());
    }
    let token = stream
        .current_mut(to)
        .ok_or(Error::Invariant("clip past the tail"))?;
    match *token {
        Token::Gap { .. } => token.shrink(to.offset)?,
        Token::Brace { lexeme, shadow } => {
            let (_, second) = lexeme
                .halves()
                .ok_or(Error::Invariant("clip of a single-character brace"))?;
            *token = half_token(second, shadow);
        }
    }
    to.offset = 0;
    Ok(())
}

/// Keep only the first `from.offset` characters of the token at `from`.
fn clip_back(stream: &mut TokenStream, from: &Cursor) -> Result<()> {
    let token = stream
        .current_mut(from)
        .ok_or(Error::Invariant("clip at a sentinel"))?;
    match *token {
        Token::Gap { len, .. } => token.shrink(len - from.offset),
        Token::Brace { lexeme, shadow } => {
            let (first, _) = lexeme
                .halves()
                .ok_or(Error::Invariant("clip of a single-character brace"))?;
            *token = half_token(first, shadow);
            Ok(())
        }
    }
}

/// Merge gaps made adjacent around the cursor's token: the pair just before
/// it, then the token itself with both neighbours. The cursor keeps its
/// absolute position.
fn coalesce(stream: &mut TokenStream, cursor: &mut Cursor) -> Result<()> {
    if stream.prev_item(cursor).is_some_and(Token::is_gap) {
        let mut prev = stream.copy(cursor);
        stream.prev(&mut prev);
        let merged = if stream.prev_item(&prev).is_some_and(Token::is_gap) {
            absorb_prev_gap(stream, &mut prev)
        } else {
            Ok(())
        };
        stream.dispose(prev);
        merged?;
    }
    if stream.current(cursor).is_some_and(Token::is_gap) {
        if stream.next_item(cursor).is_some_and(Token::is_gap) {
            absorb_next_gap(stream, cursor)?;
        }
        if stream.prev_item(cursor).is_some_and(Token::is_gap) {
            absorb_prev_gap(stream, cursor)?;
        }
    }
    Ok(())
}

fn absorb_prev_gap(stream: &mut TokenStream, cursor: &mut Cursor) -> Result<()> {
    let mut prev = stream.copy(cursor);
    stream.prev(&mut prev);
    let removed = stream.remove(&mut prev);
    stream.dispose(prev);
    let len = removed?.len();
    grow(stream.current_mut(cursor), len)?;
    cursor.offset += len;
    Ok(())
}

fn absorb_next_gap(stream: &mut TokenStream, cursor: &Cursor) -> Result<()> {
    let mut next = stream.copy(cursor);
    stream.next(&mut next);
    let removed = stream.remove(&mut next);
    stream.dispose(next);
    let len = removed?.len();
    grow(stream.current_mut(cursor), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(text: &str) -> ReducedModel {
        ReducedModel::from_text(text).unwrap()
    }

    fn assert_valid(model: &ReducedModel) {
        if let Err(err) = model.check_invariants() {
            panic!("{err}: {model}");
        }
    }

    #[test]
    fn gap_insert_at_start_grows_following_gap() {
        let mut m = model("ab");
        m.move_by(-2).unwrap();
        assert_eq!(m.cursor().offset(), 0);
        m.insert_char('x').unwrap();
        assert_eq!(m.to_string(), "_3 @1");
        assert_valid(&m);
    }

    #[test]
    fn gap_insert_at_head_sentinel() {
        let mut m = model("{");
        m.move_by(-1).unwrap();
        m.insert_char('x').unwrap();
        assert_eq!(m.to_string(), "_1|{ @1");
        assert_valid(&m);
    }

    #[test]
    fn gap_insert_at_end_grows_preceding_gap() {
        let mut m = model("{a");
        m.insert_char('b').unwrap();
        assert_eq!(m.to_string(), "{|_2 @3");
        assert!(m.stream().at_end(m.cursor()));
        assert_valid(&m);
    }

    #[test]
    fn gap_insert_before_brace_grows_preceding_gap() {
        let mut m = model("a{");
        m.move_by(-1).unwrap();
        m.insert_char('b').unwrap();
        assert_eq!(m.to_string(), "_2|{ @2");
        assert_eq!(m.current(), Some(&Token::brace(Lexeme::OpenCurly)));
        assert_valid(&m);
    }

    #[test]
    fn gap_insert_between_braces() {
        let mut m = model("()");
        m.move_by(-1).unwrap();
        m.insert_char('x').unwrap();
        assert_eq!(m.to_string(), "(|_1|) @2");
        assert_valid(&m);
    }

    #[test]
    fn brace_insert_splits_gap() {
        let mut m = model("abcd");
        m.move_by(-2).unwrap();
        m.insert_char('[').unwrap();
        assert_eq!(m.to_string(), "_2|[|_2 @3");
        assert_eq!(m.cursor().offset(), 0);
        assert_eq!(m.current(), Some(&Token::gap(2)));
        assert_valid(&m);
    }

    #[test]
    fn newline_is_a_lexeme() {
        let m = model("a\nb");
        assert_eq!(m.to_string(), "_1|\\n|_1 @3");
        assert_valid(&m);
    }

    #[test]
    fn insert_inside_two_char_lexeme_splits_it() {
        let mut m = model("a");
        m.insert_lexeme(Lexeme::BlockCommentStart).unwrap();
        m.insert_char('b').unwrap();
        m.move_by(-2).unwrap();
        assert_eq!(m.cursor().offset(), 1);
        m.insert_char('x').unwrap();
        assert_eq!(m.to_string(), "_1|/|_1|*|_1 @3");
        assert_valid(&m);
    }

    #[test]
    fn split_quote_escape_decays_into_gap() {
        let mut m = model("a");
        m.insert_lexeme(Lexeme::EscapedQuote).unwrap();
        m.insert_char('b').unwrap();
        m.move_by(-2).unwrap();
        m.insert_char('(').unwrap();
        assert_eq!(m.to_string(), "_1|\\|(|_2 @3");
        assert_valid(&m);
    }

    #[test]
    fn delete_inside_gap_only_shrinks() {
        let mut m = model("abcdef");
        m.move_by(-4).unwrap();
        m.delete(2).unwrap();
        assert_eq!(m.to_string(), "_4 @2");
        m.delete(-1).unwrap();
        assert_eq!(m.to_string(), "_3 @1");
        assert_valid(&m);
    }

    #[test]
    fn delete_brace_merges_gaps() {
        let mut m = model("ab{cd");
        m.move_by(-3).unwrap();
        m.delete(1).unwrap();
        assert_eq!(m.to_string(), "_4 @2");
        assert_eq!(m.cursor().offset(), 2);
        assert_valid(&m);
    }

    #[test]
    fn backspace_over_brace_merges_gaps() {
        let mut m = model("ab{cd");
        m.move_by(-2).unwrap();
        m.delete(-1).unwrap();
        assert_eq!(m.to_string(), "_4 @2");
        assert_valid(&m);
    }

    #[test]
    fn delete_across_several_tokens_clips_ends() {
        let mut m = model("ab(cd)ef");
        m.move_by(-7).unwrap();
        m.delete(6).unwrap();
        assert_eq!(m.to_string(), "_2 @1");
        assert_valid(&m);
    }

    #[test]
    fn delete_everything() {
        let mut m = model("x{y}\nz");
        m.delete(-6).unwrap();
        assert_eq!(m.to_string(), " @0");
        assert!(m.stream().is_empty());
        assert_valid(&m);
        m.insert_char('q').unwrap();
        assert_eq!(m.to_string(), "_1 @1");
    }

    #[test]
    fn delete_half_of_two_char_lexeme() {
        let mut m = model("a");
        m.insert_lexeme(Lexeme::LineComment).unwrap();
        m.insert_char('b').unwrap();
        m.move_by(-2).unwrap();
        m.delete(-1).unwrap();
        assert_eq!(m.to_string(), "_1|/|_1 @1");
        assert_valid(&m);
    }

    #[test]
    fn delete_half_quote_escape_merges_decayed_gap() {
        let mut m = model("a");
        m.insert_lexeme(Lexeme::EscapedQuote).unwrap();
        m.insert_char('b').unwrap();
        m.move_by(-2).unwrap();
        m.delete(-1).unwrap();
        assert_eq!(m.to_string(), "_3 @1");
        assert_valid(&m);
    }

    #[test]
    fn boundary_errors_leave_model_untouched() {
        let mut m = model("a(b");
        let err = m.move_by(1).unwrap_err();
        assert_eq!(
            err,
            Error::Boundary {
                requested: 1,
                available: 0,
                direction: Direction::Forward
            }
        );
        assert!(m.delete(-4).unwrap_err().is_boundary());
        assert_eq!(m.to_string(), "_1|(|_1 @3");
        assert_valid(&m);
    }

    #[test]
    fn brace_insert_at_head_and_tail() {
        let mut m = model("x");
        m.move_by(-1).unwrap();
        m.insert_char('{').unwrap();
        m.move_by(1).unwrap();
        m.insert_char('}').unwrap();
        assert_eq!(m.to_string(), "{|_1|} @3");
        assert_valid(&m);
    }
}
