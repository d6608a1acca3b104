//! Token types of the reduced model.

use std::fmt;

/// Shadowing state of a character, as classified by the comment/string layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShadowState {
    /// Live code.
    #[default]
    Free,
    LineComment,
    BlockComment,
    SingleQuote,
    DoubleQuote,
}

impl ShadowState {
    #[must_use]
    pub fn is_free(self) -> bool {
        self == Self::Free
    }
}

/// Role of a lexeme in brace matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BraceKind {
    Open,
    Close,
    NonMatchable,
}

/// The structural lexemes a brace token can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lexeme {
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    OpenParen,
    CloseParen,
    Slash,
    Star,
    Newline,
    LineComment,
    BlockCommentStart,
    BlockCommentEnd,
    Backslash,
    EscapedBackslash,
    EscapedQuote,
}

impl Lexeme {
    /// Lexeme for a single character that always starts a brace token.
    #[must_use]
    pub fn structural(ch: char) -> Option<Self> {
        match ch {
            '{' => Some(Self::OpenCurly),
            '}' => Some(Self::CloseCurly),
            '[' => Some(Self::OpenSquare),
            ']' => Some(Self::CloseSquare),
            '(' => Some(Self::OpenParen),
            ')' => Some(Self::CloseParen),
            '\n' => Some(Self::Newline),
            _ => None,
        }
    }

    /// Parse lexeme text.
    #[must_use]
    pub fn from_text(text: &str) -> Option<Self> {
        let lexeme = match text {
            "{" => Self::OpenCurly,
            "}" => Self::CloseCurly,
            "[" => Self::OpenSquare,
            "]" => Self::CloseSquare,
            "(" => Self::OpenParen,
            ")" => Self::CloseParen,
            "/" => Self::Slash,
            "*" => Self::Star,
            "\n" => Self::Newline,
            "//" => Self::LineComment,
            "/*" => Self::BlockCommentStart,
            "*/" => Self::BlockCommentEnd,
            "\\" => Self::Backslash,
            "\\\\" => Self::EscapedBackslash,
            "\\\"" => Self::EscapedQuote,
            _ => return None,
        };
        Some(lexeme)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenCurly => "{",
            Self::CloseCurly => "}",
            Self::OpenSquare => "[",
            Self::CloseSquare => "]",
            Self::OpenParen => "(",
            Self::CloseParen => ")",
            Self::Slash => "/",
            Self::Star => "*",
            Self::Newline => "\n",
            Self::LineComment => "//",
            Self::BlockCommentStart => "/*",
            Self::BlockCommentEnd => "*/",
            Self::Backslash => "\\",
            Self::EscapedBackslash => "\\\\",
            Self::EscapedQuote => "\\\"",
        }
    }

    /// Length in characters (1 or 2).
    #[must_use]
    pub fn len(self) -> usize {
        self.as_str().len()
    }

    #[must_use]
    pub fn kind(self) -> BraceKind {
        match self {
            Self::OpenCurly | Self::OpenSquare | Self::OpenParen => BraceKind::Open,
            Self::CloseCurly | Self::CloseSquare | Self::CloseParen => BraceKind::Close,
            _ => BraceKind::NonMatchable,
        }
    }

    /// True when `self` and `other` form an open/close pair, in either order.
    #[must_use]
    pub fn matches(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::OpenCurly, Self::CloseCurly)
                | (Self::CloseCurly, Self::OpenCurly)
                | (Self::OpenSquare, Self::CloseSquare)
                | (Self::CloseSquare, Self::OpenSquare)
                | (Self::OpenParen, Self::CloseParen)
                | (Self::CloseParen, Self::OpenParen)
        )
    }

    /// Split a two-character lexeme into its halves. A half that is not a
    /// lexeme on its own comes back as `None` and decays into gap text.
    #[must_use]
    pub fn halves(self) -> Option<(Option<Self>, Option<Self>)> {
        let text = self.as_str();
        if text.len() != 2 {
            return None;
        }
        Some((Self::from_text(&text[..1]), Self::from_text(&text[1..])))
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token of the reduced model: a run of ordinary characters or a lexeme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Gap { len: usize, shadow: ShadowState },
    Brace { lexeme: Lexeme, shadow: ShadowState },
}

impl Token {
    #[must_use]
    pub fn gap(len: usize) -> Self {
        debug_assert!(len > 0, "gap tokens are never empty");
        Self::Gap {
            len,
            shadow: ShadowState::Free,
        }
    }

    #[must_use]
    pub fn brace(lexeme: Lexeme) -> Self {
        Self::Brace {
            lexeme,
            shadow: ShadowState::Free,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Gap { len, .. } => *len,
            Self::Brace { lexeme, .. } => lexeme.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }

    #[must_use]
    pub fn is_brace(&self) -> bool {
        matches!(self, Self::Brace { .. })
    }

    #[must_use]
    pub fn lexeme(&self) -> Option<Lexeme> {
        match self {
            Self::Gap { .. } => None,
            Self::Brace { lexeme, .. } => Some(*lexeme),
        }
    }

    #[must_use]
    pub fn is_newline(&self) -> bool {
        self.lexeme() == Some(Lexeme::Newline)
    }

    /// True for braces of two characters (`//`, `/*`, `*/`, `\\`, `\"`).
    #[must_use]
    pub fn is_multi_char_brace(&self) -> bool {
        matches!(self, Self::Brace { lexeme, .. } if lexeme.len() > 1)
    }

    #[must_use]
    pub fn shadow(&self) -> ShadowState {
        match self {
            Self::Gap { shadow, .. } | Self::Brace { shadow, .. } => *shadow,
        }
    }

    pub fn set_shadow(&mut self, state: ShadowState) {
        match self {
            Self::Gap { shadow, .. } | Self::Brace { shadow, .. } => *shadow = state,
        }
    }

    /// Whether this token takes part in balancing: an open or close brace in
    /// live code.
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        match self {
            Self::Gap { .. } => false,
            Self::Brace { lexeme, shadow } => {
                lexeme.kind() != BraceKind::NonMatchable && shadow.is_free()
            }
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Brace { lexeme, .. } if lexeme.kind() == BraceKind::Open)
    }

    #[must_use]
    pub fn is_close(&self) -> bool {
        matches!(self, Self::Brace { lexeme, .. } if lexeme.kind() == BraceKind::Close)
    }

    /// Grow a gap by `by` characters.
    pub(crate) fn grow(&mut self, by: usize) -> crate::Result<()> {
        match self {
            Self::Gap { len, .. } => {
                *len += by;
                Ok(())
            }
            Self::Brace { .. } => Err(crate::Error::Invariant("cannot grow a brace")),
        }
    }

    /// Shrink a gap by `by` characters; the gap must stay non-empty.
    pub(crate) fn shrink(&mut self, by: usize) -> crate::Result<()> {
        match self {
            Self::Gap { len, .. } if by < *len => {
                *len -= by;
                Ok(())
            }
            Self::Gap { .. } => Err(crate::Error::Invariant("shrink would empty a gap")),
            Self::Brace { .. } => Err(crate::Error::Invariant("cannot shrink a brace")),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap { len, .. } => write!(f, "_{len}"),
            Self::Brace {
                lexeme: Lexeme::Newline,
                ..
            } => f.write_str("\\n"),
            Self::Brace { lexeme, .. } => write!(f, "{lexeme}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexeme_text_round_trips() {
        for text in ["{", "}", "[", "]", "(", ")", "/", "*", "\n", "//", "/*", "*/", "\\", "\\\\", "\\\""] {
            let lexeme = Lexeme::from_text(text).expect("known lexeme");
            assert_eq!(lexeme.as_str(), text);
            assert_eq!(lexeme.len(), text.len());
        }
        assert_eq!(Lexeme::from_text("\""), None);
        assert_eq!(Lexeme::from_text("ab"), None);
    }

    #[test]
    fn structural_characters() {
        assert_eq!(Lexeme::structural('{'), Some(Lexeme::OpenCurly));
        assert_eq!(Lexeme::structural('\n'), Some(Lexeme::Newline));
        assert_eq!(Lexeme::structural('/'), None);
        assert_eq!(Lexeme::structural('a'), None);
    }

    #[test]
    fn kinds_and_matching() {
        assert_eq!(Lexeme::OpenParen.kind(), BraceKind::Open);
        assert_eq!(Lexeme::CloseSquare.kind(), BraceKind::Close);
        assert_eq!(Lexeme::LineComment.kind(), BraceKind::NonMatchable);
        assert!(Lexeme::OpenCurly.matches(Lexeme::CloseCurly));
        assert!(Lexeme::CloseParen.matches(Lexeme::OpenParen));
        assert!(!Lexeme::OpenCurly.matches(Lexeme::CloseParen));
        assert!(!Lexeme::BlockCommentStart.matches(Lexeme::BlockCommentEnd));
    }

    #[test]
    fn halves_of_two_char_lexemes() {
        assert_eq!(
            Lexeme::BlockCommentStart.halves(),
            Some((Some(Lexeme::Slash), Some(Lexeme::Star)))
        );
        assert_eq!(
            Lexeme::EscapedQuote.halves(),
            Some((Some(Lexeme::Backslash), None))
        );
        assert_eq!(Lexeme::OpenCurly.halves(), None);
    }

    #[test]
    fn matchable_predicate() {
        assert!(Token::brace(Lexeme::OpenCurly).is_matchable());
        assert!(!Token::gap(3).is_matchable());
        assert!(!Token::brace(Lexeme::Newline).is_matchable());
        assert!(!Token::brace(Lexeme::EscapedBackslash).is_matchable());

        let mut commented = Token::brace(Lexeme::CloseParen);
        commented.set_shadow(ShadowState::BlockComment);
        assert!(!commented.is_matchable());
    }

    #[test]
    fn grow_and_shrink_gaps_only() {
        let mut gap = Token::gap(2);
        gap.grow(3).unwrap();
        assert_eq!(gap.len(), 5);
        gap.shrink(4).unwrap();
        assert_eq!(gap.len(), 1);
        assert!(gap.shrink(1).unwrap_err().is_invariant());

        let mut brace = Token::brace(Lexeme::OpenCurly);
        assert!(brace.grow(1).unwrap_err().is_invariant());
        assert!(brace.shrink(1).unwrap_err().is_invariant());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Token::gap(4).to_string(), "_4");
        assert_eq!(Token::brace(Lexeme::Newline).to_string(), "\\n");
        assert_eq!(Token::brace(Lexeme::BlockCommentEnd).to_string(), "*/");
    }
}
