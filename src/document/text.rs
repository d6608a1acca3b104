//! Rope-backed document text using the ropey crate.
//!
//! Positions are character indices. Lines are delimited by `'\n'` only, the
//! same rule the reduced model uses for its newline tokens.

use ropey::Rope;

use crate::error::{Error, Result};

/// Document text with the line queries the indenter needs.
#[derive(Clone, Debug, Default)]
pub struct DocumentText {
    rope: Rope,
}

impl DocumentText {
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Character at `char_idx`, `None` past the end.
    #[must_use]
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        self.rope.get_char(char_idx)
    }

    /// Copy out `len` characters starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<String> {
        self.check_range(offset, len)?;
        Ok(self.rope.slice(offset..offset + len).to_string())
    }

    /// Insert text at a character position.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> Result<()> {
        self.check_range(char_idx, 0)?;
        self.rope.insert(char_idx, text);
        Ok(())
    }

    /// Remove `len` characters starting at `offset`.
    pub fn remove(&mut self, offset: usize, len: usize) -> Result<()> {
        self.check_range(offset, len)?;
        self.rope.remove(offset..offset + len);
        Ok(())
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<()> {
        let doc_len = self.len_chars();
        if offset.checked_add(len).is_some_and(|end| end <= doc_len) {
            Ok(())
        } else {
            Err(Error::InvalidRange { offset, len, doc_len })
        }
    }

    /// Start of the line holding `char_idx`.
    #[must_use]
    pub fn line_start(&self, char_idx: usize) -> usize {
        let mut chars = self.rope.chars_at(char_idx.min(self.len_chars()));
        let mut start = char_idx.min(self.len_chars());
        while let Some(ch) = chars.prev() {
            if ch == '\n' {
                break;
            }
            start -= 1;
        }
        start
    }

    /// Position of the `'\n'` ending the line holding `char_idx`, or the
    /// document length on the last line.
    #[must_use]
    pub fn line_end(&self, char_idx: usize) -> usize {
        let from = char_idx.min(self.len_chars());
        let rest = self.rope.chars_at(from).take_while(|&ch| ch != '\n').count();
        from + rest
    }

    /// Count of spaces and tabs opening the line that starts at `line_start`,
    /// and whether any of them is a tab.
    #[must_use]
    pub fn leading_whitespace(&self, line_start: usize) -> (usize, bool) {
        let mut count = 0;
        let mut has_tab = false;
        for ch in self.rope.chars_at(line_start.min(self.len_chars())) {
            match ch {
                ' ' => {}
                '\t' => has_tab = true,
                _ => break,
            }
            count += 1;
        }
        (count, has_tab)
    }

    /// First character on the line starting at `line_start` that is not a
    /// space or tab.
    #[must_use]
    pub fn first_non_blank(&self, line_start: usize) -> Option<char> {
        self.rope
            .chars_at(line_start.min(self.len_chars()))
            .take_while(|&ch| ch != '\n')
            .find(|&ch| ch != ' ' && ch != '\t')
    }
}

impl std::fmt::Display for DocumentText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl From<&str> for DocumentText {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }
}
