//! Auto-indentation driven by the reduced model's indent information.

use std::cmp::Ordering;

use super::{Document, PositionId};
use crate::error::Result;
use crate::event::{LogLevel, emit_log_with};
use crate::reduced::{Lexeme, ShadowOracle};

impl<O: ShadowOracle> Document<O> {
    /// Indent the lines touched by the selection `sel_start..sel_end`.
    ///
    /// An empty selection indents the caret's line only; a caret inside the
    /// old leading whitespace lands at the end of the new whitespace. A real
    /// selection indents every line from the one holding `sel_start` through
    /// the one holding `sel_end` and leaves the caret at the selection end.
    pub fn indent_lines(&mut self, sel_start: usize, sel_end: usize) -> Result<()> {
        if sel_start == sel_end {
            return self.indent_caret_line(sel_start);
        }
        let (first, last) = (sel_start.min(sel_end), sel_start.max(sel_end));
        self.check_offset(last)?;
        let end = self.create_position(last)?;
        let result = self.indent_range(first, end);
        let target = self.position_offset(end);
        self.release_position(end);
        result?;
        match target {
            Some(target) => self.set_current_location(target),
            None => Ok(()),
        }
    }

    fn indent_caret_line(&mut self, caret: usize) -> Result<()> {
        self.set_current_location(caret)?;
        let line_start = self.text.line_start(caret);
        let (before, _) = self.text.leading_whitespace(line_start);
        let marker = self.create_position(caret)?;
        let result = self.indent_line();
        let moved = self.position_offset(marker);
        self.release_position(marker);
        result?;

        let target = if caret <= line_start + before {
            line_start + self.text.leading_whitespace(line_start).0
        } else {
            moved.unwrap_or(caret)
        };
        self.set_current_location(target)
    }

    // The end marker keeps the stopping point valid while earlier lines
    // gain or lose whitespace.
    fn indent_range(&mut self, first: usize, end: PositionId) -> Result<()> {
        let mut line_start = self.text.line_start(first);
        loop {
            self.set_current_location(line_start)?;
            self.indent_line()?;
            self.set_current_location(line_start)?;
            let line_end = line_start + self.model.get_dist_to_next_newline();
            let stop = self.position_offset(end).unwrap_or(line_end);
            if line_end >= stop || line_end >= self.len() {
                return Ok(());
            }
            line_start = line_end + 1;
        }
    }

    /// Re-indent the caret's line and return the new indentation width.
    ///
    /// The caret is left at the end of the line.
    pub fn indent_line(&mut self) -> Result<usize> {
        let line_end = self.current_location() + self.model.get_dist_to_next_newline();
        self.set_current_location(line_end)?;
        let info = self.model.get_indent_information(&mut self.oracle)?;
        let line_start = line_end - info.dist_to_prev_newline.unwrap_or(line_end);
        let indent = self.options.indent_width;

        let width = match (info.dist_to_prev_newline, info.brace_type, info.dist_to_brace) {
            (None, ..) => 0,
            _ if line_start < 2 => 0,
            (_, Some(Lexeme::OpenParen | Lexeme::OpenSquare), Some(dist)) => {
                let brace = line_end - dist;
                brace - self.text.line_start(brace) + 1
            }
            (_, Some(Lexeme::OpenCurly), Some(dist)) => {
                let brace = line_end - dist;
                let (base, _) = self.text.leading_whitespace(self.text.line_start(brace));
                self.indent_special_cases(base + indent, line_start)
            }
            _ => self.indent_special_cases(0, line_start),
        };
        emit_log_with(LogLevel::Debug, || {
            format!(
                "indent line at {line_start}: enclosing {:?} -> width {width}",
                info.brace_type
            )
        });
        self.tab(width, line_start)?;
        let line_end = self.text.line_end(line_start);
        self.set_current_location(line_end)?;
        Ok(width)
    }

    /// Adjust `tab` for the line starting at `line_start`.
    ///
    /// A line opening with `}` dedents one unit; a line opening with `{`
    /// keeps `tab`. Any other line is a continuation, one unit deeper, unless
    /// the last live non-blank character before it is `;`, `{` or `}`.
    pub fn indent_special_cases(&mut self, tab: usize, line_start: usize) -> usize {
        let indent = self.options.indent_width;
        match self.text.first_non_blank(line_start) {
            Some('}') => return tab.saturating_sub(indent),
            Some('{') => return tab,
            _ => {}
        }
        self.oracle.reset_location(line_start);
        let mut pos = line_start;
        while pos > 0 {
            pos -= 1;
            let Some(ch) = self.text.char_at(pos) else {
                break;
            };
            let rel = pos as isize - line_start as isize;
            if ch.is_whitespace() || !self.oracle.state_at_rel_location(rel).is_free() {
                continue;
            }
            return if matches!(ch, ';' | '{' | '}') {
                tab
            } else {
                tab + indent
            };
        }
        tab
    }

    /// Make the line starting at `line_start` open with exactly `width`
    /// spaces. Leading whitespace containing a tab is replaced outright.
    pub fn tab(&mut self, width: usize, line_start: usize) -> Result<()> {
        let (current, has_tab) = self.text.leading_whitespace(line_start);
        if has_tab {
            self.remove(line_start, current)?;
            return self.insert_string(line_start, &" ".repeat(width));
        }
        match current.cmp(&width) {
            Ordering::Less => self.insert_string(line_start, &" ".repeat(width - current)),
            Ordering::Greater => self.remove(line_start, current - width),
            Ordering::Equal => Ok(()),
        }
    }
}
