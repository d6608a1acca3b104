//! Arena-backed token sequence with index cursors.
//!
//! Tokens live in a `Vec` of nodes linked by index, bracketed by a head and a
//! tail sentinel. Removed nodes go to a free list, so insertion and removal
//! at a cursor are O(1) and never shift other nodes. A [`Cursor`] is a node
//! index plus an offset into that node's token.

use std::cell::Cell;
use std::fmt;

use super::token::Token;
use crate::error::{Direction, Error, Result};

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Clone, Debug)]
struct Node {
    token: Option<Token>,
    prev: usize,
    next: usize,
}

/// A position in a [`TokenStream`]: the current token and an offset into it.
///
/// Cursors are deliberately neither `Clone` nor `Copy`. A second cursor is
/// obtained with [`TokenStream::copy`] and handed back with
/// [`TokenStream::dispose`], so the stream can account for every copy that
/// is alive while it is being mutated.
#[derive(Debug, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) node: usize,
    pub(crate) offset: usize,
}

impl Cursor {
    /// Offset into the current token.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Point this cursor where `other` points.
    pub fn set_to(&mut self, other: &Cursor) {
        self.node = other.node;
        self.offset = other.offset;
    }

    /// True when both cursors reference the same token.
    #[must_use]
    pub fn same_token(&self, other: &Cursor) -> bool {
        self.node == other.node
    }
}

/// Ordered, editable sequence of tokens.
#[derive(Debug)]
pub struct TokenStream {
    nodes: Vec<Node>,
    free: Vec<usize>,
    len: usize,
    live_copies: Cell<usize>,
    visits: Cell<usize>,
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStream {
    /// Create an empty stream (head and tail sentinels only).
    #[must_use]
    pub fn new() -> Self {
        let head = Node {
            token: None,
            prev: HEAD,
            next: TAIL,
        };
        let tail = Node {
            token: None,
            prev: HEAD,
            next: TAIL,
        };
        Self {
            nodes: vec![head, tail],
            free: Vec::new(),
            len: 0,
            live_copies: Cell::new(0),
            visits: Cell::new(0),
        }
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A cursor at the head sentinel. Not counted as a copy.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor {
            node: HEAD,
            offset: 0,
        }
    }

    /// Duplicate a cursor. Every copy must be returned through [`dispose`](Self::dispose).
    #[must_use]
    pub fn copy(&self, cursor: &Cursor) -> Cursor {
        self.live_copies.set(self.live_copies.get() + 1);
        Cursor {
            node: cursor.node,
            offset: cursor.offset,
        }
    }

    /// Release a cursor obtained from [`copy`](Self::copy).
    pub fn dispose(&self, cursor: Cursor) {
        debug_assert!(self.live_copies.get() > 0, "dispose without copy");
        self.live_copies
            .set(self.live_copies.get().saturating_sub(1));
        let _ = cursor;
    }

    /// Number of copies not yet disposed.
    #[must_use]
    pub fn live_copies(&self) -> usize {
        self.live_copies.get()
    }

    /// Number of cursor steps taken since the last reset.
    #[must_use]
    pub fn visits(&self) -> usize {
        self.visits.get()
    }

    pub fn reset_visits(&self) {
        self.visits.set(0);
    }

    fn visit(&self) {
        self.visits.set(self.visits.get() + 1);
    }

    #[must_use]
    pub fn at_start(&self, cursor: &Cursor) -> bool {
        cursor.node == HEAD
    }

    #[must_use]
    pub fn at_end(&self, cursor: &Cursor) -> bool {
        cursor.node == TAIL
    }

    #[must_use]
    pub fn at_first_item(&self, cursor: &Cursor) -> bool {
        cursor.node != TAIL && self.nodes[HEAD].next == cursor.node
    }

    #[must_use]
    pub fn at_last_item(&self, cursor: &Cursor) -> bool {
        cursor.node != HEAD && self.nodes[TAIL].prev == cursor.node
    }

    /// The token under the cursor; `None` at either sentinel.
    #[must_use]
    pub fn current(&self, cursor: &Cursor) -> Option<&Token> {
        self.nodes[cursor.node].token.as_ref()
    }

    pub fn current_mut(&mut self, cursor: &Cursor) -> Option<&mut Token> {
        self.nodes[cursor.node].token.as_mut()
    }

    /// The token before the cursor's token; `None` when that is the head.
    #[must_use]
    pub fn prev_item(&self, cursor: &Cursor) -> Option<&Token> {
        if cursor.node == HEAD {
            return None;
        }
        self.nodes[self.nodes[cursor.node].prev].token.as_ref()
    }

    pub fn prev_item_mut(&mut self, cursor: &Cursor) -> Option<&mut Token> {
        if cursor.node == HEAD {
            return None;
        }
        let prev = self.nodes[cursor.node].prev;
        self.nodes[prev].token.as_mut()
    }

    /// The token after the cursor's token; `None` when that is the tail.
    #[must_use]
    pub fn next_item(&self, cursor: &Cursor) -> Option<&Token> {
        if cursor.node == TAIL {
            return None;
        }
        self.nodes[self.nodes[cursor.node].next].token.as_ref()
    }

    /// Step to the next token, offset 0. Stays put at the tail.
    pub fn next(&self, cursor: &mut Cursor) {
        if cursor.node != TAIL {
            cursor.node = self.nodes[cursor.node].next;
            self.visit();
        }
        cursor.offset = 0;
    }

    /// Step to the previous token, offset 0. Stays put at the head.
    pub fn prev(&self, cursor: &mut Cursor) {
        if cursor.node != HEAD {
            cursor.node = self.nodes[cursor.node].prev;
            self.visit();
        }
        cursor.offset = 0;
    }

    /// Insert `token` before the cursor's token (before the first item when
    /// the cursor is at the head). The cursor keeps its token, so it ends up
    /// immediately after the inserted one.
    pub fn insert(&mut self, cursor: &mut Cursor, token: Token) {
        debug_assert!(!token.is_empty(), "zero-length token inserted");
        if cursor.node == HEAD {
            cursor.node = self.nodes[HEAD].next;
            cursor.offset = 0;
        }
        let next = cursor.node;
        let prev = self.nodes[next].prev;
        let node = Node {
            token: Some(token),
            prev,
            next,
        };
        let index = if let Some(index) = self.free.pop() {
            self.nodes[index] = node;
            index
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        };
        self.nodes[prev].next = index;
        self.nodes[next].prev = index;
        self.len += 1;
    }

    /// Remove the cursor's token; the cursor moves to the following token.
    pub fn remove(&mut self, cursor: &mut Cursor) -> Result<Token> {
        if cursor.node == HEAD || cursor.node == TAIL {
            return Err(Error::Invariant("remove at a sentinel"));
        }
        let index = cursor.node;
        let next = self.unlink(index);
        cursor.node = next;
        cursor.offset = 0;
        let token = self.nodes[index]
            .token
            .take()
            .ok_or(Error::Invariant("removed node held no token"))?;
        self.free.push(index);
        Ok(token)
    }

    fn unlink(&mut self, index: usize) -> usize {
        let Node { prev, next, .. } = self.nodes[index];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.len -= 1;
        next
    }

    /// Remove every token strictly between `left` and `right`. Both cursors
    /// keep their tokens and now sit on either side of the seam.
    pub fn collapse(&mut self, left: &mut Cursor, right: &mut Cursor) -> Result<()> {
        if left.node == right.node {
            return Ok(());
        }
        if left.node == TAIL || right.node == HEAD {
            return Err(Error::Invariant("collapse cursors out of order"));
        }
        let mut doomed = Vec::new();
        let mut walk = self.nodes[left.node].next;
        while walk != right.node {
            if walk == TAIL {
                return Err(Error::Invariant("collapse cursors out of order"));
            }
            doomed.push(walk);
            walk = self.nodes[walk].next;
            self.visit();
        }
        self.nodes[left.node].next = right.node;
        self.nodes[right.node].prev = left.node;
        for index in doomed {
            self.nodes[index].token = None;
            self.free.push(index);
            self.len -= 1;
        }
        Ok(())
    }

    /// Move `cursor` by `count` characters. Landing on a token's end
    /// normalizes to offset 0 of the following token. On error the cursor
    /// is left where it was.
    pub fn move_by(&self, cursor: &mut Cursor, count: isize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        let (node, offset) = if count > 0 {
            self.walk_forward(cursor.node, cursor.offset, count.unsigned_abs())?
        } else {
            self.walk_backward(cursor.node, cursor.offset, count.unsigned_abs())?
        };
        cursor.node = node;
        cursor.offset = offset;
        Ok(())
    }

    fn token_len(&self, node: usize) -> usize {
        self.nodes[node].token.as_ref().map_or(0, Token::len)
    }

    fn walk_forward(&self, mut node: usize, mut offset: usize, count: usize) -> Result<(usize, usize)> {
        let mut remaining = count;
        if node == HEAD {
            node = self.nodes[HEAD].next;
            offset = 0;
        }
        loop {
            if node == TAIL {
                if remaining == 0 {
                    return Ok((node, 0));
                }
                return Err(Error::Boundary {
                    requested: count,
                    available: count - remaining,
                    direction: Direction::Forward,
                });
            }
            let room = self.token_len(node) - offset;
            if remaining < room {
                return Ok((node, offset + remaining));
            }
            remaining -= room;
            node = self.nodes[node].next;
            offset = 0;
            self.visit();
        }
    }

    fn walk_backward(&self, mut node: usize, mut offset: usize, count: usize) -> Result<(usize, usize)> {
        let boundary = |remaining: usize| Error::Boundary {
            requested: count,
            available: count - remaining,
            direction: Direction::Backward,
        };
        let mut remaining = count;
        if node == HEAD {
            return Err(boundary(remaining));
        }
        if node == TAIL {
            node = self.nodes[TAIL].prev;
            if node == HEAD {
                return Err(boundary(remaining));
            }
            offset = self.token_len(node);
            self.visit();
        }
        loop {
            if remaining <= offset {
                return Ok((node, offset - remaining));
            }
            remaining -= offset;
            node = self.nodes[node].prev;
            if node == HEAD {
                return Err(boundary(remaining));
            }
            offset = self.token_len(node);
            self.visit();
        }
    }

    /// Iterate tokens from first to last.
    pub fn iter(&self) -> impl Iterator<Item = &Token> + '_ {
        let mut node = self.nodes[HEAD].next;
        std::iter::from_fn(move || {
            if node == TAIL {
                return None;
            }
            let token = self.nodes[node].token.as_ref();
            node = self.nodes[node].next;
            token
        })
    }

    /// Sum of all token lengths. Walks the whole stream.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.iter().map(Token::len).sum()
    }

    /// Absolute character position of a cursor. Walks from the head.
    #[must_use]
    pub fn position_of(&self, cursor: &Cursor) -> usize {
        if cursor.node == HEAD {
            return 0;
        }
        let mut position = cursor.offset;
        let mut node = self.nodes[cursor.node].prev;
        while node != HEAD {
            position += self.token_len(node);
            node = self.nodes[node].prev;
        }
        position
    }

    /// Whether the cursor references a token that is still linked.
    #[must_use]
    pub fn is_linked(&self, cursor: &Cursor) -> bool {
        cursor.node == HEAD
            || cursor.node == TAIL
            || (cursor.node < self.nodes.len() && self.nodes[cursor.node].token.is_some())
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
