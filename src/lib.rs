//! `reduced_lex` - incremental brace/gap model for editor structure queries
//!
//! A document is mirrored as a short list of tokens: runs of ordinary text
//! and the structural lexemes between them. Edits update only the tokens
//! next to the cursor, and brace matching, indentation and highlighting
//! queries walk the list from the cursor, so every operation costs time
//! proportional to the distance it covers rather than the document size.
//!
//! Key types:
//!
//! - [`ReducedModel`]: the token stream with its cursor and queries
//! - [`ShadowOracle`]: comment/string classification, supplied by the host
//! - [`Document`]: text, model and oracle kept in step, plus indentation
//!   and highlighting
//!
//! # Example
//!
//! ```
//! use reduced_lex::Document;
//!
//! let mut doc = Document::from_text("f(a[1])").unwrap();
//! assert_eq!(doc.balance_backward(), Some(6));
//! assert_eq!(doc.matching_brace_span(), Some(1..7));
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)] // Nothing here needs unsafe
#![allow(clippy::cast_possible_wrap)] // Offsets are far below isize::MAX
#![allow(clippy::cast_sign_loss)] // Signed deltas are checked before use
#![allow(clippy::module_name_repetitions)] // Allow document::DocumentText etc
#![allow(clippy::missing_errors_doc)] // Errors are the crate Error enum throughout
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod document;
pub mod error;
pub mod event;
pub mod reduced;

// Re-export core types at crate root
pub use document::{Document, DocumentOptions, HighlightSpan, HighlightStatus, PositionId};
pub use error::{Direction, Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use reduced::{
    FreeOracle, IndentInfo, Lexeme, ReducedModel, ShadowOracle, ShadowSpans, ShadowState,
    Token,
};
