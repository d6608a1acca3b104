//! The reduced lexical model.
//!
//! A document is reduced to a sequence of tokens: runs of ordinary text
//! ("gaps") and the structural lexemes between them (braces, newlines and
//! comment/escape markers). The model keeps that sequence current under
//! character edits and answers brace and indentation queries by walking it
//! from a cursor.
//!
//! Key types:
//!
//! - [`Token`], [`Lexeme`]: the token vocabulary
//! - [`TokenStream`], [`Cursor`]: the editable sequence
//! - [`ReducedModel`]: character-level editing and structural queries
//! - [`ShadowOracle`]: where comment/string state comes from
//!
//! # Example
//!
//! ```
//! use reduced_lex::reduced::{FreeOracle, ReducedModel};
//!
//! let mut model = ReducedModel::from_text("(abc(def)ghi)").unwrap();
//! model.move_by(-13).unwrap();
//! assert_eq!(model.balance_forward(&mut FreeOracle), Some(13));
//! ```

mod balance;
mod model;
mod shadow;
mod stream;
mod token;

pub use balance::{IndentInfo, ShadowRun};
pub use model::ReducedModel;
pub use shadow::{FreeOracle, ShadowOracle, ShadowSpans};
pub use stream::{Cursor, TokenStream};
pub use token::{BraceKind, Lexeme, ShadowState, Token};
