//! Fuzz target for the reduced model's edit operations.
//!
//! Replays an arbitrary script of inserts, moves and deletes against the
//! model and a plain character vector, and checks that the two agree and
//! that the token stream stays well formed after every step.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reduced_lex::{Lexeme, ReducedModel};

#[derive(Arbitrary, Debug)]
enum Op {
    Insert(u8),
    InsertLexeme(u8),
    Move(i8),
    Delete(i8),
}

const CHARS: &[u8] = b"ab {}[]()\n/*\\\"";
const LEXEMES: &[Lexeme] = &[
    Lexeme::LineComment,
    Lexeme::BlockCommentStart,
    Lexeme::BlockCommentEnd,
    Lexeme::EscapedBackslash,
    Lexeme::EscapedQuote,
];

fuzz_target!(|ops: Vec<Op>| {
    let mut model = ReducedModel::new();
    let mut text: Vec<char> = Vec::new();
    let mut caret = 0usize;

    for op in ops.into_iter().take(512) {
        match op {
            Op::Insert(b) => {
                let ch = CHARS[b as usize % CHARS.len()] as char;
                model.insert_char(ch).expect("insert never fails");
                text.insert(caret, ch);
                caret += 1;
            }
            Op::InsertLexeme(b) => {
                let lexeme = LEXEMES[b as usize % LEXEMES.len()];
                model.insert_lexeme(lexeme).expect("insert never fails");
                for ch in lexeme.as_str().chars() {
                    text.insert(caret, ch);
                    caret += 1;
                }
            }
            Op::Move(n) => {
                let n = n as isize;
                let target = caret as isize + n;
                let ok = model.move_by(n).is_ok();
                assert_eq!(ok, (0..=text.len() as isize).contains(&target));
                if ok {
                    caret = target as usize;
                }
            }
            Op::Delete(n) => {
                let n = n as isize;
                let ok = model.delete(n).is_ok();
                let (start, end) = if n >= 0 {
                    (caret as isize, caret as isize + n)
                } else {
                    (caret as isize + n, caret as isize)
                };
                assert_eq!(ok, start >= 0 && end <= text.len() as isize);
                if ok {
                    text.drain(start as usize..end as usize);
                    caret = start as usize;
                }
            }
        }
        model.check_invariants().expect("invariants hold");
        assert_eq!(model.len(), text.len());
        assert_eq!(model.location(), caret);
    }
});
