//! Fuzz target for the document driver.
//!
//! Arbitrary offset-based inserts and removals, interleaved with
//! indentation and highlighting, must never panic and must keep the text
//! and the model the same length.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reduced_lex::Document;

#[derive(Arbitrary, Debug)]
enum Op {
    Insert { offset: u16, text: String },
    Remove { offset: u16, len: u8 },
    IndentLines { start: u16, end: u16 },
    Highlight { start: u16, end: u16 },
    MatchBrace { at: u16 },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut doc = Document::new();
    for op in ops.into_iter().take(128) {
        let len = doc.len();
        let clamp = |n: u16| usize::from(n) % (len + 1);
        let _ = match op {
            Op::Insert { offset, text } => doc.insert_string(clamp(offset), &text),
            Op::Remove { offset, len } => doc.remove(clamp(offset), usize::from(len)),
            Op::IndentLines { start, end } => doc.indent_lines(clamp(start), clamp(end)),
            Op::Highlight { start, end } => doc.get_highlight_status(clamp(start), clamp(end)).map(drop),
            Op::MatchBrace { at } => doc.set_current_location(clamp(at)).map(|()| {
                doc.matching_brace_span();
            }),
        };
        assert_eq!(doc.model().len(), doc.len());
        doc.model().check_invariants().expect("invariants hold");
    }
});
