//! Whole-document indentation through the document driver.

use reduced_lex::{Document, DocumentOptions, ShadowSpans, ShadowState};

const FLUSH: &str = "class Demo {
public int sum(int[] xs) {
int total = 0;
for (int x : xs) {
total += x;
}
return total;
}
}
";

const INDENTED: &str = "class Demo {
  public int sum(int[] xs) {
    int total = 0;
    for (int x : xs) {
      total += x;
    }
    return total;
  }
}
";

fn indent_all<O: reduced_lex::ShadowOracle>(doc: &mut Document<O>) {
    let len = doc.len();
    doc.indent_lines(0, len).unwrap();
    doc.model().check_invariants().unwrap();
    assert_eq!(doc.model().len(), doc.len());
}

#[test]
fn indents_a_flush_document() {
    let mut doc = Document::from_text(FLUSH).unwrap();
    indent_all(&mut doc);
    assert_eq!(doc.text().to_string(), INDENTED);
}

#[test]
fn indentation_is_idempotent() {
    let mut doc = Document::from_text(INDENTED).unwrap();
    indent_all(&mut doc);
    assert_eq!(doc.text().to_string(), INDENTED);
}

#[test]
fn overindented_and_tabbed_lines_are_normalized() {
    let messy = INDENTED
        .replace("    int total", "\t\tint total")
        .replace("      total +=", "          total +=");
    let mut doc = Document::from_text(&messy).unwrap();
    indent_all(&mut doc);
    assert_eq!(doc.text().to_string(), INDENTED);
}

#[test]
fn wider_indent_unit() {
    let mut doc = Document::with_options(
        reduced_lex::FreeOracle,
        DocumentOptions { indent_width: 4 },
    );
    doc.insert_string(0, FLUSH).unwrap();
    indent_all(&mut doc);
    assert_eq!(doc.text().to_string(), INDENTED.replace("  ", "    "));
}

#[test]
fn commented_braces_do_not_open_blocks() {
    let text = "void f() {\n// a { in a comment\ng();\n}";

    let mut doc = Document::with_oracle(ShadowSpans::new());
    doc.insert_string(0, text).unwrap();
    doc.oracle_mut().push(11..30, ShadowState::LineComment);
    indent_all(&mut doc);
    assert_eq!(doc.text().to_string(), "void f() {\n  // a { in a comment\n  g();\n}");
    // The comment span moved with the inserted indentation.
    assert_eq!(doc.oracle().spans()[0].0, 13..32);

    let mut plain = Document::from_text(text).unwrap();
    indent_all(&mut plain);
    assert_eq!(
        plain.text().to_string(),
        "void f() {\n  // a { in a comment\n      g();\n  }"
    );
}

#[test]
fn typing_session() {
    // Type a function line by line, indenting each new line the way an
    // editor does on Enter.
    let mut doc = Document::new();
    for line in ["int main() {", "if (ok) {", "run();", "}", "return 0;", "}"] {
        if !doc.is_empty() {
            let end = doc.len();
            doc.insert_string(end, "\n").unwrap();
        }
        let end = doc.len();
        doc.insert_string(end, line).unwrap();
        let caret = doc.current_location();
        doc.indent_lines(caret, caret).unwrap();
        assert_eq!(doc.current_location(), doc.len());
    }
    assert_eq!(
        doc.text().to_string(),
        "int main() {\n  if (ok) {\n    run();\n  }\n  return 0;\n}"
    );
}
