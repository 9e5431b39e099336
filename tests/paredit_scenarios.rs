//! Multi-step editing sessions driven through the paredit operations

use rstest::rstest;
use structural_edit::cursor_doc::document::{EditableDocument, StringDocument};
use structural_edit::cursor_doc::paredit::{self, Motion, ParEditError};
use structural_edit::cursor_doc::testing::{doc_from_text_notation, text_notation};

/// Helper: runs one operation on a document given in text notation
fn apply(before: &str, op: fn(&mut StringDocument) -> bool) -> String {
    let mut doc = doc_from_text_notation(before);
    op(&mut doc);
    text_notation(&doc)
}

#[test]
fn test_typing_a_function() {
    let mut doc = doc_from_text_notation("|");
    let mut steps = Vec::new();

    paredit::open_list(&mut doc, "(", ")");
    steps.push(text_notation(&doc));
    doc.insert_string("defn ");
    paredit::open_list(&mut doc, "[", "]");
    doc.insert_string("x");
    steps.push(text_notation(&doc));
    paredit::close_list(&mut doc, "]");
    doc.insert_string(" ");
    paredit::string_quote(&mut doc);
    steps.push(text_notation(&doc));
    doc.insert_string("doc");
    paredit::string_quote(&mut doc);
    steps.push(text_notation(&doc));
    paredit::close_list(&mut doc, ")");
    steps.push(text_notation(&doc));

    assert_eq!(
        steps,
        vec![
            "(|)",
            "(defn [x|])",
            "(defn [x] \"|\")",
            "(defn [x] \"doc\"|)",
            "(defn [x] \"doc\")|",
        ]
    );
}

#[rstest(
    before,
    after,
    case("(|)", "|"),
    case("(a (|) b)", "(a | b)"),
    case("[|]", "|"),
    case("(a)|", "(a|)")
)]
fn test_backspace_keeps_structure(before: &str, after: &str) {
    assert_eq!(apply(before, paredit::backspace), after);
}

#[rstest(
    before,
    case("(a |b) c"),
    case("(|a) [b c]"),
    case("{:a |1} :b 2")
)]
fn test_forward_slurp_then_barf_restores(before: &str) {
    let mut doc = doc_from_text_notation(before);
    let original = doc.model().text();
    assert!(paredit::forward_slurp_sexp(&mut doc));
    assert_ne!(doc.model().text(), original);
    assert!(paredit::forward_barf_sexp(&mut doc));
    assert_eq!(doc.model().text(), original);
}

#[rstest(
    before,
    case("(a |b c)"),
    case("(a |b| c)"),
    case("(|a b c|)"),
    case("[x {:k |v}]")
)]
fn test_grow_then_shrink_restores(before: &str) {
    let mut doc = doc_from_text_notation(before);
    let selection = doc.selection();
    assert!(paredit::grow_selection(&mut doc, false));
    assert!(paredit::shrink_selection(&mut doc, false));
    assert_eq!(doc.selection(), selection);
}

#[test]
fn test_list_kills_refuse_strings() {
    let mut doc = doc_from_text_notation("(str \"a |b c\")");
    assert_eq!(
        paredit::kill_backward_list(&mut doc),
        Err(ParEditError::InString {
            operation: "kill-backward-list"
        })
    );
    assert_eq!(text_notation(&doc), "(str \"a |b c\")");
}

#[test]
fn test_restructuring_a_let() {
    let mut doc = doc_from_text_notation("(when x (let [y 1] |(f y)))");
    assert!(paredit::raise_sexp(&mut doc));
    assert_eq!(text_notation(&doc), "(when x |(f y))");
    assert!(paredit::wrap_sexp(&mut doc, "(", ")"));
    assert_eq!(text_notation(&doc), "(when x (|(f y)))");
    doc.insert_string("do ");
    assert_eq!(text_notation(&doc), "(when x (do |(f y)))");
    assert!(paredit::splice_sexp(&mut doc));
    assert_eq!(text_notation(&doc), "(when x do |(f y))");
}

#[test]
fn test_motion_with_several_cursors() {
    let mut doc = doc_from_text_notation("(|a b) (|1c d)");
    paredit::move_by(&mut doc, Motion::ForwardSexp, true);
    assert_eq!(text_notation(&doc), "(a| b) (c|1 d)");
    paredit::select_by(&mut doc, Motion::ForwardSexp, true);
    assert_eq!(text_notation(&doc), "(a| b|) (c|1 d|1)");
}

#[test]
fn test_failed_motion_leaves_caret() {
    let mut doc = doc_from_text_notation("(a b|)");
    paredit::move_by(&mut doc, Motion::ForwardSexp, false);
    assert_eq!(text_notation(&doc), "(a b|)");
}
