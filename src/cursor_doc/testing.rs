//! Text notation for cursor and edit tests
//!
//! Paredit behavior is all about where the caret and the selections are before and after
//! an operation. Tests state both in a single string:
//!
//! - `|` marks the primary caret.
//! - Two `|` mark the primary selection: the first is the anchor, the second the active end.
//! - `|1`, `|2`, ... mark further cursors or selections, in label order.
//!
//! ```rust-example
//! use structural_edit::cursor_doc::testing::{doc_from_text_notation, text_notation};
//! use structural_edit::cursor_doc::paredit;
//!
//! let mut doc = doc_from_text_notation("(a |b) c");
//! paredit::forward_slurp_sexp(&mut doc);
//! assert_eq!(text_notation(&doc), "(a |b c)");
//! ```
//!
//! Offsets are byte offsets into the text with the marks removed. A test that needs a
//! reversed selection builds the [StringDocument] with explicit [Selection]s instead.

use super::document::{EditableDocument, StringDocument};
use super::selection::Selection;
use std::collections::BTreeMap;

/// Strips the marks out of `notation`, returning the text and the marked selections.
pub fn text_and_selections(notation: &str) -> (String, Vec<Selection>) {
    let mut text = String::with_capacity(notation.len());
    let mut marks: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut chars = notation.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '|' {
            text.push(c);
            continue;
        }
        let mut label = String::new();
        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            label.push(*d);
            chars.next();
        }
        let label = label.parse::<usize>().unwrap_or(0);
        marks.entry(label).or_default().push(text.len());
    }
    let selections = marks
        .into_values()
        .map(|offsets| match offsets.as_slice() {
            [caret] => Selection::cursor(*caret),
            [anchor, active, ..] => Selection::new(*anchor, *active),
            [] => Selection::cursor(0),
        })
        .collect();
    (text, selections)
}

/// A [StringDocument] from text notation. Without marks the caret is at 0.
pub fn doc_from_text_notation(notation: &str) -> StringDocument {
    let (text, mut selections) = text_and_selections(notation);
    if selections.is_empty() {
        selections.push(Selection::cursor(0));
    }
    StringDocument::with_selections(&text, selections)
}

/// Renders `text` with `selections` marked, the inverse of [text_and_selections] for
/// forward selections.
pub fn text_with_selections(text: &str, selections: &[Selection]) -> String {
    let mut marks: Vec<(usize, usize, String)> = Vec::new();
    for (index, selection) in selections.iter().enumerate() {
        let mark = if index == 0 {
            "|".to_string()
        } else {
            format!("|{}", index)
        };
        if selection.is_cursor() {
            marks.push((selection.active, index, mark));
        } else {
            marks.push((selection.anchor, index, mark.clone()));
            marks.push((selection.active, index, mark));
        }
    }
    // later labels first at equal offsets, so lower labels end up leftmost
    marks.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    let mut out = text.to_string();
    for (offset, _, mark) in marks {
        out.insert_str(offset.min(out.len()), &mark);
    }
    out
}

/// The document's text with its selections marked.
pub fn text_notation(doc: &impl EditableDocument) -> String {
    text_with_selections(&doc.model().text(), doc.selections())
}
