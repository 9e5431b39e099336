//! Typing keys that respect structure: backspace, delete, brackets and quotes.

use super::structure::wrap_sexp;
use super::text_around;
use crate::cursor_doc::document::{EditOptions, EditableDocument, ModelEdit};
use crate::cursor_doc::scanner::valid_pair;
use crate::cursor_doc::selection::Selection;
use crate::cursor_doc::token::TokenType;

/// Two-character sequences deleted as a unit when the caret sits between them.
const ATOMIC_PAIRS: &[&str] = &["()", "[]", "{}", "\"\""];

const ESCAPED_QUOTE: &str = "\\\"";

enum Action {
    Edit(ModelEdit, usize),
    Move(usize),
    Plain,
}

fn is_bracket(kind: TokenType) -> bool {
    matches!(kind, TokenType::Open | TokenType::Close)
}

fn run(doc: &mut impl EditableDocument, action: Action, forward: bool) -> bool {
    match action {
        Action::Edit(edit, caret) => doc.edit(
            vec![edit],
            EditOptions::with_selection(Selection::cursor(caret)),
        ),
        Action::Move(caret) => {
            doc.set_selection(Selection::cursor(caret));
            true
        }
        Action::Plain if forward => {
            doc.delete();
            true
        }
        Action::Plain => {
            doc.backspace();
            true
        }
    }
}

/// Backspace that deletes empty bracket pairs and escaped quotes as a unit, and steps
/// backward over a bracket instead of deleting it while the document is balanced.
pub fn backspace(doc: &mut impl EditableDocument) -> bool {
    let selection = doc.selection();
    let action = if !selection.is_cursor() || selection.active == 0 {
        Action::Plain
    } else {
        let p = selection.active;
        let model = doc.model();
        let cursor = model.get_token_cursor(p, false);
        let at_boundary = cursor.offset_start() == p;
        let next = cursor.get_token();
        let prev = cursor.get_prev_token();
        if text_around(model, p, 2, 0) == ESCAPED_QUOTE {
            Action::Edit(ModelEdit::delete_range(p - 2, 2), p - 2)
        } else if at_boundary
            && prev.kind == TokenType::Open
            && next.kind == TokenType::Close
            && valid_pair(&prev.raw, &next.raw)
        {
            let start = p - prev.raw.len();
            Action::Edit(
                ModelEdit::delete_range(start, prev.raw.len() + next.raw.len()),
                start,
            )
        } else if ATOMIC_PAIRS.contains(&text_around(model, p, 1, 1).as_str()) {
            Action::Edit(ModelEdit::delete_range(p - 1, 2), p - 1)
        } else if at_boundary && is_bracket(prev.kind) && model.is_balanced() {
            Action::Move(p - prev.raw.len())
        } else {
            Action::Plain
        }
    };
    run(doc, action, false)
}

/// Forward delete with the same pair handling as [backspace].
pub fn delete_forward(doc: &mut impl EditableDocument) -> bool {
    let selection = doc.selection();
    let action = if !selection.is_cursor() {
        Action::Plain
    } else {
        let p = selection.active;
        let model = doc.model();
        let cursor = model.get_token_cursor(p, false);
        let at_boundary = cursor.offset_start() == p;
        let next = cursor.get_token();
        let prev = cursor.get_prev_token();
        if text_around(model, p, 0, 2) == ESCAPED_QUOTE {
            Action::Edit(ModelEdit::delete_range(p, 2), p)
        } else if at_boundary
            && prev.kind == TokenType::Open
            && next.kind == TokenType::Close
            && valid_pair(&prev.raw, &next.raw)
        {
            let start = p - prev.raw.len();
            Action::Edit(
                ModelEdit::delete_range(start, prev.raw.len() + next.raw.len()),
                start,
            )
        } else if p > 0 && ATOMIC_PAIRS.contains(&text_around(model, p, 1, 1).as_str()) {
            Action::Edit(ModelEdit::delete_range(p - 1, 2), p - 1)
        } else if at_boundary && is_bracket(next.kind) && model.is_balanced() {
            Action::Move(p + next.raw.len())
        } else {
            Action::Plain
        }
    };
    run(doc, action, true)
}

/// Inserts an opening bracket. Outside strings and comments the closing bracket comes
/// with it, or, with a selection, the selection gets wrapped.
pub fn open_list(doc: &mut impl EditableDocument, open: &str, close: &str) -> bool {
    let selection = doc.selection();
    let p = selection.active;
    let cursor = doc.token_cursor(p);
    if cursor.within_string() || cursor.within_comment(p) {
        doc.insert_string(open);
        return true;
    }
    if !selection.is_cursor() {
        return wrap_sexp(doc, open, close);
    }
    doc.edit(
        vec![ModelEdit::insert_string(p, format!("{}{}", open, close))],
        EditOptions::with_selection(Selection::cursor(p + open.len())),
    )
}

/// Closes a list. An existing `close` ahead (past whitespace) is stepped over and the
/// whitespace dropped; otherwise `close` is only inserted where it is needed.
pub fn close_list(doc: &mut impl EditableDocument, close: &str) -> bool {
    let p = doc.selection().active;
    let edit = {
        let mut cursor = doc.token_cursor(p);
        let in_string = cursor.within_string();
        cursor.forward_whitespace(false);
        if cursor.get_token().raw == close {
            Some(ModelEdit::change_range(p, cursor.offset_end(), close))
        } else if !in_string && doc.model().is_balanced() {
            None
        } else {
            Some(ModelEdit::insert_string(p, close))
        }
    };
    match edit {
        Some(edit) => doc.edit(
            vec![edit],
            EditOptions::with_selection(Selection::cursor(p + close.len())),
        ),
        None => false,
    }
}

/// The `"` key: a new empty string, an escaped quote inside a string, a step over the
/// closing quote, or a lone quote in a comment. A selection gets wrapped in quotes.
pub fn string_quote(doc: &mut impl EditableDocument) -> bool {
    let selection = doc.selection();
    if !selection.is_cursor() {
        return wrap_sexp(doc, "\"", "\"");
    }
    let p = selection.active;
    let cursor = doc.token_cursor(p);
    if cursor.within_string() {
        let token = cursor.get_token();
        if cursor.offset_start() == p && token.kind == TokenType::Close && token.raw == "\"" {
            doc.set_selection(Selection::cursor(p + 1));
        } else {
            doc.insert_string(ESCAPED_QUOTE);
        }
    } else if cursor.within_comment(p) {
        doc.insert_string("\"");
    } else {
        doc.edit(
            vec![ModelEdit::insert_string(p, "\"\"")],
            EditOptions::with_selection(Selection::cursor(p + 1)),
        );
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_doc::document::StringDocument;
    use crate::cursor_doc::testing::{doc_from_text_notation, text_notation};
    use rstest::rstest;

    fn run_op(before: &str, op: fn(&mut StringDocument) -> bool) -> String {
        let mut doc = doc_from_text_notation(before);
        op(&mut doc);
        text_notation(&doc)
    }

    #[rstest(
        before,
        after,
        case("(|)", "|"),
        case("#{|}", "|"),
        case("(a [|])", "(a |)"),
        case("\"|\"", "|"),
        case("\"\\\"|\"", "\"|\""),
        case("(a)|", "(a|)"),
        case("(|a)", "|(a)"),
        case("(a|", "(|"),
        case("(a))|", "(a)|"),
        case("(a b|)", "(a |)"),
        case("(|ab|)", "(|)"),
        case("|a", "|a")
    )]
    fn test_backspace(before: &str, after: &str) {
        assert_eq!(run_op(before, backspace), after);
    }

    #[rstest(
        before,
        after,
        case("(|)", "|"),
        case("[|]", "|"),
        case("|(a)", "(|a)"),
        case("(a|)", "(a)|"),
        case("a|b", "a|"),
        case("\"a|\\\"b\"", "\"a|b\""),
        case("(|a|)", "(|)")
    )]
    fn test_delete_forward(before: &str, after: &str) {
        assert_eq!(run_op(before, delete_forward), after);
    }

    #[rstest(
        before,
        after,
        case("(a |)", "(a (|))"),
        case("(a |b|)", "(a (|b|))"),
        case("\"a|\"", "\"a(|\""),
        case("; a|", "; a(|")
    )]
    fn test_open_list(before: &str, after: &str) {
        let mut doc = doc_from_text_notation(before);
        open_list(&mut doc, "(", ")");
        assert_eq!(text_notation(&doc), after);
    }

    #[rstest(
        before,
        after,
        case("(a|)", "(a)|"),
        case("(a|  )", "(a)|"),
        case("(a| b)", "(a| b)"),
        case("(a|", "(a)|"),
        case("(str \"a|\")", "(str \"a)|\")")
    )]
    fn test_close_list(before: &str, after: &str) {
        let mut doc = doc_from_text_notation(before);
        close_list(&mut doc, ")");
        assert_eq!(text_notation(&doc), after);
    }

    #[rstest(
        before,
        after,
        case("(a |)", "(a \"|\")"),
        case("\"ab|\"", "\"ab\"|"),
        case("\"a|b\"", "\"a\\\"|b\""),
        case("; x|", "; x\"|"),
        case("(a |b|)", "(a \"|b|\")")
    )]
    fn test_string_quote(before: &str, after: &str) {
        assert_eq!(run_op(before, string_quote), after);
    }
}
