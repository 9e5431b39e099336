//! Slurping and barfing: moving the brackets of the enclosing list past a neighbouring form.

use crate::cursor_doc::document::{EditOptions, EditableDocument, ModelEdit};
use crate::cursor_doc::selection::Selection;
use crate::cursor_doc::token::TokenType;
use crate::cursor_doc::token_cursor::SexpOptions;

/// Pulls the form after the enclosing list into it. When the list has no form after it,
/// the next list out does the slurping.
pub fn forward_slurp_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    forward_slurp_from(doc, active, 1)
}

fn forward_slurp_from(doc: &mut impl EditableDocument, offset: usize, depth: usize) -> bool {
    let step = {
        let mut cursor = doc.token_cursor(offset);
        if !cursor.forward_list() || cursor.get_token().kind != TokenType::Close {
            return false;
        }
        let close_start = cursor.offset_start();
        let close = cursor.get_token().raw.as_str();
        let mut ws_inside = cursor;
        ws_inside.backward_whitespace(false);
        let ws_start = ws_inside.offset_start();
        let empty_list = ws_inside.get_prev_token().kind == TokenType::Open;
        cursor.up_list();
        let mut ws_outside = cursor;
        if cursor.forward_sexp_with(SexpOptions::default().with_metadata()) {
            ws_outside.forward_whitespace(false);
            let ws_end = ws_outside.offset_start();
            let replaced = doc.model().get_text(ws_start, ws_end, false);
            let change = if replaced.contains('\n') {
                ModelEdit::delete_range(close_start, close.len())
            } else {
                ModelEdit::change_range(ws_start, ws_end, if empty_list { "" } else { " " })
            };
            Ok(vec![ModelEdit::insert_string(cursor.offset_start(), close), change])
        } else {
            Err(cursor.offset_start())
        }
    };
    match step {
        Ok(edits) => doc.edit(
            edits,
            EditOptions {
                format_depth: Some(depth),
                ..EditOptions::default()
            },
        ),
        Err(outer) => forward_slurp_from(doc, outer, depth + 1),
    }
}

/// Pulls the form before the enclosing list into it. When the list has no form before it,
/// the next list out does the slurping.
pub fn backward_slurp_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    backward_slurp_from(doc, active, 1)
}

fn backward_slurp_from(doc: &mut impl EditableDocument, offset: usize, depth: usize) -> bool {
    let step = {
        let mut cursor = doc.token_cursor(offset);
        if !cursor.backward_list() {
            return false;
        }
        let open = cursor.get_prev_token();
        if open.kind != TokenType::Open {
            return false;
        }
        cursor.previous();
        let open_start = cursor.offset_start();
        if cursor.backward_sexp_with(SexpOptions::default().with_metadata()) {
            cursor.forward_whitespace(false);
            Ok(vec![
                ModelEdit::delete_range(open_start, open.raw.len()),
                ModelEdit::insert_string(cursor.offset_start(), open.raw.clone()),
            ])
        } else {
            Err(open_start)
        }
    };
    match step {
        Ok(edits) => doc.edit(
            edits,
            EditOptions {
                format_depth: Some(depth),
                ..EditOptions::default()
            },
        ),
        Err(outer) => backward_slurp_from(doc, outer, depth + 1),
    }
}

/// Pushes the last form of the enclosing list out past its closing bracket.
pub fn forward_barf_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let mut cursor = doc.token_cursor(active);
        if !cursor.forward_list() || cursor.get_token().kind != TokenType::Close {
            return false;
        }
        let close_start = cursor.offset_start();
        let close = cursor.get_token().raw.as_str();
        if !cursor.backward_sexp_with(SexpOptions::default().with_metadata()) {
            return false;
        }
        cursor.backward_whitespace(true);
        let new_close = cursor.offset_start();
        (
            vec![
                ModelEdit::delete_range(close_start, close.len()),
                ModelEdit::insert_string(new_close, close),
            ],
            (active >= new_close).then_some(new_close),
        )
    };
    let options = match caret {
        Some(caret) => EditOptions::with_selection(Selection::cursor(caret)),
        None => EditOptions::default(),
    };
    doc.edit(
        edits,
        EditOptions {
            format_depth: Some(2),
            ..options
        },
    )
}

/// Pushes the first form of the enclosing list out past its opening bracket.
pub fn backward_barf_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let mut cursor = doc.token_cursor(active);
        if !cursor.backward_list() {
            return false;
        }
        let open = cursor.get_prev_token();
        if open.kind != TokenType::Open {
            return false;
        }
        let open_start = cursor.offset_start() - open.raw.len();
        if !cursor.forward_sexp_with(SexpOptions::default().with_metadata()) {
            return false;
        }
        cursor.forward_whitespace(false);
        let new_open = cursor.offset_start();
        (
            vec![
                ModelEdit::insert_string(new_open, open.raw.clone()),
                ModelEdit::delete_range(open_start, open.raw.len()),
            ],
            (active <= new_open).then_some(new_open),
        )
    };
    let options = match caret {
        Some(caret) => EditOptions::with_selection(Selection::cursor(caret)),
        None => EditOptions::default(),
    };
    doc.edit(
        edits,
        EditOptions {
            format_depth: Some(2),
            ..options
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_doc::document::StringDocument;
    use crate::cursor_doc::testing::{doc_from_text_notation, text_notation};
    use rstest::rstest;

    fn run(before: &str, op: fn(&mut StringDocument) -> bool) -> String {
        let mut doc = doc_from_text_notation(before);
        op(&mut doc);
        text_notation(&doc)
    }

    #[rstest(
        before,
        after,
        case("(a |b) c", "(a |b c)"),
        case("(|) a", "(|a)"),
        case("(a|)\n b", "(a|\n b)"),
        case("((a|)) b", "((a|) b)"),
        case("[a |b] ^:m c", "[a |b ^:m c]"),
        case("(a |b)", "(a |b)"),
        case("a |b", "a |b")
    )]
    fn test_forward_slurp(before: &str, after: &str) {
        assert_eq!(run(before, forward_slurp_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("a (|b)", "(a |b)"),
        case("a ((|b))", "(a (|b))"),
        case("x #{|b}", "#{x |b}"),
        case("(|b)", "(|b)")
    )]
    fn test_backward_slurp(before: &str, after: &str) {
        assert_eq!(run(before, backward_slurp_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a |b c)", "(a |b) c"),
        case("(a b |c)", "(a b|) c"),
        case("(|)", "(|)")
    )]
    fn test_forward_barf(before: &str, after: &str) {
        assert_eq!(run(before, forward_barf_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a |b c)", "a (|b c)"),
        case("(a b |c)", "a (b |c)"),
        case("(|)", "(|)")
    )]
    fn test_backward_barf(before: &str, after: &str) {
        assert_eq!(run(before, backward_barf_sexp), after);
    }

    #[test]
    fn test_slurp_then_barf_restores_text() {
        let mut doc = doc_from_text_notation("(a |b) c d");
        forward_slurp_sexp(&mut doc);
        forward_slurp_sexp(&mut doc);
        assert_eq!(text_notation(&doc), "(a |b c d)");
        forward_barf_sexp(&mut doc);
        forward_barf_sexp(&mut doc);
        assert_eq!(text_notation(&doc), "(a |b) c d");
    }
}
