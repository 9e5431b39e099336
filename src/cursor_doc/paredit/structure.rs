//! Edits that reshape lists: wrapping, splitting, joining, splicing, raising, convoluting,
//! transposing, dragging and killing.

use super::motion::{range_to_backward_list, range_to_forward_list};
use super::ParEditError;
use crate::cursor_doc::document::{EditOptions, EditableDocument, ModelEdit};
use crate::cursor_doc::scanner::valid_pair;
use crate::cursor_doc::selection::Selection;
use crate::cursor_doc::token::TokenType;

/// Wraps the selection, or the current form, in `open`/`close`.
///
/// Wrapping in `"` inside a string uses escaped quotes.
pub fn wrap_sexp(doc: &mut impl EditableDocument, open: &str, close: &str) -> bool {
    let selection = doc.selection();
    let cursor = doc.token_cursor(selection.active);
    let (open, close) = if open == "\"" && cursor.within_string() {
        ("\\\"", "\\\"")
    } else {
        (open, close)
    };
    let (range, new_selection) = if selection.is_cursor() {
        let Some(range) = cursor.range_for_current_form(selection.active) else {
            return false;
        };
        (range, Selection::cursor(selection.active + open.len()))
    } else {
        (
            selection.range(),
            Selection::new(selection.anchor + open.len(), selection.active + open.len()),
        )
    };
    doc.edit(
        vec![
            ModelEdit::insert_string(range.1, close),
            ModelEdit::insert_string(range.0, open),
        ],
        EditOptions::with_selection(new_selection),
    )
}

/// Replaces the brackets of the enclosing list with `open`/`close`.
pub fn rewrap_sexp(doc: &mut impl EditableDocument, open: &str, close: &str) -> bool {
    let active = doc.selection().active;
    let edits = {
        let mut cursor = doc.token_cursor(active);
        if !cursor.backward_list() {
            return false;
        }
        let old_open = cursor.get_prev_token();
        let open_end = cursor.offset_start();
        let open_start = open_end - old_open.raw.len();
        if !cursor.forward_list() {
            return false;
        }
        let close_start = cursor.offset_start();
        let close_end = cursor.offset_end();
        let caret = active + open.len() - old_open.raw.len();
        (
            vec![
                ModelEdit::change_range(close_start, close_end, close),
                ModelEdit::change_range(open_start, open_end, open),
            ],
            caret,
        )
    };
    doc.edit(edits.0, EditOptions::with_selection(Selection::cursor(edits.1)))
}

/// Splits the enclosing list (or string) in two at the caret.
pub fn split_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let cursor = doc.token_cursor(active);
        let mut list = cursor;
        if !list.backward_list() {
            return false;
        }
        let open = list.get_prev_token().raw.as_str();
        if !list.forward_list() {
            return false;
        }
        let close = list.get_token().raw.as_str();

        if cursor.within_string() {
            let text = format!("{} {}", close, open);
            (
                vec![ModelEdit::insert_string(active, text)],
                active + close.len(),
            )
        } else {
            let (ws_start, ws_end) = if cursor.is_whitespace() || cursor.previous_is_whitespace() {
                let mut back = cursor;
                back.backward_whitespace(false);
                let mut forward = cursor;
                forward.forward_whitespace(false);
                (back.offset_start(), forward.offset_start())
            } else {
                (active, active)
            };
            if ws_start == ws_end {
                let text = format!("{} {}", close, open);
                (
                    vec![ModelEdit::insert_string(ws_start, text)],
                    ws_start + close.len(),
                )
            } else {
                (
                    vec![
                        ModelEdit::insert_string(ws_end, open),
                        ModelEdit::insert_string(ws_start, close),
                    ],
                    ws_start + close.len(),
                )
            }
        }
    };
    doc.edit(edits, EditOptions::with_selection(Selection::cursor(caret)))
}

/// Joins the list (or string) ending before the caret with the one starting after it.
pub fn join_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edit, caret) = {
        let mut cursor = doc.token_cursor(active);
        cursor.backward_whitespace(true);
        let prev = cursor.get_prev_token();
        let prev_end = cursor.offset_start();
        if prev.kind != TokenType::Close {
            return false;
        }
        cursor.forward_whitespace(true);
        let next = cursor.get_token();
        let next_start = cursor.offset_start();
        if next.kind != TokenType::Open || next.raw.len() != 1 || !valid_pair(&next.raw, &prev.raw)
        {
            return false;
        }
        let glue = if prev.raw == "\"" { "" } else { " " };
        (
            ModelEdit::change_range(prev_end - prev.raw.len(), next_start + next.raw.len(), glue),
            prev_end - prev.raw.len(),
        )
    };
    doc.edit(
        vec![edit],
        EditOptions::with_selection(Selection::cursor(caret)),
    )
}

/// Removes the brackets of the enclosing list.
pub fn splice_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let mut cursor = doc.token_cursor(active);
        if !cursor.forward_list() {
            return false;
        }
        let close = cursor.get_token();
        let close_start = cursor.offset_start();
        if !cursor.backward_list() {
            return false;
        }
        let open = cursor.get_prev_token();
        let open_end = cursor.offset_start();
        if open.kind != TokenType::Open || !valid_pair(&open.raw, &close.raw) {
            return false;
        }
        (
            vec![
                ModelEdit::delete_range(close_start, close.raw.len()),
                ModelEdit::delete_range(open_end - open.raw.len(), open.raw.len()),
            ],
            active - open.raw.len(),
        )
    };
    doc.edit(
        edits,
        EditOptions::with_selection(Selection::cursor(caret)).undo_stop_before(),
    )
}

/// Splices the enclosing list, dropping everything from the caret to its end.
pub fn splice_sexp_killing_forward(doc: &mut impl EditableDocument) -> bool {
    splice_killing(doc, true)
}

/// Splices the enclosing list, dropping everything from its start to the caret.
pub fn splice_sexp_killing_backward(doc: &mut impl EditableDocument) -> bool {
    splice_killing(doc, false)
}

fn splice_killing(doc: &mut impl EditableDocument, forward: bool) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let mut end = doc.token_cursor(active);
        let mut start = doc.token_cursor(active);
        if !end.forward_list() || !start.backward_list() {
            return false;
        }
        let close = end.get_token();
        let open = start.get_prev_token();
        if !valid_pair(&open.raw, &close.raw) {
            return false;
        }
        let close_start = end.offset_start();
        let open_end = start.offset_start();
        let open_start = open_end - open.raw.len();
        if forward {
            (
                vec![
                    ModelEdit::delete_range(active, close_start + close.raw.len() - active),
                    ModelEdit::delete_range(open_start, open.raw.len()),
                ],
                active - open.raw.len(),
            )
        } else {
            (
                vec![
                    ModelEdit::delete_range(close_start, close.raw.len()),
                    ModelEdit::delete_range(open_start, active - open_start),
                ],
                open_start,
            )
        }
    };
    doc.edit(edits, EditOptions::with_selection(Selection::cursor(caret)))
}

/// Replaces the enclosing list with the current form.
pub fn raise_sexp(doc: &mut impl EditableDocument) -> bool {
    let selection = doc.selection();
    let (edit, caret) = {
        let cursor = doc.token_cursor(selection.active);
        let Some((form_start, form_end)) = cursor.range_for_current_form(selection.active) else {
            return false;
        };
        let model = doc.model();
        let raised = model.get_text(form_start, form_end, false);
        // the current form may end before the caret when only whitespace follows it
        let trailing = selection.active >= form_end
            || form_end - selection.active < selection.active.saturating_sub(form_start);
        let mut start = model.get_token_cursor(form_start, false);
        let mut end = model.get_token_cursor(form_end, false);
        if !start.backward_list() || start.get_prev_token().kind != TokenType::Open {
            return false;
        }
        start.previous();
        if !end.forward_list() || end.get_token().kind != TokenType::Close {
            return false;
        }
        let list_start = start.offset_start();
        let caret = if trailing {
            list_start + raised.len()
        } else {
            list_start
        };
        (
            ModelEdit::change_range(list_start, end.offset_end(), raised),
            caret,
        )
    };
    doc.edit(
        vec![edit],
        EditOptions::with_selection(Selection::cursor(caret)),
    )
}

/// Swaps the nesting of the enclosing list and its parent, keeping the enclosing list's
/// head (the part before the caret) with it: `(a (b |c))` becomes `(b (a c))`.
pub fn convolute_sexp(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let edits = {
        let model = doc.model();
        let mut inner_start = model.get_token_cursor(active, false);
        let mut inner_end = inner_start;
        if !inner_start.backward_list() || !inner_end.forward_list() {
            return false;
        }
        let head = model.get_text(inner_start.offset_start(), active, false);
        let inner_open = inner_start.get_prev_token();
        if inner_open.kind != TokenType::Open {
            return false;
        }
        inner_start.previous();
        let mut outer_start = inner_start;
        if !outer_start.backward_list() || !outer_start.backward_up_list() {
            return false;
        }
        let mut outer_end = inner_start;
        if !outer_end.forward_list() || inner_end.get_token().kind != TokenType::Close {
            return false;
        }
        let inner_close = inner_end.get_token();
        vec![
            ModelEdit::insert_string(outer_end.offset_end(), inner_close.raw.clone()),
            ModelEdit::delete_range(inner_end.offset_start(), inner_close.raw.len()),
            ModelEdit::delete_range(inner_start.offset_start(), active - inner_start.offset_start()),
            ModelEdit::insert_string(
                outer_start.offset_start(),
                format!("{}{}", inner_open.raw, head),
            ),
        ]
    };
    doc.edit(edits, EditOptions::default())
}

/// Swaps the forms before and after the caret.
pub fn transpose_sexps(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let model = doc.model();
        let mut cursor = model.get_token_cursor(active, false);
        cursor.backward_whitespace(true);
        if cursor.get_prev_token().kind == TokenType::Open {
            cursor.forward_sexp();
        }
        cursor.forward_whitespace(true);
        if cursor.get_token().kind == TokenType::Close {
            cursor.backward_sexp();
        }
        if cursor.get_token().kind == TokenType::Close {
            return false;
        }
        let right_start = cursor.offset_start();
        if !cursor.forward_sexp() {
            return false;
        }
        let right_end = cursor.offset_start();
        cursor.backward_sexp();
        cursor.backward_whitespace(true);
        let left_end = cursor.offset_start();
        if !cursor.backward_sexp() {
            return false;
        }
        let left_start = cursor.offset_start();
        let left_text = model.get_text(left_start, left_end, false);
        let right_text = model.get_text(right_start, right_end, false);
        let caret = left_start + right_text.len();
        (
            vec![
                ModelEdit::change_range(right_start, right_end, left_text),
                ModelEdit::change_range(left_start, left_end, right_text),
            ],
            caret,
        )
    };
    doc.edit(edits, EditOptions::with_selection(Selection::cursor(caret)))
}

/// Swaps the current form with the previous one, the caret staying inside it.
pub fn drag_sexp_backward(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let model = doc.model();
        let Some(current) = model
            .get_token_cursor(active, false)
            .range_for_current_form(active)
        else {
            return false;
        };
        let mut back = model.get_token_cursor(current.0, false);
        back.backward_sexp();
        let Some(previous) = back.range_for_current_form(back.offset_start()) else {
            return false;
        };
        if previous.0 == current.0 || previous.1 > current.0 {
            return false;
        }
        let left_text = model.get_text(previous.0, previous.1, false);
        let right_text = model.get_text(current.0, current.1, false);
        (
            vec![
                ModelEdit::change_range(current.0, current.1, left_text),
                ModelEdit::change_range(previous.0, previous.1, right_text),
            ],
            previous.0 + active.saturating_sub(current.0),
        )
    };
    doc.edit(edits, EditOptions::with_selection(Selection::cursor(caret)))
}

/// Swaps the current form with the next one, the caret staying inside it.
pub fn drag_sexp_forward(doc: &mut impl EditableDocument) -> bool {
    let active = doc.selection().active;
    let (edits, caret) = {
        let model = doc.model();
        let Some(current) = model
            .get_token_cursor(active, false)
            .range_for_current_form(active)
        else {
            return false;
        };
        let mut forward = model.get_token_cursor(current.1, false);
        forward.forward_sexp();
        let Some(next) = forward.range_for_current_form(forward.offset_start()) else {
            return false;
        };
        if next.0 == current.0 || next.0 < current.1 {
            return false;
        }
        let left_text = model.get_text(current.0, current.1, false);
        let right_text = model.get_text(next.0, next.1, false);
        (
            vec![
                ModelEdit::change_range(next.0, next.1, left_text),
                ModelEdit::change_range(current.0, current.1, right_text),
            ],
            next.1 - current.1.saturating_sub(active),
        )
    };
    doc.edit(edits, EditOptions::with_selection(Selection::cursor(caret)))
}

/// Deletes `range`, leaving the caret at its start.
pub fn kill_range(doc: &mut impl EditableDocument, range: (usize, usize)) -> bool {
    let (start, end) = (range.0.min(range.1), range.0.max(range.1));
    if start == end {
        return false;
    }
    doc.edit(
        vec![ModelEdit::delete_range(start, end - start)],
        EditOptions::with_selection(Selection::cursor(start)),
    )
}

/// Deletes from the caret to the end of the enclosing list.
pub fn kill_forward_list(doc: &mut impl EditableDocument) -> Result<bool, ParEditError> {
    let active = doc.selection().active;
    if doc.token_cursor(active).within_string() {
        return Err(ParEditError::InString {
            operation: "kill-forward-list",
        });
    }
    let range = range_to_forward_list(doc.model(), active);
    Ok(kill_range(doc, range))
}

/// Deletes from the start of the enclosing list to the caret.
pub fn kill_backward_list(doc: &mut impl EditableDocument) -> Result<bool, ParEditError> {
    let active = doc.selection().active;
    if doc.token_cursor(active).within_string() {
        return Err(ParEditError::InString {
            operation: "kill-backward-list",
        });
    }
    let range = range_to_backward_list(doc.model(), active);
    Ok(kill_range(doc, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_doc::testing::{doc_from_text_notation, text_notation};
    use rstest::rstest;

    fn run(before: &str, op: fn(&mut crate::cursor_doc::document::StringDocument) -> bool) -> String {
        let mut doc = doc_from_text_notation(before);
        op(&mut doc);
        text_notation(&doc)
    }

    #[rstest(
        before,
        after,
        case("(a |b c)", "(a [|b] c)"),
        case("(a |b c|)", "(a [|b c|])"),
        case("(a (|b) c)", "(a ([|b]) c)"),
        case("(|)", "[(|)]")
    )]
    fn test_wrap_in_brackets(before: &str, after: &str) {
        let mut doc = doc_from_text_notation(before);
        wrap_sexp(&mut doc, "[", "]");
        assert_eq!(text_notation(&doc), after);
    }

    #[test]
    fn test_wrap_quote_inside_string() {
        let mut doc = doc_from_text_notation("(str \"a |b c\")");
        wrap_sexp(&mut doc, "\"", "\"");
        assert_eq!(text_notation(&doc), "(str \"a \\\"|b\\\" c\")");
    }

    #[rstest(
        before,
        open,
        close,
        after,
        case("(a |b)", "[", "]", "[a |b]"),
        case("#{a |b}", "(", ")", "(a |b)"),
        case("[a |b]", "#{", "}", "#{a |b}"),
        case("a |b", "(", ")", "a |b")
    )]
    fn test_rewrap(before: &str, open: &str, close: &str, after: &str) {
        let mut doc = doc_from_text_notation(before);
        rewrap_sexp(&mut doc, open, close);
        assert_eq!(text_notation(&doc), after);
    }

    #[rstest(
        before,
        after,
        case("(a b| c)", "(a b)| (c)"),
        case("(a b |c)", "(a b)| (c)"),
        case("[a|b]", "[a]| [b]"),
        case("(a\n  |b)", "(a)|\n  (b)"),
        case("(str \"ab|cd\")", "(str \"ab\"| \"cd\")"),
        case("a |b", "a |b")
    )]
    fn test_split(before: &str, after: &str) {
        assert_eq!(run(before, split_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a)| (b)", "(a| b)"),
        case("[a] |[b]", "[a| b]"),
        case("\"a\" |\"b\"", "\"a|b\""),
        case("(a) |[b]", "(a) |[b]"),
        case("(a) |#{b}", "(a) |#{b}")
    )]
    fn test_join(before: &str, after: &str) {
        assert_eq!(run(before, join_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a (b |c) d)", "(a b |c d)"),
        case("(a #{b |c} d)", "(a b |c d)"),
        case("(str \"a |b\")", "(str a |b)"),
        case("a |b", "a |b")
    )]
    fn test_splice(before: &str, after: &str) {
        assert_eq!(run(before, splice_sexp), after);
    }

    #[test]
    fn test_splice_killing() {
        assert_eq!(run("(a (b| c d) e)", splice_sexp_killing_forward), "(a b| e)");
        assert_eq!(run("(a (b c |d) e)", splice_sexp_killing_backward), "(a |d e)");
    }

    #[rstest(
        before,
        after,
        case("(a (b |c) d)", "(a |c d)"),
        case("(a (b c|) d)", "(a c| d)"),
        case("(a [|(x y) z])", "(a |(x y))"),
        case("(x (b c |))", "(x c|)"),
        case("(x (b c  |  ))", "(x c|)"),
        case("|a", "|a")
    )]
    fn test_raise(before: &str, after: &str) {
        assert_eq!(run(before, raise_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a b (c d |e f) g)", "(c d (a b |e f g))"),
        case("(let [x 1] (when |y z))", "(when (let [x 1] |y z))"),
        case("(a |b)", "(a |b)")
    )]
    fn test_convolute(before: &str, after: &str) {
        assert_eq!(run(before, convolute_sexp), after);
    }

    #[rstest(
        before,
        after,
        case("(a |b)", "(b| a)"),
        case("(ab |c)", "(c| ab)"),
        case("(a b|)", "(b| a)"),
        case("(|a b)", "(b| a)"),
        case("(|a)", "(|a)")
    )]
    fn test_transpose(before: &str, after: &str) {
        assert_eq!(run(before, transpose_sexps), after);
    }

    #[rstest(
        before,
        after,
        case("(a b|c d)", "(a d b|c)"),
        case("(a b|c)", "(a b|c)")
    )]
    fn test_drag_forward(before: &str, after: &str) {
        assert_eq!(run(before, drag_sexp_forward), after);
    }

    #[rstest(
        before,
        after,
        case("(a b|c d)", "(b|c a d)"),
        case("(a|b c)", "(a|b c)")
    )]
    fn test_drag_backward(before: &str, after: &str) {
        assert_eq!(run(before, drag_sexp_backward), after);
    }

    #[test]
    fn test_kill_list() {
        let mut doc = doc_from_text_notation("(a b |c d)");
        assert_eq!(kill_forward_list(&mut doc), Ok(true));
        assert_eq!(text_notation(&doc), "(a b |)");

        let mut doc = doc_from_text_notation("(a b |c d)");
        assert_eq!(kill_backward_list(&mut doc), Ok(true));
        assert_eq!(text_notation(&doc), "(|c d)");
    }

    #[test]
    fn test_kill_list_inside_string_is_an_error() {
        let mut doc = doc_from_text_notation("(str \"a |b\")");
        assert_eq!(
            kill_forward_list(&mut doc),
            Err(ParEditError::InString {
                operation: "kill-forward-list"
            })
        );
        assert_eq!(text_notation(&doc), "(str \"a |b\")");
    }
}
