//! Movement and selection by structure.
//!
//! Range functions take an offset and return `(start, end)`. Forward ranges start at the
//! offset, backward ranges end at it; when there is nowhere to go the range is empty.

use super::target_selections;
use crate::cursor_doc::document::EditableDocument;
use crate::cursor_doc::model::LineInputModel;
use crate::cursor_doc::selection::Selection;
use crate::cursor_doc::token::TokenType;
use crate::cursor_doc::token_cursor::SexpOptions;

pub fn forward_sexp_range(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.forward_sexp_with(SexpOptions::skipping_all()) {
        if go_past_whitespace {
            cursor.forward_whitespace(true);
        }
        return (offset, cursor.offset_start());
    }
    (offset, offset)
}

pub fn backward_sexp_range(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if !cursor.is_whitespace() && cursor.offset_start() < offset {
        // inside a token, backward from its end
        cursor.forward_sexp();
    }
    if cursor.backward_sexp_with(SexpOptions::skipping_all()) {
        if go_past_whitespace {
            cursor.backward_whitespace(true);
        }
        return (cursor.offset_start(), offset);
    }
    (offset, offset)
}

pub fn range_to_forward_up_list(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.forward_list() && cursor.up_list() {
        if go_past_whitespace {
            cursor.forward_whitespace(true);
        }
        return (offset, cursor.offset_start());
    }
    (offset, offset)
}

pub fn range_to_backward_up_list(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.backward_list() && cursor.backward_up_list() {
        cursor.backward_through_any_reader();
        if go_past_whitespace {
            cursor.backward_whitespace(true);
        }
        return (cursor.offset_start(), offset);
    }
    (offset, offset)
}

/// Into the next list, skipping the forms in between.
pub fn range_to_forward_down_list(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    loop {
        cursor.forward_through_any_reader();
        cursor.forward_whitespace(true);
        if cursor.get_token().kind == TokenType::Open || !cursor.forward_sexp() {
            break;
        }
    }
    if cursor.down_list() {
        if go_past_whitespace {
            cursor.forward_whitespace(true);
        }
        return (offset, cursor.offset_start());
    }
    (offset, offset)
}

/// Into the previous list, landing before its closing bracket.
pub fn range_to_backward_down_list(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    loop {
        cursor.backward_whitespace(true);
        if cursor.get_prev_token().kind == TokenType::Close || !cursor.backward_sexp() {
            break;
        }
    }
    if cursor.backward_down_list() {
        if go_past_whitespace {
            cursor.backward_whitespace(true);
        }
        return (cursor.offset_start(), offset);
    }
    (offset, offset)
}

/// To the end of the enclosing list's contents.
pub fn range_to_forward_list(model: &LineInputModel, offset: usize) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.forward_list() {
        return (offset, cursor.offset_start());
    }
    (offset, offset)
}

/// To the start of the enclosing list's contents.
pub fn range_to_backward_list(model: &LineInputModel, offset: usize) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.backward_list() {
        return (cursor.offset_start(), offset);
    }
    (offset, offset)
}

pub fn forward_sexp_or_up_range(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let mut cursor = model.get_token_cursor(offset, false);
    if cursor.forward_sexp_with(SexpOptions::skipping_all())
        || (cursor.forward_list() && cursor.up_list())
    {
        if go_past_whitespace {
            cursor.forward_whitespace(true);
        }
        return (offset, cursor.offset_start());
    }
    (offset, offset)
}

pub fn backward_sexp_or_up_range(model: &LineInputModel, offset: usize, go_past_whitespace: bool) -> (usize, usize) {
    let range = backward_sexp_range(model, offset, go_past_whitespace);
    if range.0 != range.1 {
        return range;
    }
    range_to_backward_up_list(model, offset, go_past_whitespace)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    ForwardSexp,
    BackwardSexp,
    ForwardSexpOrUp,
    BackwardSexpOrUp,
    ForwardUpList,
    BackwardUpList,
    ForwardDownList,
    BackwardDownList,
    /// To the end of the enclosing list's contents.
    ForwardList,
    /// To the start of the enclosing list's contents.
    BackwardList,
}

impl Motion {
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            Motion::ForwardSexp
                | Motion::ForwardSexpOrUp
                | Motion::ForwardUpList
                | Motion::ForwardDownList
                | Motion::ForwardList
        )
    }

    pub fn range(&self, model: &LineInputModel, offset: usize) -> (usize, usize) {
        match self {
            Motion::ForwardSexp => forward_sexp_range(model, offset, false),
            Motion::BackwardSexp => backward_sexp_range(model, offset, false),
            Motion::ForwardSexpOrUp => forward_sexp_or_up_range(model, offset, false),
            Motion::BackwardSexpOrUp => backward_sexp_or_up_range(model, offset, false),
            Motion::ForwardUpList => range_to_forward_up_list(model, offset, false),
            Motion::BackwardUpList => range_to_backward_up_list(model, offset, false),
            Motion::ForwardDownList => range_to_forward_down_list(model, offset, false),
            Motion::BackwardDownList => range_to_backward_down_list(model, offset, false),
            Motion::ForwardList => range_to_forward_list(model, offset),
            Motion::BackwardList => range_to_backward_list(model, offset),
        }
    }
}

/// Moves the caret(s). With `is_multi` every selection moves; converged carets stay
/// separate selections.
pub fn move_by(doc: &mut impl EditableDocument, motion: Motion, is_multi: bool) {
    let moved: Vec<Selection> = target_selections(doc, is_multi)
        .into_iter()
        .map(|selection| {
            if motion.is_forward() {
                let (_, end) = motion.range(doc.model(), selection.end());
                Selection::cursor(end)
            } else {
                let (start, _) = motion.range(doc.model(), selection.start());
                Selection::cursor(start)
            }
        })
        .collect();
    doc.set_selections(moved);
}

/// Extends the selection(s) by `motion`, keeping each anchor.
pub fn select_by(doc: &mut impl EditableDocument, motion: Motion, is_multi: bool) {
    let extended: Vec<Selection> = target_selections(doc, is_multi)
        .into_iter()
        .map(|selection| {
            let (start, end) = motion.range(doc.model(), selection.active);
            let active = if motion.is_forward() { end } else { start };
            Selection::new(selection.anchor, active)
        })
        .collect();
    doc.set_selections(extended);
}

/// Selects the current form, or the top level form with `top_level`.
pub fn select_current_form(doc: &mut impl EditableDocument, top_level: bool, is_multi: bool) {
    let selected: Vec<Selection> = target_selections(doc, is_multi)
        .into_iter()
        .map(|selection| {
            let offset = selection.active;
            let cursor = doc.token_cursor(offset);
            let range = if top_level {
                Some(cursor.range_for_defun(offset, true))
            } else {
                cursor.range_for_current_form(offset)
            };
            range.map(Selection::from_range).unwrap_or(selection)
        })
        .collect();
    doc.set_selections(selected);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_doc::testing::{doc_from_text_notation, text_notation};
    use rstest::rstest;

    #[rstest(
        motion,
        before,
        after,
        case(Motion::ForwardSexp, "(a |b c)", "(a b| c)"),
        case(Motion::ForwardSexp, "(a b c|)", "(a b c|)"),
        case(Motion::ForwardSexp, "(a |#_x b)", "(a #_x b|)"),
        case(Motion::BackwardSexp, "(a b |c)", "(a |b c)"),
        case(Motion::BackwardSexp, "(a b|c d)", "(a |bc d)"),
        case(Motion::BackwardSexp, "(a ^:m b|)", "(a |^:m b)"),
        case(Motion::ForwardSexpOrUp, "(a (b|) c)", "(a (b)| c)"),
        case(Motion::BackwardSexpOrUp, "(a (|b) c)", "(a |(b) c)"),
        case(Motion::ForwardUpList, "(a (|b c) d)", "(a (b c)| d)"),
        case(Motion::BackwardUpList, "(a #{b |c} d)", "(a |#{b c} d)"),
        case(Motion::ForwardDownList, "(|a b [c])", "(a b [|c])"),
        case(Motion::BackwardDownList, "([a] b c|)", "([a|] b c)"),
        case(Motion::ForwardList, "(|a b c)", "(a b c|)"),
        case(Motion::BackwardList, "(a b c|)", "(|a b c)")
    )]
    fn test_move_by(motion: Motion, before: &str, after: &str) {
        let mut doc = doc_from_text_notation(before);
        move_by(&mut doc, motion, false);
        assert_eq!(text_notation(&doc), after);
    }

    #[test]
    fn test_select_keeps_anchor() {
        let mut doc = doc_from_text_notation("(a |b c d)");
        select_by(&mut doc, Motion::ForwardSexp, false);
        select_by(&mut doc, Motion::ForwardSexp, false);
        assert_eq!(text_notation(&doc), "(a |b c| d)");
    }

    #[test]
    fn test_multi_cursor_moves_do_not_deduplicate() {
        let mut doc = doc_from_text_notation("(a |b |1c)");
        move_by(&mut doc, Motion::ForwardUpList, true);
        assert_eq!(doc.selections(), &[Selection::cursor(7), Selection::cursor(7)]);
    }

    #[test]
    fn test_single_cursor_move_drops_other_selections() {
        let mut doc = doc_from_text_notation("(a |b |1c)");
        move_by(&mut doc, Motion::ForwardSexp, false);
        assert_eq!(doc.selections(), &[Selection::cursor(4)]);
    }

    #[test]
    fn test_select_current_form() {
        let mut doc = doc_from_text_notation("(defn f [x]\n  (inc |x))");
        select_current_form(&mut doc, false, false);
        assert_eq!(text_notation(&doc), "(defn f [x]\n  (inc |x|))");
        select_current_form(&mut doc, true, false);
        assert_eq!(text_notation(&doc), "|(defn f [x]\n  (inc x))|");
    }
}
