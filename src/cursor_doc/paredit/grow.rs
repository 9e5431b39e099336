//! Expand and shrink selections structurally.
//!
//! The document's [SelectionStack](crate::cursor_doc::selection::SelectionStack) records
//! every grow. After a grow its top always equals the live selections; a grow that finds
//! the selections changed behind its back starts a fresh history from them.

use super::target_selections;
use crate::cursor_doc::document::EditableDocument;
use crate::cursor_doc::model::LineInputModel;
use crate::cursor_doc::selection::Selection;
use crate::cursor_doc::token::TokenType;

fn grown(model: &LineInputModel, selection: Selection) -> Selection {
    let (start, end) = selection.range();
    if selection.is_cursor() {
        return model
            .get_token_cursor(start, false)
            .range_for_current_form(start)
            .map(Selection::from_range)
            .unwrap_or(selection);
    }
    let mut start_cursor = model.get_token_cursor(start, false);
    let mut end_cursor = model.get_token_cursor(end, false);
    let hugs_contents = start_cursor.offset_start() == start
        && end_cursor.offset_start() == end
        && start_cursor.get_prev_token().kind == TokenType::Open
        && end_cursor.get_token().kind == TokenType::Close;
    if hugs_contents {
        if start_cursor.backward_up_list() && end_cursor.up_list() {
            return Selection::new(start_cursor.offset_start(), end_cursor.offset_start());
        }
    } else if start_cursor.backward_list() && end_cursor.forward_list() {
        return Selection::new(start_cursor.offset_start(), end_cursor.offset_start());
    }
    selection
}

/// Grows each selection to the current form, then to the enclosing list's contents,
/// then to the list itself. Returns `false` when nothing could grow.
pub fn grow_selection(doc: &mut impl EditableDocument, is_multi: bool) -> bool {
    let current = target_selections(doc, is_multi);
    let next: Vec<Selection> = current
        .iter()
        .map(|selection| grown(doc.model(), *selection))
        .collect();
    if next.iter().zip(&current).all(|(a, b)| a.same_range(b)) {
        return false;
    }
    let stack = doc.selection_stack();
    if !stack.top_matches(&current) {
        stack.reset(current);
    }
    stack.push(next.clone());
    doc.set_selections(next);
    true
}

/// Undoes the last grow. Returns `false` when there was nothing to restore.
pub fn shrink_selection(doc: &mut impl EditableDocument, is_multi: bool) -> bool {
    let live = target_selections(doc, is_multi);
    let stack = doc.selection_stack();
    if stack.len() < 2 || stack.peek() != Some(live.as_slice()) {
        return false;
    }
    stack.pop();
    let Some(restore) = stack.peek().map(<[Selection]>::to_vec) else {
        return false;
    };
    doc.set_selections(restore);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_doc::testing::{doc_from_text_notation, text_notation};

    #[test]
    fn test_grow_steps_outward() {
        let mut doc = doc_from_text_notation("(a |b c)");
        let mut steps = Vec::new();
        while grow_selection(&mut doc, false) {
            steps.push(text_notation(&doc));
        }
        assert_eq!(steps, vec!["(a |b| c)", "(|a b c|)", "|(a b c)|"]);
    }

    #[test]
    fn test_shrink_walks_back_down() {
        let mut doc = doc_from_text_notation("(x [a |b c])");
        while grow_selection(&mut doc, false) {}
        assert_eq!(text_notation(&doc), "|(x [a b c])|");

        let mut steps = Vec::new();
        while shrink_selection(&mut doc, false) {
            steps.push(text_notation(&doc));
        }
        assert_eq!(
            steps,
            vec![
                "(|x [a b c]|)",
                "(x |[a b c]|)",
                "(x [|a b c|])",
                "(x [a |b| c])",
                "(x [a |b c])",
            ]
        );
    }

    #[test]
    fn test_grow_after_manual_selection_change_restarts() {
        let mut doc = doc_from_text_notation("(a |b c)");
        grow_selection(&mut doc, false);
        doc.set_selection(Selection::cursor(5));
        grow_selection(&mut doc, false);
        assert_eq!(text_notation(&doc), "(a b |c|)");
        assert!(shrink_selection(&mut doc, false));
        assert_eq!(text_notation(&doc), "(a b |c)");
        assert!(!shrink_selection(&mut doc, false));
        assert_eq!(text_notation(&doc), "(a b |c)");
    }

    #[test]
    fn test_refused_shrink_keeps_history() {
        let mut doc = doc_from_text_notation("(a |b c)");
        grow_selection(&mut doc, false);
        grow_selection(&mut doc, false);
        assert_eq!(text_notation(&doc), "(|a b c|)");
        let grown = doc.selection();

        doc.set_selection(Selection::cursor(2));
        assert!(!shrink_selection(&mut doc, false));
        assert_eq!(doc.selection_stack().len(), 3);

        doc.set_selection(grown);
        assert!(shrink_selection(&mut doc, false));
        assert_eq!(text_notation(&doc), "(a |b| c)");
    }

    #[test]
    fn test_grow_keeps_every_cursor() {
        let mut doc = doc_from_text_notation("(a |b) (c |1d)");
        grow_selection(&mut doc, true);
        assert_eq!(text_notation(&doc), "(a |b|) (c |1d|1)");
    }

    #[test]
    fn test_grow_at_top_level_of_empty_document() {
        let mut doc = doc_from_text_notation("|");
        assert!(!grow_selection(&mut doc, false));
        assert!(doc.selection_stack().is_empty());
    }
}
