//! Edit batches and the document abstraction paredit works against.
//!
//! [EditableDocument] is the one seam between the engine and whatever hosts the text.
//! [StringDocument] is the in-memory host used by the CLI and the tests.

use super::model::LineInputModel;
use super::selection::{Selection, SelectionStack};
use super::token_cursor::LispTokenCursor;
use serde::Serialize;

/// One text change. Offsets refer to the document as it is when the edit is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModelEdit {
    ChangeRange { start: usize, end: usize, text: String },
    InsertString { offset: usize, text: String },
    DeleteRange { offset: usize, count: usize },
}

impl ModelEdit {
    pub fn change_range(start: usize, end: usize, text: impl Into<String>) -> Self {
        ModelEdit::ChangeRange {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn insert_string(offset: usize, text: impl Into<String>) -> Self {
        ModelEdit::InsertString {
            offset,
            text: text.into(),
        }
    }

    pub fn delete_range(offset: usize, count: usize) -> Self {
        ModelEdit::DeleteRange { offset, count }
    }

    /// `(start, end, replacement)` in original document offsets.
    pub fn span(&self) -> (usize, usize, &str) {
        match self {
            ModelEdit::ChangeRange { start, end, text } => {
                ((*start).min(*end), (*start).max(*end), text.as_str())
            }
            ModelEdit::InsertString { offset, text } => (*offset, *offset, text.as_str()),
            ModelEdit::DeleteRange { offset, count } => (*offset, offset + count, ""),
        }
    }

    pub fn apply(&self, model: &mut LineInputModel) {
        match self {
            ModelEdit::ChangeRange { start, end, text } => model.change_range(*start, *end, text),
            ModelEdit::InsertString { offset, text } => model.insert_string(*offset, text),
            ModelEdit::DeleteRange { offset, count } => model.delete_range(*offset, *count),
        }
    }
}

/// Host hints attached to an edit batch. Only `selections` means anything to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditOptions {
    pub undo_stop_before: bool,
    pub skip_format: bool,
    pub format_depth: Option<usize>,
    pub selections: Option<Vec<Selection>>,
}

impl EditOptions {
    pub fn with_selections(selections: Vec<Selection>) -> Self {
        EditOptions {
            selections: Some(selections),
            ..EditOptions::default()
        }
    }

    pub fn with_selection(selection: Selection) -> Self {
        EditOptions::with_selections(vec![selection])
    }

    pub fn skip_format(mut self) -> Self {
        self.skip_format = true;
        self
    }

    pub fn undo_stop_before(mut self) -> Self {
        self.undo_stop_before = true;
        self
    }
}

/// A document that structural edits can be applied to.
pub trait EditableDocument {
    fn model(&self) -> &LineInputModel;

    fn selections(&self) -> &[Selection];

    fn set_selections(&mut self, selections: Vec<Selection>);

    fn selection_stack(&mut self) -> &mut SelectionStack;

    /// Applies a batch of edits, ordered from the highest offset down, and then the batch's
    /// selections if it carries any. Returns whether the host accepted the batch.
    fn edit(&mut self, edits: Vec<ModelEdit>, options: EditOptions) -> bool;

    /// The primary selection.
    fn selection(&self) -> Selection {
        self.selections()
            .first()
            .copied()
            .unwrap_or(Selection::cursor(0))
    }

    fn set_selection(&mut self, selection: Selection) {
        self.set_selections(vec![selection]);
    }

    fn token_cursor(&self, offset: usize) -> LispTokenCursor<'_> {
        self.model().get_token_cursor(offset, false)
    }

    /// Replaces the primary selection with `text`.
    fn insert_string(&mut self, text: &str) {
        let selection = self.selection();
        let (start, end) = selection.range();
        let caret = start + text.len();
        self.edit(
            vec![ModelEdit::change_range(start, end, text)],
            EditOptions::with_selection(Selection::cursor(caret)),
        );
    }

    /// Deletes the selection, or the character before the caret.
    fn backspace(&mut self) {
        let selection = self.selection();
        if !selection.is_cursor() {
            let (start, end) = selection.range();
            self.edit(
                vec![ModelEdit::delete_range(start, end - start)],
                EditOptions::with_selection(Selection::cursor(start)),
            );
        } else if selection.active > 0 {
            let start = previous_char_boundary(self.model(), selection.active);
            self.edit(
                vec![ModelEdit::delete_range(start, selection.active - start)],
                EditOptions::with_selection(Selection::cursor(start)),
            );
        }
    }

    /// Deletes the selection, or the character after the caret.
    fn delete(&mut self) {
        let selection = self.selection();
        if !selection.is_cursor() {
            let (start, end) = selection.range();
            self.edit(
                vec![ModelEdit::delete_range(start, end - start)],
                EditOptions::with_selection(Selection::cursor(start)),
            );
        } else if selection.active < self.model().max_offset() {
            let end = next_char_boundary(self.model(), selection.active);
            self.edit(
                vec![ModelEdit::delete_range(selection.active, end - selection.active)],
                EditOptions::with_selection(Selection::cursor(selection.active)),
            );
        }
    }
}

/// Offset of the character before `offset`.
pub fn previous_char_boundary(model: &LineInputModel, offset: usize) -> usize {
    let start = offset.saturating_sub(4);
    let text = model.get_text(start, offset, false);
    text.chars()
        .last()
        .map(|c| offset - c.len_utf8())
        .unwrap_or(start)
}

/// Offset of the character after `offset`.
pub fn next_char_boundary(model: &LineInputModel, offset: usize) -> usize {
    let end = (offset + 4).min(model.max_offset());
    let text = model.get_text(offset, end, false);
    text.chars()
        .next()
        .map(|c| offset + c.len_utf8())
        .unwrap_or(end)
}

/// Where `position` ends up after replacing `[start, end)` with `inserted` bytes.
fn map_offset(position: usize, start: usize, end: usize, inserted: usize) -> usize {
    if position <= start {
        position
    } else if position >= end {
        position - (end - start) + inserted
    } else {
        start
    }
}

/// An in-memory document.
#[derive(Debug, Clone, Default)]
pub struct StringDocument {
    model: LineInputModel,
    selections: Vec<Selection>,
    stack: SelectionStack,
}

impl StringDocument {
    pub fn new(text: &str) -> Self {
        StringDocument::from_model(LineInputModel::new(text), vec![Selection::cursor(0)])
    }

    pub fn from_model(model: LineInputModel, selections: Vec<Selection>) -> Self {
        StringDocument {
            model,
            selections,
            stack: SelectionStack::new(),
        }
    }

    pub fn with_selections(text: &str, selections: Vec<Selection>) -> Self {
        StringDocument::from_model(LineInputModel::new(text), selections)
    }

    pub fn text(&self) -> String {
        self.model.text()
    }
}

impl EditableDocument for StringDocument {
    fn model(&self) -> &LineInputModel {
        &self.model
    }

    fn selections(&self) -> &[Selection] {
        &self.selections
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
    }

    fn selection_stack(&mut self) -> &mut SelectionStack {
        &mut self.stack
    }

    fn edit(&mut self, edits: Vec<ModelEdit>, options: EditOptions) -> bool {
        log::debug!("applying {} edit(s)", edits.len());
        let mut selections = self.selections.clone();
        for edit in &edits {
            let (start, end, text) = edit.span();
            for selection in &mut selections {
                selection.anchor = map_offset(selection.anchor, start, end, text.len());
                selection.active = map_offset(selection.active, start, end, text.len());
            }
            edit.apply(&mut self.model);
        }
        self.model.flush_changes();
        // change sets only describe one batch
        self.model.clear_changes();
        self.selections = options.selections.unwrap_or(selections);
        true
    }
}
