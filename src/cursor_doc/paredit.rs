//! Structural edit operations
//!
//! Every operation works the same way: derive ranges from token cursor queries, then hand
//! one batch of [ModelEdit](super::document::ModelEdit)s, ordered from the highest offset
//! down, to [EditableDocument::edit] together with the resulting selection.
//!
//! Operations that find nothing to do are no-ops: no edit is issued and the selection is
//! left alone. The list-level kills are the exception, they refuse to work inside a string
//! and say so with [ParEditError::InString].
//!
//! Modules:
//! - [motion]: movement and selection ranges, with multi-cursor variants
//! - [structure]: wrap, rewrap, split, join, splice, raise, convolute, transpose, drag, kill
//! - [slurp]: slurping and barfing in both directions
//! - [editing]: backspace, delete and the bracket/quote insertion keys
//! - [grow]: selection grow/shrink backed by the document's [SelectionStack](super::selection::SelectionStack)

use super::document::EditableDocument;
use super::model::LineInputModel;
use thiserror::Error;

pub mod editing;
pub mod grow;
pub mod motion;
pub mod slurp;
pub mod structure;

pub use editing::{backspace, close_list, delete_forward, open_list, string_quote};
pub use grow::{grow_selection, shrink_selection};
pub use motion::{
    backward_sexp_or_up_range, backward_sexp_range, forward_sexp_or_up_range, forward_sexp_range,
    move_by, range_to_backward_down_list, range_to_backward_list, range_to_backward_up_list,
    range_to_forward_down_list, range_to_forward_list, range_to_forward_up_list, select_by,
    select_current_form, Motion,
};
pub use slurp::{backward_barf_sexp, backward_slurp_sexp, forward_barf_sexp, forward_slurp_sexp};
pub use structure::{
    convolute_sexp, drag_sexp_backward, drag_sexp_forward, join_sexp, kill_backward_list,
    kill_forward_list, kill_range, raise_sexp, rewrap_sexp, splice_sexp,
    splice_sexp_killing_backward, splice_sexp_killing_forward, split_sexp, transpose_sexps,
    wrap_sexp,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParEditError {
    #[error("{operation} is not available inside a string")]
    InString { operation: &'static str },
}

/// Text of `[offset - before, offset + after)`, or `""` if that reaches outside the document.
pub(crate) fn text_around(model: &LineInputModel, offset: usize, before: usize, after: usize) -> String {
    match offset.checked_sub(before) {
        Some(start) => model.get_text(start, offset + after, true),
        None => String::new(),
    }
}

/// Offsets of the selections an operation applies to.
pub(crate) fn target_selections(
    doc: &impl EditableDocument,
    is_multi: bool,
) -> Vec<super::selection::Selection> {
    if is_multi {
        doc.selections().to_vec()
    } else {
        vec![doc.selection()]
    }
}
