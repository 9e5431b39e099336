//! Selections and the grow/shrink selection stack.

use serde::Serialize;

/// An `(anchor, active)` pair of offsets. A cursor is a selection with both equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub anchor: usize,
    pub active: usize,
}

impl Selection {
    pub fn new(anchor: usize, active: usize) -> Self {
        Selection { anchor, active }
    }

    pub fn cursor(offset: usize) -> Self {
        Selection::new(offset, offset)
    }

    /// A forward selection over `(start, end)`.
    pub fn from_range((start, end): (usize, usize)) -> Self {
        Selection::new(start, end)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> (usize, usize) {
        (self.start(), self.end())
    }

    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    pub fn is_cursor(&self) -> bool {
        self.anchor == self.active
    }

    /// Same extent, ignoring direction.
    pub fn same_range(&self, other: &Selection) -> bool {
        self.range() == other.range()
    }
}

/// History of grown selections.
///
/// After every grow the top of the stack equals the live selections. Shrinking pops back
/// through the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStack {
    entries: Vec<Vec<Selection>>,
}

impl SelectionStack {
    pub fn new() -> Self {
        SelectionStack::default()
    }

    pub fn peek(&self) -> Option<&[Selection]> {
        self.entries.last().map(|e| e.as_slice())
    }

    pub fn push(&mut self, selections: Vec<Selection>) {
        self.entries.push(selections);
    }

    pub fn pop(&mut self) -> Option<Vec<Selection>> {
        self.entries.pop()
    }

    /// Starts a new history at `selections`.
    pub fn reset(&mut self, selections: Vec<Selection>) {
        self.entries.clear();
        self.entries.push(selections);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the top of the stack has the same extents as `selections`.
    pub fn top_matches(&self, selections: &[Selection]) -> bool {
        match self.peek() {
            Some(top) => {
                top.len() == selections.len()
                    && top.iter().zip(selections).all(|(a, b)| a.same_range(b))
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_derived_fields() {
        let selection = Selection::new(7, 3);
        assert_eq!(selection.start(), 3);
        assert_eq!(selection.end(), 7);
        assert!(selection.is_reversed());
        assert!(!selection.is_cursor());
        assert!(Selection::cursor(4).is_cursor());
    }

    #[test]
    fn test_stack_top_matching_ignores_direction() {
        let mut stack = SelectionStack::new();
        assert!(!stack.top_matches(&[Selection::cursor(1)]));
        stack.reset(vec![Selection::new(1, 5)]);
        assert!(stack.top_matches(&[Selection::new(5, 1)]));
        stack.push(vec![Selection::new(0, 6)]);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(vec![Selection::new(0, 6)]));
        assert_eq!(stack.peek(), Some(&[Selection::new(1, 5)][..]));
    }
}
