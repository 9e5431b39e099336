//! Line/document model
//!
//! The document is kept as a vector of [TextLine]s, each carrying its tokens and the
//! scanner state before and after it. Edits go through [LineInputModel::change_range],
//! which rebuilds only the touched lines and records bookkeeping about what changed.
//! [LineInputModel::flush_changes] then re-lexes dirty lines, cascading to the following
//! line only while a line's end state differs from what it was.
//!
//! Offsets are byte offsets into the `\n`-joined text. The declared [LineEnding] only
//! affects offset arithmetic (`\r\n` counts as two), never the stored text.
//!
//! Line indices in the bookkeeping sets shift whenever an edit changes the number of
//! lines. Anything holding a line index (token cursors included) must be reacquired
//! after an edit.

use super::scanner::{Scanner, ScannerConfig};
use super::token::{ScannerState, Token};
use super::token_cursor::LispTokenCursor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn length(&self) -> usize {
        match self {
            LineEnding::Lf => 1,
            LineEnding::CrLf => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub tokens: Vec<Token>,
    pub start_state: ScannerState,
    pub end_state: ScannerState,
}

impl TextLine {
    pub fn new(text: impl Into<String>, start_state: ScannerState, scanner: &Scanner) -> Self {
        let mut line = TextLine {
            text: text.into(),
            tokens: Vec::new(),
            start_state,
            end_state: start_state,
        };
        line.process(scanner);
        line
    }

    fn process(&mut self, scanner: &Scanner) {
        self.tokens = scanner.process_line(&self.text, self.start_state);
        self.end_state = self
            .tokens
            .last()
            .map(|t| t.state)
            .unwrap_or(self.start_state);
    }

    /// Re-lexes under a new start state.
    pub fn relex(&mut self, start_state: ScannerState, scanner: &Scanner) {
        self.start_state = start_state;
        self.process(scanner);
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Largest char boundary of `text` not after `col`.
pub(crate) fn floor_char_boundary(text: &str, col: usize) -> usize {
    let mut col = col.min(text.len());
    while !text.is_char_boundary(col) {
        col -= 1;
    }
    col
}

/// Splits on `\n` and `\r\n`; a lone `\r` stays part of the text.
fn split_lines(text: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = text.split('\n').collect();
    let last = segments.len() - 1;
    for segment in &mut segments[..last] {
        if let Some(stripped) = segment.strip_suffix('\r') {
            *segment = stripped;
        }
    }
    segments
}

#[derive(Debug, Clone)]
pub struct LineInputModel {
    lines: Vec<TextLine>,
    line_ending: LineEnding,
    scanner: Scanner,
    pub changed_lines: BTreeSet<usize>,
    pub inserted_lines: BTreeSet<usize>,
    pub deleted_lines: BTreeSet<usize>,
    pub dirty_lines: BTreeSet<usize>,
}

impl Default for LineInputModel {
    fn default() -> Self {
        LineInputModel::new("")
    }
}

impl LineInputModel {
    pub fn new(text: &str) -> Self {
        LineInputModel::with_config(text, LineEnding::Lf, ScannerConfig::default())
    }

    pub fn with_config(text: &str, line_ending: LineEnding, config: ScannerConfig) -> Self {
        let scanner = Scanner::new(config);
        let mut state = ScannerState::default();
        let lines = split_lines(text)
            .into_iter()
            .map(|segment| {
                let line = TextLine::new(segment, state, &scanner);
                state = line.end_state;
                line
            })
            .collect();
        LineInputModel {
            lines,
            line_ending,
            scanner,
            changed_lines: BTreeSet::new(),
            inserted_lines: BTreeSet::new(),
            deleted_lines: BTreeSet::new(),
            dirty_lines: BTreeSet::new(),
        }
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> &TextLine {
        &self.lines[row]
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn line_ending_length(&self) -> usize {
        self.line_ending.length()
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Text of one line, or `""` past the last line.
    pub fn get_line_text(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.text.as_str()).unwrap_or("")
    }

    /// The whole document, `\n`-joined.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn get_offset_for_line(&self, row: usize) -> usize {
        let le = self.line_ending_length();
        self.lines[..row.min(self.lines.len())]
            .iter()
            .map(|l| l.text.len() + le)
            .sum()
    }

    pub fn max_offset(&self) -> usize {
        let last = self.lines.len() - 1;
        self.get_offset_for_line(last) + self.lines[last].text.len()
    }

    /// `(row, col)` of an offset. Offsets past the end clamp to the end of the last line.
    pub fn get_row_col(&self, offset: usize) -> (usize, usize) {
        let le = self.line_ending_length();
        let mut remaining = offset;
        for (row, line) in self.lines.iter().enumerate() {
            if remaining > line.text.len() {
                remaining = remaining.saturating_sub(line.text.len() + le);
            } else {
                return (row, remaining);
            }
        }
        let last = self.lines.len() - 1;
        (last, self.lines[last].text.len())
    }

    /// Text between two offsets, lines joined with `\n`.
    ///
    /// With `must_be_within`, bounds outside the document give `""`.
    pub fn get_text(&self, start: usize, end: usize, must_be_within: bool) -> String {
        if start == end {
            return String::new();
        }
        if must_be_within && (start > self.max_offset() || end > self.max_offset()) {
            return String::new();
        }
        let (start, end) = (start.min(end), start.max(end));
        let (start_row, start_col) = self.get_row_col(start);
        let (end_row, end_col) = self.get_row_col(end);
        if start_row == end_row {
            let text = &self.lines[start_row].text;
            let from = floor_char_boundary(text, start_col);
            let to = floor_char_boundary(text, end_col).max(from);
            return text[from..to].to_string();
        }
        let first = &self.lines[start_row].text;
        let last = &self.lines[end_row].text;
        let mut parts = Vec::with_capacity(end_row - start_row + 1);
        parts.push(&first[floor_char_boundary(first, start_col)..]);
        for line in &self.lines[start_row + 1..end_row] {
            parts.push(line.text.as_str());
        }
        parts.push(&last[..floor_char_boundary(last, end_col)]);
        parts.join("\n")
    }

    fn state_for_line(&self, row: usize) -> ScannerState {
        if row == 0 {
            ScannerState::default()
        } else {
            self.lines[row - 1].end_state
        }
    }

    /// Replaces `[min(start, end), max(start, end))` with `text`.
    pub fn change_range(&mut self, start: usize, end: usize, text: &str) {
        let (start, end) = (start.min(end), start.max(end));
        let (start_row, start_col) = self.get_row_col(start);
        let (end_row, end_col) = self.get_row_col(end);
        let first = &self.lines[start_row].text;
        let last = &self.lines[end_row].text;
        let left = first[..floor_char_boundary(first, start_col)].to_string();
        let right = last[floor_char_boundary(last, end_col)..].to_string();

        let segments = split_lines(text);
        let count = segments.len();
        let new_texts: Vec<String> = segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let mut line = String::new();
                if i == 0 {
                    line.push_str(&left);
                }
                line.push_str(segment);
                if i + 1 == count {
                    line.push_str(&right);
                }
                line
            })
            .collect();

        let mut state = self.state_for_line(start_row);
        let replacement: Vec<TextLine> = new_texts
            .into_iter()
            .map(|t| {
                let line = TextLine::new(t, state, &self.scanner);
                state = line.end_state;
                line
            })
            .collect();

        let old_count = end_row - start_row + 1;
        let new_count = replacement.len();
        log::trace!(
            "change_range [{}, {}) rows {}..={} replaced by {} line(s)",
            start,
            end,
            start_row,
            end_row,
            new_count
        );
        self.lines.splice(start_row..=end_row, replacement);

        if old_count != new_count {
            for set in [
                &mut self.dirty_lines,
                &mut self.changed_lines,
                &mut self.inserted_lines,
                &mut self.deleted_lines,
            ] {
                *set = shift_indices(set, start_row, old_count, new_count);
            }
        }
        for row in start_row..start_row + new_count {
            self.changed_lines.insert(row);
            self.dirty_lines.insert(row);
        }
        if new_count > old_count {
            self.inserted_lines
                .extend(start_row + old_count..start_row + new_count);
        } else if old_count > new_count {
            self.deleted_lines
                .extend(start_row + new_count..start_row + old_count);
        }
        let next = start_row + new_count;
        if next < self.lines.len() {
            self.dirty_lines.insert(next);
        }
    }

    pub fn insert_string(&mut self, offset: usize, text: &str) {
        self.change_range(offset, offset, text);
    }

    pub fn delete_range(&mut self, offset: usize, count: usize) {
        self.change_range(offset, offset + count, "");
    }

    /// Re-lexes dirty lines in ascending order, each at most once, cascading while the
    /// end state changes. Returns how many lines were re-lexed.
    pub fn flush_changes(&mut self) -> usize {
        let mut visited = BTreeSet::new();
        let mut relexed = 0;
        while let Some(row) = self.dirty_lines.pop_first() {
            if row >= self.lines.len() || !visited.insert(row) {
                continue;
            }
            let mut row = row;
            loop {
                let start_state = self.state_for_line(row);
                let old_end = self.lines[row].end_state;
                let old_start = self.lines[row].start_state;
                self.lines[row].relex(start_state, &self.scanner);
                relexed += 1;
                if old_start != start_state {
                    self.changed_lines.insert(row);
                }
                if self.lines[row].end_state == old_end || row + 1 >= self.lines.len() {
                    break;
                }
                row += 1;
                self.dirty_lines.remove(&row);
                if !visited.insert(row) {
                    break;
                }
                self.changed_lines.insert(row);
            }
        }
        log::debug!("flush_changes re-lexed {} line(s)", relexed);
        relexed
    }

    /// Clears the bookkeeping sets after the consumer has looked at them.
    pub fn clear_changes(&mut self) {
        self.changed_lines.clear();
        self.inserted_lines.clear();
        self.deleted_lines.clear();
    }

    /// Cursor at the token containing `offset`, or the token before it with `previous`.
    pub fn get_token_cursor(&self, offset: usize, previous: bool) -> LispTokenCursor<'_> {
        let (row, col) = self.get_row_col(offset);
        let tokens = &self.lines[row].tokens;
        let mut last_index: usize = 0;
        for (i, token) in tokens.iter().enumerate() {
            if token.offset > col {
                let index = if previous {
                    last_index.saturating_sub(1)
                } else {
                    last_index
                };
                return LispTokenCursor::new(self, row, index);
            }
            last_index = i;
        }
        LispTokenCursor::new(self, row, tokens.len() - 1)
    }

    /// Every top level form in the document is closed.
    pub fn is_balanced(&self) -> bool {
        self.get_token_cursor(0, false).doc_is_balanced()
    }
}

/// Re-indexes a bookkeeping set after `old_count` lines at `start` became `new_count`.
fn shift_indices(
    set: &BTreeSet<usize>,
    start: usize,
    old_count: usize,
    new_count: usize,
) -> BTreeSet<usize> {
    let kept = start + old_count.min(new_count);
    set.iter()
        .filter_map(|&i| {
            if i < kept {
                Some(i)
            } else if i < start + old_count {
                None
            } else {
                Some(i + new_count - old_count)
            }
        })
        .collect()
}
