//! Token cursor and structural navigation
//!
//! A [LispTokenCursor] is a `(line, token)` position into a [LineInputModel]. It sits
//! *before* the token it points at, so its offset is that token's start. Cursors are
//! `Copy`: speculative navigation is done on a copy that is written back only when it
//! succeeded.
//!
//! Nothing here fails loudly. Navigation on malformed or unbalanced documents returns
//! `false`/`None` and leaves the cursor where it was.
//!
//! A cursor borrows the model, so it cannot outlive an edit. Re-acquire one from
//! [LineInputModel::get_token_cursor] after every change.

use super::model::LineInputModel;
use super::scanner::valid_pair;
use super::token::{ScannerState, Token, TokenType};
use once_cell::sync::Lazy;
use std::fmt;
use std::ptr;

pub mod ranges;

/// What the previous token is at the very start of the document.
static START_OF_DOCUMENT: Lazy<Token> =
    Lazy::new(|| Token::new(TokenType::Eol, "\n", 0, ScannerState::default()));

/// Knobs for moving across one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SexpOptions {
    /// Comments count as whitespace.
    pub skip_comments: bool,
    /// `^meta form` moves as one unit.
    pub skip_metadata: bool,
    /// `#_ form` is stepped over as if it were whitespace.
    pub skip_ignored_forms: bool,
    /// Moving backward also walks back over reader tags (`#inst "..."`).
    pub skip_readers: bool,
}

impl Default for SexpOptions {
    fn default() -> Self {
        SexpOptions {
            skip_comments: true,
            skip_metadata: false,
            skip_ignored_forms: false,
            skip_readers: true,
        }
    }
}

impl SexpOptions {
    /// Comments, metadata and ignored forms all skipped.
    pub fn skipping_all() -> Self {
        SexpOptions {
            skip_comments: true,
            skip_metadata: true,
            skip_ignored_forms: true,
            skip_readers: true,
        }
    }

    pub fn with_metadata(self) -> Self {
        SexpOptions {
            skip_metadata: true,
            ..self
        }
    }
}

#[derive(Clone, Copy)]
pub struct LispTokenCursor<'a> {
    doc: &'a LineInputModel,
    pub line: usize,
    pub token: usize,
}

impl PartialEq for LispTokenCursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.doc, other.doc) && self.line == other.line && self.token == other.token
    }
}

impl Eq for LispTokenCursor<'_> {}

impl fmt::Debug for LispTokenCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LispTokenCursor")
            .field("line", &self.line)
            .field("token", &self.token)
            .field("at", &self.get_token())
            .finish()
    }
}

impl<'a> LispTokenCursor<'a> {
    pub fn new(doc: &'a LineInputModel, line: usize, token: usize) -> Self {
        LispTokenCursor { doc, line, token }
    }

    pub fn doc(&self) -> &'a LineInputModel {
        self.doc
    }

    pub fn set(&mut self, other: &LispTokenCursor<'a>) {
        *self = *other;
    }

    // ---- primitives ----

    pub fn get_token(&self) -> &'a Token {
        &self.doc.line(self.line).tokens[self.token]
    }

    /// Token before the cursor; a synthetic `eol` at the start of the document.
    pub fn get_prev_token(&self) -> &'a Token {
        if self.at_start() {
            return &START_OF_DOCUMENT;
        }
        let mut cursor = *self;
        cursor.previous();
        cursor.get_token()
    }

    pub fn at_start(&self) -> bool {
        self.line == 0 && self.token == 0
    }

    pub fn at_end(&self) -> bool {
        self.line == self.doc.line_count() - 1
            && self.token == self.doc.line(self.line).tokens.len() - 1
    }

    /// One token forward. Returns `false` at the end of the document.
    pub fn next(&mut self) -> bool {
        if self.token < self.doc.line(self.line).tokens.len() - 1 {
            self.token += 1;
            true
        } else if self.line < self.doc.line_count() - 1 {
            self.line += 1;
            self.token = 0;
            true
        } else {
            false
        }
    }

    /// One token backward. Returns `false` at the start of the document.
    pub fn previous(&mut self) -> bool {
        if self.token > 0 {
            self.token -= 1;
            true
        } else if self.line > 0 {
            self.line -= 1;
            self.token = self.doc.line(self.line).tokens.len() - 1;
            true
        } else {
            false
        }
    }

    pub fn row_col(&self) -> (usize, usize) {
        (self.line, self.get_token().offset)
    }

    pub fn offset_start(&self) -> usize {
        self.doc.get_offset_for_line(self.line) + self.get_token().offset
    }

    pub fn offset_end(&self) -> usize {
        self.doc.get_offset_for_line(self.line) + self.get_token().end()
    }

    pub fn is_whitespace(&self) -> bool {
        self.get_token().kind.is_whitespace()
    }

    pub fn previous_is_whitespace(&self) -> bool {
        self.get_prev_token().kind.is_whitespace()
    }

    pub fn token_begins_metadata(&self) -> bool {
        self.get_token().raw.starts_with('^')
    }

    /// Scanner state right before the current token.
    fn state_before(&self) -> ScannerState {
        if self.token > 0 {
            self.doc.line(self.line).tokens[self.token - 1].state
        } else {
            self.doc.line(self.line).start_state
        }
    }

    // ---- whitespace ----

    fn skippable(kind: TokenType, include_comments: bool) -> bool {
        kind.is_whitespace() || (include_comments && kind == TokenType::Comment)
    }

    /// Moves past whitespace (and comments, if asked).
    pub fn forward_whitespace(&mut self, include_comments: bool) {
        while !self.at_end() && Self::skippable(self.get_token().kind, include_comments) {
            self.next();
        }
    }

    /// Moves back over whitespace (and comments, if asked).
    pub fn backward_whitespace(&mut self, include_comments: bool) {
        while !self.at_start() && Self::skippable(self.get_prev_token().kind, include_comments) {
            self.previous();
        }
    }

    pub fn forward_through_any_reader(&mut self) {
        let mut cursor = *self;
        loop {
            cursor.forward_whitespace(true);
            if cursor.get_token().kind == TokenType::Reader {
                cursor.next();
                *self = cursor;
            } else {
                break;
            }
        }
    }

    pub fn backward_through_any_reader(&mut self) {
        let mut cursor = *self;
        loop {
            cursor.backward_whitespace(true);
            if cursor.get_prev_token().kind == TokenType::Reader {
                cursor.previous();
                *self = cursor;
            } else {
                break;
            }
        }
    }

    // ---- sexp movement ----

    pub fn forward_sexp(&mut self) -> bool {
        self.forward_sexp_with(SexpOptions::default())
    }

    /// Moves past the next form. On failure the cursor does not move.
    pub fn forward_sexp_with(&mut self, options: SexpOptions) -> bool {
        let mut cursor = *self;
        if cursor.forward_form(options) {
            *self = cursor;
            true
        } else {
            false
        }
    }

    pub fn backward_sexp(&mut self) -> bool {
        self.backward_sexp_with(SexpOptions::default())
    }

    /// Moves before the previous form. On failure the cursor does not move.
    pub fn backward_sexp_with(&mut self, options: SexpOptions) -> bool {
        let mut cursor = *self;
        if cursor.backward_form(options) {
            *self = cursor;
            true
        } else {
            false
        }
    }

    fn forward_form(&mut self, options: SexpOptions) -> bool {
        let mut stack: Vec<&'a str> = Vec::new();
        self.forward_whitespace(options.skip_comments);
        if self.at_end() || self.get_token().kind == TokenType::Close {
            return false;
        }
        let begins_metadata = self.token_begins_metadata();
        let mut skipped_ignored = false;
        loop {
            self.forward_whitespace(options.skip_comments);
            if self.at_end() {
                return false;
            }
            let token = self.get_token();
            match token.kind {
                TokenType::Open => {
                    stack.push(&token.raw);
                    self.next();
                }
                TokenType::Close => {
                    if stack.is_empty() {
                        // only ignored forms were left before the end of the list
                        return skipped_ignored;
                    }
                    let mut matched = false;
                    while let Some(open) = stack.pop() {
                        if valid_pair(open, &token.raw) {
                            matched = true;
                            break;
                        }
                    }
                    if !matched {
                        return false;
                    }
                    self.next();
                    if stack.is_empty() {
                        break;
                    }
                }
                TokenType::Reader => {
                    self.next();
                }
                TokenType::Ignore if options.skip_ignored_forms => {
                    self.next();
                    let mut ignored = *self;
                    if ignored.forward_form(options) {
                        *self = ignored;
                    }
                    if stack.is_empty() {
                        skipped_ignored = true;
                    }
                }
                TokenType::Ws | TokenType::Eol => {
                    self.next();
                }
                _ => {
                    self.next();
                    if stack.is_empty() {
                        break;
                    }
                }
            }
        }
        if options.skip_metadata && begins_metadata {
            let mut form = *self;
            if form.forward_form(options) {
                *self = form;
            }
        }
        true
    }

    fn backward_form(&mut self, options: SexpOptions) -> bool {
        let mut stack: Vec<&'a str> = Vec::new();
        self.backward_whitespace(options.skip_comments);
        if self.at_start() || self.get_prev_token().kind == TokenType::Open {
            return false;
        }
        loop {
            self.backward_whitespace(options.skip_comments);
            if self.at_start() {
                return false;
            }
            let token = self.get_prev_token();
            match token.kind {
                TokenType::Close => {
                    stack.push(&token.raw);
                    self.previous();
                }
                TokenType::Open => {
                    let mut matched = false;
                    while let Some(close) = stack.pop() {
                        if valid_pair(&token.raw, close) {
                            matched = true;
                            break;
                        }
                    }
                    if !matched {
                        return false;
                    }
                    self.previous();
                    if stack.is_empty() {
                        break;
                    }
                }
                TokenType::Ws | TokenType::Eol => {
                    self.previous();
                }
                TokenType::Reader if stack.is_empty() => {
                    // a dangling reader tag is not a form on its own
                    self.previous();
                }
                _ => {
                    self.previous();
                    if stack.is_empty() {
                        break;
                    }
                }
            }
        }
        if options.skip_readers {
            self.backward_through_any_reader();
        }
        if options.skip_ignored_forms {
            let mut marker = *self;
            marker.backward_whitespace(options.skip_comments);
            if marker.get_prev_token().kind == TokenType::Ignore {
                marker.previous();
                let mut form = marker;
                *self = if form.backward_form(options) { form } else { marker };
            }
        }
        if options.skip_metadata {
            let plain = SexpOptions {
                skip_metadata: false,
                ..options
            };
            loop {
                let mut meta = *self;
                if meta.backward_form(plain) && meta.token_begins_metadata() {
                    *self = meta;
                } else {
                    break;
                }
            }
        }
        true
    }

    // ---- lists ----

    /// Moves to just before the closing bracket of the enclosing list.
    pub fn forward_list(&mut self) -> bool {
        let mut cursor = *self;
        while cursor.forward_sexp() {}
        cursor.forward_whitespace(true);
        let token = cursor.get_token();
        if token.kind != TokenType::Close {
            return false;
        }
        let mut back = cursor;
        if back.backward_list() && valid_pair(&back.get_prev_token().raw, &token.raw) {
            *self = cursor;
            return true;
        }
        false
    }

    /// Moves to just after the opening bracket of the enclosing list.
    pub fn backward_list(&mut self) -> bool {
        let mut cursor = *self;
        while cursor.backward_sexp() {}
        cursor.backward_whitespace(true);
        if cursor.get_prev_token().kind == TokenType::Open {
            *self = cursor;
            return true;
        }
        false
    }

    /// Steps out past the closing bracket right ahead (after whitespace).
    pub fn up_list(&mut self) -> bool {
        let mut cursor = *self;
        cursor.forward_whitespace(true);
        if cursor.get_token().kind == TokenType::Close {
            cursor.next();
            *self = cursor;
            return true;
        }
        false
    }

    /// Steps out before the opening bracket right behind (after whitespace).
    pub fn backward_up_list(&mut self) -> bool {
        let mut cursor = *self;
        cursor.backward_whitespace(true);
        if cursor.get_prev_token().kind == TokenType::Open {
            cursor.previous();
            *self = cursor;
            return true;
        }
        false
    }

    /// Steps into the list right ahead, past any reader tags.
    pub fn down_list(&mut self) -> bool {
        let mut cursor = *self;
        cursor.forward_through_any_reader();
        cursor.forward_whitespace(true);
        if cursor.get_token().kind == TokenType::Open {
            cursor.next();
            *self = cursor;
            return true;
        }
        false
    }

    /// Steps into the list right behind, landing before its closing bracket.
    pub fn backward_down_list(&mut self) -> bool {
        let mut cursor = *self;
        cursor.backward_whitespace(true);
        if cursor.get_prev_token().kind == TokenType::Close {
            cursor.previous();
            *self = cursor;
            return true;
        }
        false
    }

    // ---- predicates ----

    /// Head symbol of the enclosing list.
    pub fn function_name(&self) -> Option<&'a str> {
        let mut cursor = *self;
        if !cursor.backward_list() {
            return None;
        }
        cursor.forward_whitespace(true);
        let token = cursor.get_token();
        (token.kind == TokenType::Id).then_some(token.raw.as_str())
    }

    pub fn within_string(&self) -> bool {
        self.state_before().in_string
    }

    /// Whether `offset`, which lies in the cursor's token, is inside a line comment.
    pub fn within_comment(&self, offset: usize) -> bool {
        let token = self.get_token();
        match token.kind {
            TokenType::Comment => offset > self.offset_start(),
            TokenType::Eol => self.get_prev_token().kind == TokenType::Comment,
            _ => false,
        }
    }

    pub fn within_valid_list(&self) -> bool {
        let mut forward = *self;
        let mut backward = *self;
        forward.forward_list() && backward.backward_list()
    }

    pub fn at_top_level(&self) -> bool {
        let mut cursor = *self;
        while cursor.backward_sexp() {}
        !cursor.backward_up_list()
    }

    /// Every form from here to the end of the document is complete.
    pub fn doc_is_balanced(&self) -> bool {
        let mut cursor = *self;
        while cursor.forward_sexp_with(SexpOptions::skipping_all()) {}
        cursor.forward_whitespace(true);
        cursor.at_end()
    }
}
