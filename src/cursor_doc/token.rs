//! Tokens produced by the Clojure scanner.
//!
//! A token's `offset` is relative to the start of its line. Every line ends with a
//! synthesized [TokenType::Eol] token so cursor code never special cases "last token on
//! the line".

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    Ws,
    Comment,
    Open,
    Close,
    Ignore,
    Lit,
    Kw,
    Reader,
    Id,
    Junk,
    Eol,
    StrInside,
    TooLongLine,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Ws => "ws",
            TokenType::Comment => "comment",
            TokenType::Open => "open",
            TokenType::Close => "close",
            TokenType::Ignore => "ignore",
            TokenType::Lit => "lit",
            TokenType::Kw => "kw",
            TokenType::Reader => "reader",
            TokenType::Id => "id",
            TokenType::Junk => "junk",
            TokenType::Eol => "eol",
            TokenType::StrInside => "str-inside",
            TokenType::TooLongLine => "too-long-line",
        }
    }

    /// Whitespace as far as structural navigation is concerned.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenType::Ws | TokenType::Eol)
    }

    /// Tokens that make up a complete form on their own.
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            TokenType::Id
                | TokenType::Lit
                | TokenType::Kw
                | TokenType::Junk
                | TokenType::StrInside
                | TokenType::TooLongLine
        )
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexer state carried from one line to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ScannerState {
    #[serde(rename = "inString")]
    pub in_string: bool,
}

impl ScannerState {
    pub const fn new(in_string: bool) -> Self {
        ScannerState { in_string }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: TokenType,
    pub raw: String,
    pub offset: usize,
    /// State after this token has been consumed.
    pub state: ScannerState,
}

impl Token {
    pub fn new(kind: TokenType, raw: impl Into<String>, offset: usize, state: ScannerState) -> Self {
        Token {
            kind,
            raw: raw.into(),
            offset,
            state,
        }
    }

    /// Offset (within the line) just past this token. The `eol` sentinel has no width.
    pub fn end(&self) -> usize {
        match self.kind {
            TokenType::Eol => self.offset,
            _ => self.offset + self.raw.len(),
        }
    }

    /// True for an `open` whose raw text really ends in a bracket or string quote.
    pub fn opens_list(&self) -> bool {
        self.kind == TokenType::Open && self.raw.ends_with(['(', '[', '{', '"'])
    }

    pub fn opens_string(&self) -> bool {
        self.kind == TokenType::Open && self.raw.ends_with('"')
    }

    /// The bare bracket character of an `open` or `close`.
    pub fn bracket(&self) -> Option<char> {
        match self.kind {
            TokenType::Open | TokenType::Close => self.raw.chars().last(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} {:?}", self.kind, self.offset, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eol_has_no_width() {
        let token = Token::new(TokenType::Eol, "\n", 7, ScannerState::default());
        assert_eq!(token.end(), 7);
    }

    #[test]
    fn test_open_with_prefix_still_opens_list() {
        let token = Token::new(TokenType::Open, "#?@(", 0, ScannerState::default());
        assert!(token.opens_list());
        assert_eq!(token.bracket(), Some('('));
    }

    #[test]
    fn test_token_type_serializes_kebab_case() {
        let json = serde_json::to_string(&TokenType::StrInside).unwrap();
        assert_eq!(json, "\"str-inside\"");
    }
}
