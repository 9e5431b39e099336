//! Clojure scanner
//!
//! Two lexical grammars drive the scanner: the top level one and the one used while
//! inside a string. An `open` token whose raw text ends in `"` switches to the string
//! grammar; a bare `"` switches back. The state after each token is stored on the token,
//! so a line's end state is the state of its trailing `eol`.
//!
//! The `open` rule swallows any run of reader prefix characters (`'`, `` ` ``, `~`, `#`,
//! `@`, `?`, `^`, optionally separated by whitespace) in front of the bracket. Code that
//! needs to know what kind of list an `open` starts looks at the last character of `raw`,
//! never at its length.

use super::lexer::{LexicalGrammar, TokenBuilder};
use super::token::{ScannerState, Token, TokenType};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LINE_LENGTH: usize = 20000;

fn ws(_: &str) -> TokenType {
    TokenType::Ws
}
fn comment(_: &str) -> TokenType {
    TokenType::Comment
}
fn open(_: &str) -> TokenType {
    TokenType::Open
}
fn close(_: &str) -> TokenType {
    TokenType::Close
}
fn ignore(_: &str) -> TokenType {
    TokenType::Ignore
}
fn lit(_: &str) -> TokenType {
    TokenType::Lit
}
fn kw(_: &str) -> TokenType {
    TokenType::Kw
}
fn reader(_: &str) -> TokenType {
    TokenType::Reader
}
fn id(_: &str) -> TokenType {
    TokenType::Id
}
fn junk(_: &str) -> TokenType {
    TokenType::Junk
}
fn str_inside(_: &str) -> TokenType {
    TokenType::StrInside
}

/// Top level terminals. Order matters: on equal length the earlier rule wins.
const CLOJURE_RULES: &[(&str, &str, TokenBuilder)] = &[
    ("ws", r"[\t ,]+", ws),
    ("ws-nl", r"\r\n|\r|\n", ws),
    (
        "ws-other",
        r"[\f\x0B\x1C-\x1F\x{1680}\x{2000}-\x{2006}\x{2008}-\x{200A}\x{2028}\x{2029}\x{205F}\x{3000}]+",
        ws,
    ),
    ("comment", r";.*", comment),
    ("open", r#"(?:['`~#@?^]\s*)*['`~#@?^]*[(\[{"]"#, open),
    ("close", r"[)\]}]", close),
    ("ignore", r"#_", ignore),
    ("lit-quoted-brackets", r"\\[()\[\]{}]", lit),
    ("lit-quoted-chars", r#"\\.[^()\[\]{}\s,;"\\]*"#, lit),
    ("lit-reserved", r"##[a-zA-Z]+", lit),
    ("lit-hex", r"[-+]?0[xX][0-9a-fA-F]+N?", lit),
    ("lit-radix", r"[-+]?\d+[rR][0-9a-zA-Z]+", lit),
    ("lit-ratio", r"[-+]?\d+/\d+", lit),
    ("lit-number", r"[-+]?\d+(?:\.\d*)?(?:[eE][-+]?\d+)?[MN]?", lit),
    ("lit-bool-nil", r"true|false|nil", lit),
    ("kw", r#"(?:['`~^@]\s*)*::?[^()\[\]{},~@`^"\s;]*"#, kw),
    ("reader", r#"#[^()\[\]{}'"_@~\s,;\\]+"#, reader),
    (
        "id",
        r#"(?:(?:['`~^@]|#')\s*)*[^()\[\]{}"\s,'`~#^@;\\\d:][^()\[\]{}"\s,;\\]*"#,
        id,
    ),
    ("junk", r"(?s).", junk),
];

/// Terminals used between an opening and a closing `"`.
const STRING_RULES: &[(&str, &str, TokenBuilder)] = &[
    ("close", r#"""#, close),
    ("ws", r"[^\S\r\n]+", ws),
    ("ws-nl", r"\r\n|\r|\n", ws),
    ("str-inside", r#"(?:[^"\s\\]|\\(?s:.)|\\$)+"#, str_inside),
    ("junk", r"(?s).", junk),
];

pub static TOP_LEVEL_GRAMMAR: Lazy<LexicalGrammar> =
    Lazy::new(|| LexicalGrammar::from_rules(CLOJURE_RULES).expect("built-in grammar compiles"));

pub static STRING_GRAMMAR: Lazy<LexicalGrammar> =
    Lazy::new(|| LexicalGrammar::from_rules(STRING_RULES).expect("built-in grammar compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScannerConfig {
    /// Past this column the rest of a line is a single `too-long-line` token.
    pub max_line_length: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Line scanner. Each document model owns one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Scanner { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Tokenizes one line (without its line terminator), starting in `state`.
    ///
    /// The result always ends with an `eol` token whose state is the line's end state.
    pub fn process_line(&self, line: &str, state: ScannerState) -> Vec<Token> {
        let mut state = state;
        let mut tokens = Vec::new();
        let grammar = if state.in_string {
            &*STRING_GRAMMAR
        } else {
            &*TOP_LEVEL_GRAMMAR
        };
        let mut lexer = grammar.lex(line, Some(self.config.max_line_length));
        loop {
            match lexer.scan() {
                Ok(Some(lexeme)) => {
                    if state.in_string {
                        if lexeme.kind == TokenType::Close {
                            state.in_string = false;
                            lexer.switch_grammar(&TOP_LEVEL_GRAMMAR);
                        }
                    } else if lexeme.kind == TokenType::Open && lexeme.raw.ends_with('"') {
                        state.in_string = true;
                        lexer.switch_grammar(&STRING_GRAMMAR);
                    }
                    tokens.push(Token::new(lexeme.kind, lexeme.raw, lexeme.offset, state));
                }
                Ok(None) => break,
                Err(err) => {
                    log::error!("{}", err);
                    let offset = lexer.position();
                    let rest = lexer.remaining();
                    tokens.push(Token::new(TokenType::Junk, rest, offset, state));
                    lexer.finish();
                }
            }
        }
        tokens.push(Token::new(TokenType::Eol, "\n", line.len(), state));
        tokens
    }

    /// End state of a line given its start state.
    pub fn end_state(&self, line: &str, state: ScannerState) -> ScannerState {
        self.process_line(line, state)
            .last()
            .map(|t| t.state)
            .unwrap_or(state)
    }
}

/// True when `close` is the closing bracket matching the bracket that ends `open`.
pub fn valid_pair(open: &str, close: &str) -> bool {
    let Some(bracket) = open.chars().last() else {
        return false;
    };
    matches!(
        (bracket, close),
        ('(', ")") | ('[', "]") | ('{', "}") | ('"', "\"")
    )
}

/// The closing bracket for an open token's raw text.
pub fn closing_for(open: &str) -> Option<&'static str> {
    match open.chars().last()? {
        '(' => Some(")"),
        '[' => Some("]"),
        '{' => Some("}"),
        '"' => Some("\""),
        _ => None,
    }
}
