//! Regex rule lexer
//!
//! A [LexicalGrammar] is an ordered list of terminals, each a `(name, pattern, builder)`
//! triple. At every position all terminals are tried against the remaining input and the
//! longest match wins. Ties go to the terminal registered first, which is how e.g. a
//! prefixed `open` sequence beats the lone symbol-start rule.
//!
//! The grammar in use can be swapped mid stream with [Lexer::switch_grammar]; the Clojure
//! scanner uses that to enter and leave strings.
//!
//! Lines longer than the configured maximum degrade: once the position passes the limit,
//! the rest of the input becomes a single `too-long-line` lexeme.

use super::token::TokenType;
use regex::Regex;
use thiserror::Error;

/// Decides the token type of a match.
pub type TokenBuilder = fn(&str) -> TokenType;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("invalid pattern for terminal '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unexpected character at {position}: {remaining:?}")]
    UnexpectedCharacter { position: usize, remaining: String },
}

#[derive(Debug, Clone)]
struct Terminal {
    name: String,
    regex: Regex,
    builder: TokenBuilder,
}

#[derive(Debug, Clone, Default)]
pub struct LexicalGrammar {
    terminals: Vec<Terminal>,
}

/// A single match, borrowed from the lexed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'s> {
    pub kind: TokenType,
    pub raw: &'s str,
    pub offset: usize,
}

impl LexicalGrammar {
    pub fn new() -> Self {
        LexicalGrammar::default()
    }

    /// Registers a terminal. The pattern is anchored at the current position.
    pub fn terminal(
        &mut self,
        name: &str,
        pattern: &str,
        builder: TokenBuilder,
    ) -> Result<&mut Self, GrammarError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            GrammarError::InvalidPattern {
                name: name.to_string(),
                source,
            }
        })?;
        self.terminals.push(Terminal {
            name: name.to_string(),
            regex,
            builder,
        });
        Ok(self)
    }

    /// Builds a grammar from a `(name, pattern, builder)` table, in order.
    pub fn from_rules(rules: &[(&str, &str, TokenBuilder)]) -> Result<Self, GrammarError> {
        let mut grammar = LexicalGrammar::new();
        for (name, pattern, builder) in rules {
            grammar.terminal(name, pattern, *builder)?;
        }
        Ok(grammar)
    }

    pub fn terminal_names(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminals.is_empty()
    }

    pub fn lex<'g, 's>(&'g self, source: &'s str, max_length: Option<usize>) -> Lexer<'g, 's> {
        Lexer {
            grammar: self,
            source,
            position: 0,
            max_length,
        }
    }
}

/// A scanning session over one input.
#[derive(Debug, Clone)]
pub struct Lexer<'g, 's> {
    grammar: &'g LexicalGrammar,
    source: &'s str,
    position: usize,
    max_length: Option<usize>,
}

impl<'g, 's> Lexer<'g, 's> {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn switch_grammar(&mut self, grammar: &'g LexicalGrammar) {
        self.grammar = grammar;
    }

    /// Next lexeme, or `None` at end of input.
    pub fn scan(&mut self) -> Result<Option<Lexeme<'s>>, LexError> {
        if self.position >= self.source.len() {
            return Ok(None);
        }
        let rest = &self.source[self.position..];
        if let Some(max) = self.max_length {
            if self.position > max {
                let lexeme = Lexeme {
                    kind: TokenType::TooLongLine,
                    raw: rest,
                    offset: self.position,
                };
                self.position = self.source.len();
                return Ok(Some(lexeme));
            }
        }

        let mut best: Option<(&'g Terminal, &'s str)> = None;
        for terminal in &self.grammar.terminals {
            if let Some(m) = terminal.regex.find(rest) {
                let len = m.end();
                if len > 0 && best.map_or(true, |(_, raw)| len > raw.len()) {
                    best = Some((terminal, &rest[..len]));
                }
            }
        }

        match best {
            Some((terminal, raw)) => {
                let lexeme = Lexeme {
                    kind: (terminal.builder)(raw),
                    raw,
                    offset: self.position,
                };
                self.position += raw.len();
                Ok(Some(lexeme))
            }
            None => Err(LexError::UnexpectedCharacter {
                position: self.position,
                remaining: rest.chars().take(16).collect(),
            }),
        }
    }

    /// Whatever has not been scanned yet.
    pub fn remaining(&self) -> &'s str {
        &self.source[self.position.min(self.source.len())..]
    }

    /// Skips the rest of the input.
    pub fn finish(&mut self) {
        self.position = self.source.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(_: &str) -> TokenType {
        TokenType::Id
    }

    fn ws(_: &str) -> TokenType {
        TokenType::Ws
    }

    fn kw(_: &str) -> TokenType {
        TokenType::Kw
    }

    fn collect(grammar: &LexicalGrammar, source: &str) -> Vec<(TokenType, String)> {
        let mut lexer = grammar.lex(source, None);
        let mut out = Vec::new();
        while let Some(lexeme) = lexer.scan().unwrap() {
            out.push((lexeme.kind, lexeme.raw.to_string()));
        }
        out
    }

    #[test]
    fn test_longest_match_wins() {
        let grammar =
            LexicalGrammar::from_rules(&[("short", "a", kw), ("long", "a+", id), ("ws", " +", ws)])
                .unwrap();
        assert_eq!(
            collect(&grammar, "aaa a"),
            vec![
                (TokenType::Id, "aaa".to_string()),
                (TokenType::Ws, " ".to_string()),
                // both match one character, the first registered wins
                (TokenType::Kw, "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let grammar = LexicalGrammar::from_rules(&[("a", "a", id)]).unwrap();
        let mut lexer = grammar.lex("ab", None);
        assert!(lexer.scan().unwrap().is_some());
        assert_eq!(
            lexer.scan(),
            Err(LexError::UnexpectedCharacter {
                position: 1,
                remaining: "b".to_string()
            })
        );
    }

    #[test]
    fn test_too_long_line_takes_rest() {
        let grammar = LexicalGrammar::from_rules(&[("a", "a", id), ("ws", " ", ws)]).unwrap();
        let mut lexer = grammar.lex("a a a a", Some(2));
        let mut kinds = Vec::new();
        while let Some(lexeme) = lexer.scan().unwrap() {
            kinds.push((lexeme.kind, lexeme.raw));
        }
        assert_eq!(
            kinds,
            vec![
                (TokenType::Id, "a"),
                (TokenType::Ws, " "),
                (TokenType::Id, "a"),
                (TokenType::TooLongLine, " a a"),
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let grammar = LexicalGrammar::from_rules(&[("fine", "a", id)]).unwrap();
        assert_eq!(grammar.terminal_names().collect::<Vec<_>>(), vec!["fine"]);
        let err = LexicalGrammar::from_rules(&[("broken", "(", id)]).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_switch_grammar_mid_stream() {
        let words = LexicalGrammar::from_rules(&[("a", "a+", id), ("ws", " ", ws)]).unwrap();
        let colons = LexicalGrammar::from_rules(&[("b", "[^ ]+", kw)]).unwrap();
        let mut lexer = words.lex("aa xyz", None);
        assert_eq!(lexer.scan().unwrap().unwrap().raw, "aa");
        assert_eq!(lexer.scan().unwrap().unwrap().raw, " ");
        lexer.switch_grammar(&colons);
        let lexeme = lexer.scan().unwrap().unwrap();
        assert_eq!((lexeme.kind, lexeme.raw, lexeme.offset), (TokenType::Kw, "xyz", 3));
        assert_eq!(lexer.scan().unwrap(), None);
    }
}
