//! Structural editing engine
//!
//! Text flows through the layers bottom up:
//!
//! - [lexer]: regex rule grammars, longest match wins
//! - [scanner]: the Clojure grammars and the per-line scanner
//! - [model]: the document as lines of tokens, re-lexed incrementally on change
//! - [token_cursor]: balanced navigation over the token stream
//! - [paredit]: structural edit operations against an [document::EditableDocument]
//! - [indent]: the indentation engine
//!
//! [balance] computes the brackets missing from a fragment, [testing] holds the text
//! notation the tests use.

pub mod balance;
pub mod document;
pub mod indent;
pub mod lexer;
pub mod model;
pub mod paredit;
pub mod scanner;
pub mod selection;
pub mod testing;
pub mod token;
pub mod token_cursor;
