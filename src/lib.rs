//! # structural-edit
//!
//! Structural (s-expression aware) editing for Clojure source.
//!
//! The [cursor_doc] module holds the engine: a regex-rule lexer, the Clojure scanner, an
//! incrementally re-lexed line model, a token cursor for balanced navigation, the paredit
//! edit operations and the indentation engine. [config] loads the indent rule tables that
//! the indentation engine consumes.
//!
//! ## Testing
//!
//! Tests describe documents in text notation, see the [testing module](cursor_doc::testing).

pub mod config;
pub mod cursor_doc;
