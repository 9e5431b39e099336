//! Missing bracket computation for text fragments.
//!
//! Works on the token stream of a throwaway [LineInputModel], so brackets inside strings,
//! comments and character literals never count.

use super::model::LineInputModel;
use super::scanner::closing_for;
use super::token::TokenType;
use serde::Serialize;

/// What to add around a fragment to balance it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingBrackets {
    /// Openers for unmatched closers, outermost first.
    pub prepend: String,
    /// Closers for unclosed openers, innermost first.
    pub append: String,
}

impl MissingBrackets {
    pub fn is_balanced(&self) -> bool {
        self.prepend.is_empty() && self.append.is_empty()
    }

    /// `text` with the missing brackets added.
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}{}", self.prepend, text, self.append)
    }
}

fn opening_for(close: &str) -> Option<&'static str> {
    match close {
        ")" => Some("("),
        "]" => Some("["),
        "}" => Some("{"),
        "\"" => Some("\""),
        _ => None,
    }
}

/// The brackets needed to balance `text`.
///
/// A closer that does not match the innermost open list still closes it.
pub fn get_missing_brackets(text: &str) -> MissingBrackets {
    let model = LineInputModel::new(text);
    let mut open: Vec<&'static str> = Vec::new();
    let mut prepend = String::new();
    for token in model.lines().iter().flat_map(|line| line.tokens.iter()) {
        match token.kind {
            TokenType::Open => {
                if let Some(close) = closing_for(&token.raw) {
                    open.push(close);
                }
            }
            TokenType::Close => {
                if open.pop().is_none() {
                    if let Some(opener) = opening_for(&token.raw) {
                        prepend.insert_str(0, opener);
                    }
                }
            }
            _ => {}
        }
    }
    let append = open.into_iter().rev().collect();
    MissingBrackets { prepend, append }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_open_fragment() {
        let missing = get_missing_brackets("(a b) (c {:d [1 2 3 \"four\"");
        assert_eq!(missing.prepend, "");
        assert_eq!(missing.append, "]})");
    }

    #[rstest(
        text,
        prepend,
        append,
        case("(a b)", "", ""),
        case("", "", ""),
        case("a) b]", "[(", ""),
        case("x)) (y", "((", ")"),
        case("(str \"a (", "", "\")"),
        case("(a ; (b\n c", "", ")"),
        case("[\\( \\[]", "", ""),
        case("#{:a #(b", "", ")}")
    )]
    fn test_missing_brackets(text: &str, prepend: &str, append: &str) {
        let missing = get_missing_brackets(text);
        assert_eq!(missing.prepend, prepend);
        assert_eq!(missing.append, append);
    }

    #[test]
    fn test_apply_balances() {
        let text = "b) (c [d";
        let missing = get_missing_brackets(text);
        let balanced = missing.apply(text);
        assert_eq!(balanced, "(b) (c [d])");
        assert!(get_missing_brackets(&balanced).is_balanced());
    }
}
