//! Bracket pairing and missing bracket computation

use rstest::rstest;
use structural_edit::cursor_doc::balance::get_missing_brackets;
use structural_edit::cursor_doc::model::LineInputModel;
use structural_edit::cursor_doc::scanner::valid_pair;

#[rstest(
    open,
    close,
    expected,
    case("(", ")", true),
    case("[", "]", true),
    case("{", "}", true),
    case("\"", "\"", true),
    case("(", "}", false),
    case("{", "]", false),
    case("[", "\"", false),
    case("\"", "]", false),
    case("a", "a", false)
)]
fn test_valid_pair(open: &str, close: &str, expected: bool) {
    assert_eq!(valid_pair(open, close), expected);
}

#[test]
fn test_missing_brackets_for_open_fragment() {
    let missing = get_missing_brackets("(a b) (c {:d [1 2 3 \"four\"");
    assert_eq!(missing.prepend, "");
    assert_eq!(missing.append, "]})");
}

#[rstest(
    text,
    case("(a b) (c {:d [1 2 3 \"four\""),
    case("x)) (y [z"),
    case("(str \"open\n(")
)]
fn test_missing_brackets_balance_the_document(text: &str) {
    let balanced = get_missing_brackets(text).apply(text);
    assert!(LineInputModel::new(&balanced).is_balanced(), "{:?}", balanced);
}
