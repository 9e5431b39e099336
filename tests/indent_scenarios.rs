//! Indentation queries against the built-in and loaded rule tables

use rstest::rstest;
use structural_edit::config::{self, ConfigFormat, FormatterConfig, Loader};
use structural_edit::cursor_doc::indent::get_indent;
use structural_edit::cursor_doc::model::LineInputModel;
use structural_edit::cursor_doc::testing::text_and_selections;

/// Helper: indent column at the caret of a document in text notation
fn indent_at(notation: &str, config: &FormatterConfig) -> usize {
    let (text, selections) = text_and_selections(notation);
    let model = LineInputModel::new(&text);
    get_indent(&model, selections[0].active, config)
}

#[rstest(
    notation,
    expected,
    case("(|)", 1),
    case("(defn foo [x]\n|)", 2),
    case("(let [x 1]\n|)", 2),
    case("(foo bar\n|)", 5),
    case("(foo\n|)", 1),
    case("{:a 1\n|}", 1),
    case("(a)\n|", 0)
)]
fn test_builtin_rules(notation: &str, expected: usize) {
    assert_eq!(indent_at(notation, &FormatterConfig::default()), expected);
}

#[test]
fn test_inner_pattern_rule_from_yaml() {
    let yaml = "cljfmt-options:\n  indents:\n    '#\"^\\w\"': [[inner, 0]]\n";
    let config = config::parse_str(yaml, ConfigFormat::Yaml).unwrap();
    assert_eq!(indent_at("(foo|)", &config), 2);
}

#[test]
fn test_extra_indents_from_edn() {
    let config = Loader::new()
        .with_str("{:extra-indents {foo [[:inner 0]]}}", ConfigFormat::Edn)
        .build()
        .unwrap();
    assert_eq!(indent_at("(foo bar\n|)", &config), 2);
    assert_eq!(indent_at("(defn foo [x]\n|)", &config), 2);
}

#[test]
fn test_config_file_on_disk() {
    let path = std::env::temp_dir().join(format!("structural-edit-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{"cljfmt-options": {"extra-indents": {"foo": [["block", 0]]}}}"#,
    )
    .unwrap();
    let config = config::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(indent_at("(foo\n|)", &config), 2);
    assert_eq!(indent_at("(foo bar\n|)", &config), 5);
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let path = std::env::temp_dir().join(format!("structural-edit-{}.edn", std::process::id()));
    std::fs::write(&path, "{:indents {foo [:block 1]}}").unwrap();
    let config = config::load_or_default(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(indent_at("(let [x 1]\n|)", &config), 2);
}
