//! Indentation engine
//!
//! [collect_indents] walks backward from an offset, one enclosing list at a time, and
//! records what each level looks like: its head, where it starts, where its first
//! argument sits and how many forms precede the offset. [get_indent] then applies the
//! cljfmt rules found for those heads, innermost level first, and falls back to aligning
//! with the first argument (or one past the opening bracket).
//!
//! Rules only apply to `(` lists; vectors, maps and sets always align.
//!
//! Columns are counted in characters.

use super::model::LineInputModel;
use super::token::TokenType;
use super::token_cursor::LispTokenCursor;
use crate::config::{FormatterConfig, IndentRule};

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_LINES: usize = 20;

/// What one enclosing list looks like from the offset being indented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentInformation {
    /// Raw text of the list's first token, `None` for the top level.
    pub first: Option<String>,
    pub rules: Vec<IndentRule>,
    /// Forms before the offset in this list.
    pub arg_pos: usize,
    /// Forms on the list's first line.
    pub exprs_on_line: usize,
    /// Column just after the opening bracket.
    pub start_indent: usize,
    /// Column of the first argument when it shares the head's line, else `start_indent`.
    pub first_item_ident: usize,
}

fn column(cursor: &LispTokenCursor<'_>) -> usize {
    let (row, col) = cursor.row_col();
    let text = cursor.doc().get_line_text(row);
    text.get(..col).map_or(col, |prefix| prefix.chars().count())
}

fn is_blank(kind: TokenType) -> bool {
    kind.is_whitespace() || kind == TokenType::Comment
}

/// Levels around `offset`, outermost first.
pub fn collect_indents(
    doc: &LineInputModel,
    offset: usize,
    config: &FormatterConfig,
    max_depth: usize,
    max_lines: usize,
) -> Vec<IndentInformation> {
    let mut cursor = doc.get_token_cursor(offset, false);
    cursor.backward_whitespace(true);
    let start_line = cursor.line;
    let mut last_line = cursor.line;
    let mut last_indent = 0;
    let mut arg_pos = 0;
    let mut exprs_on_line = 0;
    let mut max_depth = max_depth;
    let mut indents: Vec<IndentInformation> = Vec::new();

    loop {
        if !cursor.backward_sexp() {
            let prev = cursor.get_prev_token();
            if prev.kind == TokenType::Open && prev.offset <= 1 {
                // a list opening at the start of its line is as far out as it gets
                max_depth = 0;
            }
            let mut next = cursor;
            next.forward_sexp();
            next.forward_whitespace(true);

            let is_list = prev.kind == TokenType::Open && prev.raw.ends_with('(');
            let token = cursor.get_token();
            let first_item_ident = if matches!(token.kind, TokenType::Id | TokenType::Kw)
                && next.line == cursor.line
                && !next.at_end()
                && is_list
            {
                column(&next)
            } else {
                column(&cursor)
            };
            let start_indent = column(&cursor);
            if !cursor.backward_up_list() {
                break;
            }
            let rules = if is_list {
                config
                    .cljfmt_options
                    .rules_for(&token.raw)
                    .map(<[IndentRule]>::to_vec)
                    .unwrap_or_default()
            } else {
                Vec::new()
            };
            indents.insert(
                0,
                IndentInformation {
                    first: Some(token.raw.clone()),
                    rules,
                    arg_pos,
                    exprs_on_line,
                    start_indent,
                    first_item_ident,
                },
            );
            arg_pos = 0;
            exprs_on_line = 1;
        }

        if cursor.line != last_line {
            let mut head = cursor;
            head.forward_sexp();
            head.forward_whitespace(true);
            if !head.at_end() {
                last_indent = column(&head);
                exprs_on_line = 0;
                last_line = cursor.line;
            }
        }

        if is_blank(cursor.get_prev_token().kind) {
            arg_pos += 1;
            exprs_on_line += 1;
        }

        if cursor.at_start()
            || start_line.abs_diff(cursor.line) >= max_lines
            || indents.len() >= max_depth
        {
            break;
        }
    }

    if indents.is_empty() {
        indents.push(IndentInformation {
            first: None,
            rules: Vec::new(),
            arg_pos: 0,
            exprs_on_line: 0,
            start_indent: last_indent,
            first_item_ident: last_indent,
        });
    }
    indents
}

/// Column a line starting at `offset` should be indented to.
pub fn get_indent(doc: &LineInputModel, offset: usize, config: &FormatterConfig) -> usize {
    let state = collect_indents(doc, offset, config, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LINES);
    let Some(this_block) = state.last() else {
        return 0;
    };
    let innermost = state.len() - 1;
    let mut indent = None;

    for (pos, level) in state.iter().enumerate().rev() {
        for rule in &level.rules {
            match *rule {
                IndentRule::Inner { depth, max_arg } => {
                    if pos + depth != innermost {
                        continue;
                    }
                    if max_arg.map_or(true, |max_arg| this_block.arg_pos < max_arg) {
                        indent = Some(this_block.start_indent + 1);
                    }
                }
                IndentRule::Block(n) if pos == innermost => {
                    if this_block.exprs_on_line > n {
                        indent = Some(this_block.first_item_ident);
                    } else if this_block.arg_pos >= n {
                        indent = Some(this_block.start_indent + 1);
                    }
                }
                IndentRule::Block(_) => {}
            }
        }
    }

    indent.unwrap_or(if this_block.exprs_on_line > 0 {
        this_block.first_item_ident
    } else {
        this_block.start_indent
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndentRules;
    use crate::cursor_doc::testing::text_and_selections;
    use rstest::rstest;

    fn indent_at(notation: &str, config: &FormatterConfig) -> usize {
        let (text, selections) = text_and_selections(notation);
        let model = LineInputModel::new(&text);
        get_indent(&model, selections[0].active, config)
    }

    fn no_rules() -> FormatterConfig {
        FormatterConfig::with_indents(IndentRules::new())
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(indent_at("(|)", &no_rules()), 1);
    }

    #[test]
    fn test_inner_pattern_rule() {
        let rules = IndentRules::new()
            .with(
                "#\"^\\w\"",
                vec![IndentRule::Inner {
                    depth: 0,
                    max_arg: None,
                }],
            )
            .unwrap();
        assert_eq!(indent_at("(foo|)", &FormatterConfig::with_indents(rules)), 2);
    }

    #[rstest(
        notation,
        expected,
        case("(foo bar\n|)", 5),
        case("(foo\n|)", 1),
        case("(:k a\n|)", 4),
        case("[a b\n|]", 1),
        case("{:a 1\n|}", 1),
        case("(foo [a\n|])", 6),
        case("  (foo bar\n|)", 7),
        case("(a)\n|", 0)
    )]
    fn test_alignment_without_rules(notation: &str, expected: usize) {
        assert_eq!(indent_at(notation, &no_rules()), expected);
    }

    #[rstest(
        notation,
        expected,
        case("(defn foo [x]\n|)", 2),
        case("(let [x 1]\n|)", 2),
        case("(let\n|)", 1),
        case("(when-let [x (f)]\n|)", 2),
        case("(if x\n|)", 2),
        case("(do a\n|)", 4),
        case("(do\n|)", 2),
        case("(cond\n|)", 2),
        case("(my.ns/defn foo\n|)", 2),
        case("(defthing foo\n|)", 2),
        case("(reify Foo\n  (bar [x]\n|))", 4),
        case("(letfn [(f [x]\n|)])", 11),
        case("(letfn [(f [x] a)\n        (g [y]\n|)])", 11)
    )]
    fn test_default_rules(notation: &str, expected: usize) {
        assert_eq!(indent_at(notation, &FormatterConfig::default()), expected);
    }

    #[rstest(
        notation,
        expected,
        case("(foo\n|)", 2),
        case("(foo a\n|)", 5),
        case("(foo\n  a\n|)", 1)
    )]
    fn test_inner_rule_with_max_arg(notation: &str, expected: usize) {
        let rules = IndentRules::new()
            .with(
                "foo",
                vec![IndentRule::Inner {
                    depth: 0,
                    max_arg: Some(1),
                }],
            )
            .unwrap();
        assert_eq!(indent_at(notation, &FormatterConfig::with_indents(rules)), expected);
    }

    #[test]
    fn test_rules_only_apply_to_lists() {
        assert_eq!(indent_at("[defn foo\n|]", &FormatterConfig::default()), 1);
    }

    #[test]
    fn test_extra_indents_win() {
        let extra = IndentRules::new()
            .with("if", vec![IndentRule::Block(0)])
            .unwrap();
        let config = FormatterConfig::with_extra_indents(extra);
        assert_eq!(indent_at("(if x\n|)", &config), 4);
        assert_eq!(indent_at("(if\n|)", &config), 2);
    }

    #[test]
    fn test_collect_indents_levels() {
        let (text, selections) = text_and_selections("(let [x (f a\n|)])");
        let model = LineInputModel::new(&text);
        let levels = collect_indents(
            &model,
            selections[0].active,
            &FormatterConfig::default(),
            DEFAULT_MAX_DEPTH,
            DEFAULT_MAX_LINES,
        );
        let firsts: Vec<_> = levels.iter().map(|l| l.first.as_deref()).collect();
        assert_eq!(firsts, vec![Some("let"), Some("x"), Some("f")]);
        assert_eq!(levels[0].rules, vec![IndentRule::Block(1)]);
        assert_eq!(levels[2].arg_pos, 1);
        assert_eq!(levels[2].start_indent, 9);
        assert_eq!(levels[2].first_item_ident, 11);
    }

    #[rstest(
        max_depth,
        expected,
        case(DEFAULT_MAX_DEPTH, vec!["c", "d", "e"]),
        case(10, vec!["a", "b", "c", "d", "e"])
    )]
    fn test_collect_indents_stops_at_max_depth(max_depth: usize, expected: Vec<&str>) {
        let (text, selections) = text_and_selections("(a (b (c (d (e\n|)))))");
        let model = LineInputModel::new(&text);
        let levels = collect_indents(
            &model,
            selections[0].active,
            &no_rules(),
            max_depth,
            DEFAULT_MAX_LINES,
        );
        let firsts: Vec<_> = levels.iter().filter_map(|l| l.first.as_deref()).collect();
        assert_eq!(firsts, expected);
    }

    #[test]
    fn test_collect_indents_stops_at_max_lines() {
        let text = format!("(foo bar\n{})", " x\n".repeat(DEFAULT_MAX_LINES + 5));
        let model = LineInputModel::new(&text);
        let offset = text.len() - 1;

        // the head is out of reach, so the nearest line sets the indent
        let bounded = collect_indents(
            &model,
            offset,
            &no_rules(),
            DEFAULT_MAX_DEPTH,
            DEFAULT_MAX_LINES,
        );
        assert_eq!(bounded.len(), 1);
        assert_eq!(bounded[0].first, None);
        assert_eq!(get_indent(&model, offset, &no_rules()), 1);

        let unbounded = collect_indents(&model, offset, &no_rules(), DEFAULT_MAX_DEPTH, 100);
        assert_eq!(unbounded[0].first.as_deref(), Some("foo"));
        assert_eq!(unbounded[0].first_item_ident, 5);
    }
}
