//! A small EDN reader, enough for cljfmt configuration files.
//!
//! Supports nil, booleans, integers, strings, keywords, symbols, regex literals, lists,
//! vectors, sets and maps. Commas are whitespace and `;` starts a line comment.

use super::{ConfigError, ConfigLayer, IndentRule, IndentRules, LayerOptions, RuleKey};
use chumsky::prelude::*;
use chumsky::recursive::Recursive;

#[derive(Debug, Clone, PartialEq)]
pub enum Edn {
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
    Keyword(String),
    Symbol(String),
    Regex(String),
    List(Vec<Edn>),
    Vector(Vec<Edn>),
    Set(Vec<Edn>),
    Map(Vec<(Edn, Edn)>),
}

fn whitespace() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    let blank = filter(|c: &char| c.is_whitespace() || *c == ',').ignored();
    let comment = just(';')
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored();
    blank.or(comment).repeated().ignored()
}

fn atom(text: String) -> Edn {
    if text == "nil" {
        Edn::Nil
    } else if text == "true" {
        Edn::Bool(true)
    } else if text == "false" {
        Edn::Bool(false)
    } else if let Some(keyword) = text.strip_prefix(':') {
        Edn::Keyword(keyword.to_string())
    } else if let Ok(n) = text.parse::<i64>() {
        Edn::Int(n)
    } else {
        Edn::Symbol(text)
    }
}

fn value_parser() -> impl Parser<char, Edn, Error = Simple<char>> {
    recursive(|value: Recursive<char, Edn, Simple<char>>| {
        let ws = whitespace();
        let items = value.clone().then_ignore(ws.clone()).repeated();

        let escape = just('\\').ignore_then(filter(|_: &char| true).map(|c| match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        }));
        let string = just('"')
            .ignore_then(
                filter(|c: &char| *c != '"' && *c != '\\')
                    .or(escape)
                    .repeated()
                    .collect::<String>(),
            )
            .then_ignore(just('"'))
            .map(Edn::Str);

        // regex bodies keep their escapes
        let regex = just("#\"")
            .ignore_then(
                filter(|c: &char| *c != '"' && *c != '\\')
                    .map(String::from)
                    .or(just('\\')
                        .then(filter(|_: &char| true))
                        .map(|(a, b)| format!("{}{}", a, b)))
                    .repeated()
                    .map(|parts: Vec<String>| parts.concat()),
            )
            .then_ignore(just('"'))
            .map(Edn::Regex);

        let list = just('(')
            .ignore_then(ws.clone())
            .ignore_then(items.clone())
            .then_ignore(just(')'))
            .map(Edn::List);
        let vector = just('[')
            .ignore_then(ws.clone())
            .ignore_then(items.clone())
            .then_ignore(just(']'))
            .map(Edn::Vector);
        let set = just("#{")
            .ignore_then(ws.clone())
            .ignore_then(items)
            .then_ignore(just('}'))
            .map(Edn::Set);
        let pair = value
            .clone()
            .then_ignore(ws.clone())
            .then(value.then_ignore(ws.clone()));
        let map = just('{')
            .ignore_then(ws)
            .ignore_then(pair.repeated())
            .then_ignore(just('}'))
            .map(Edn::Map);

        let symbolic = filter(|c: &char| !c.is_whitespace() && !"()[]{}\",;".contains(*c))
            .repeated()
            .at_least(1)
            .collect::<String>()
            .map(atom);

        choice((string, regex, set, map, list, vector, symbolic))
    })
}

/// Reads a single EDN value, surrounded by optional whitespace and comments.
pub fn parse(text: &str) -> Result<Edn, ConfigError> {
    whitespace()
        .ignore_then(value_parser())
        .then_ignore(whitespace())
        .then_ignore(end())
        .parse(text)
        .map_err(|errors| {
            ConfigError::Edn(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
}

/// Reads a cljfmt configuration map: `{:indents {...} :extra-indents {...}}`. Other
/// cljfmt options are accepted and ignored.
pub fn parse_layer(text: &str) -> Result<ConfigLayer, ConfigError> {
    let Edn::Map(entries) = parse(text)? else {
        return Err(ConfigError::Edn("expected a map at the top level".to_string()));
    };
    let mut options = LayerOptions::default();
    for (key, value) in &entries {
        match key {
            Edn::Keyword(k) if k == "indents" => options.indents = Some(indent_rules(value)?),
            Edn::Keyword(k) if k == "extra-indents" => {
                options.extra_indents = Some(indent_rules(value)?)
            }
            _ => {}
        }
    }
    Ok(ConfigLayer {
        cljfmt_options: Some(options),
    })
}

fn indent_rules(value: &Edn) -> Result<IndentRules, ConfigError> {
    let Edn::Map(entries) = value else {
        return Err(ConfigError::InvalidRule(format!(
            "expected a map of indent rules, found {:?}",
            value
        )));
    };
    let mut rules = IndentRules::new();
    for (key, value) in entries {
        let key = match key {
            Edn::Symbol(name) | Edn::Str(name) => RuleKey::Literal(name.clone()),
            Edn::Regex(pattern) => RuleKey::parse(&format!("#\"{}\"", pattern))?,
            other => {
                return Err(ConfigError::InvalidRule(format!(
                    "expected a symbol or regex key, found {:?}",
                    other
                )))
            }
        };
        let Edn::Vector(list) = value else {
            return Err(ConfigError::InvalidRule(format!(
                "rules for {} must be a vector",
                key
            )));
        };
        let parsed = list.iter().map(indent_rule).collect::<Result<Vec<_>, _>>()?;
        rules.insert(key, parsed);
    }
    Ok(rules)
}

fn indent_rule(value: &Edn) -> Result<IndentRule, ConfigError> {
    let parts = match value {
        Edn::Vector(parts) => parts,
        other => {
            return Err(ConfigError::InvalidRule(format!(
                "expected a rule vector, found {:?}",
                other
            )))
        }
    };
    let Some((Edn::Keyword(name), arguments)) = parts.split_first() else {
        return Err(ConfigError::InvalidRule(format!(
            "a rule starts with :block or :inner, found {:?}",
            parts
        )));
    };
    let numbers = arguments
        .iter()
        .map(|argument| match argument {
            Edn::Int(n) => usize::try_from(*n)
                .map_err(|_| ConfigError::InvalidRule(format!("negative rule argument {}", n))),
            other => Err(ConfigError::InvalidRule(format!(
                "expected a number, found {:?}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    IndentRule::from_parts(name, &numbers).map_err(ConfigError::InvalidRule)
}
