//! Formatter configuration.
//!
//! `defaults/formatter.default.yaml` is embedded so that the built-in indent rules and the
//! documentation of their format live in one place. User files are layered on top of it
//! with [`Loader`]; JSON, YAML and cljfmt-style EDN files are understood.
//!
//! The shape mirrors the editor settings it comes from:
//!
//! ```yaml
//! cljfmt-options:
//!   indents:                     # replaces the built-in table when given
//!     defn: [[inner, 0]]
//!   extra-indents:               # consulted before `indents`
//!     '#"^with-"': [[block, 1]]
//! ```

pub mod edn;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_YAML: &str = include_str!("../defaults/formatter.default.yaml");

static DEFAULT_CONFIG: Lazy<FormatterConfig> = Lazy::new(|| {
    parse_str(DEFAULT_YAML, ConfigFormat::Yaml).expect("embedded default configuration parses")
});

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid EDN configuration: {0}")]
    Edn(String),
    #[error("invalid indent rule: {0}")]
    InvalidRule(String),
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

/// How a head symbol is matched, decided once when the table is loaded.
#[derive(Debug, Clone)]
pub enum RuleKey {
    /// Matches the symbol name, with or without a namespace.
    Literal(String),
    /// Matches when the regex finds a match in the whole symbol.
    Pattern(Regex),
}

impl RuleKey {
    /// `#"..."` keys are patterns, everything else is a literal.
    pub fn parse(key: &str) -> Result<Self, ConfigError> {
        match key.strip_prefix("#\"").and_then(|k| k.strip_suffix('"')) {
            Some(pattern) => Regex::new(pattern)
                .map(RuleKey::Pattern)
                .map_err(|e| ConfigError::InvalidRule(format!("{}: {}", key, e))),
            None => Ok(RuleKey::Literal(key.to_string())),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, RuleKey::Pattern(_))
    }

    pub fn matches(&self, head: &str) -> bool {
        match self {
            RuleKey::Literal(name) => {
                head == name
                    || head
                        .rsplit_once('/')
                        .is_some_and(|(_, local)| local == name)
            }
            RuleKey::Pattern(regex) => regex.is_match(head),
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKey::Literal(name) => write!(f, "{}", name),
            RuleKey::Pattern(regex) => write!(f, "#\"{}\"", regex.as_str()),
        }
    }
}

/// One cljfmt indent rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<RuleAtom>")]
pub enum IndentRule {
    /// `[block, n]`
    Block(usize),
    /// `[inner, depth]` or `[inner, depth, max_arg]`; with `max_arg` only arguments
    /// `depth..max_arg` of the innermost list get the inner indent.
    Inner { depth: usize, max_arg: Option<usize> },
}

/// One element of a rule written as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleAtom {
    Number(usize),
    Name(String),
}

impl TryFrom<Vec<RuleAtom>> for IndentRule {
    type Error = String;

    fn try_from(atoms: Vec<RuleAtom>) -> Result<Self, Self::Error> {
        let (name, numbers) = match atoms.split_first() {
            Some((RuleAtom::Name(name), rest)) => (name.trim_start_matches(':'), rest),
            _ => return Err("a rule starts with `block` or `inner`".to_string()),
        };
        let numbers = numbers
            .iter()
            .map(|atom| match atom {
                RuleAtom::Number(n) => Ok(*n),
                RuleAtom::Name(s) => Err(format!("expected a number, found `{}`", s)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        IndentRule::from_parts(name, &numbers)
    }
}

impl IndentRule {
    /// Builds a rule from its name (`block`/`inner`, a leading `:` is ignored) and
    /// arguments.
    pub fn from_parts(name: &str, numbers: &[usize]) -> Result<Self, String> {
        match (name.trim_start_matches(':'), numbers) {
            ("block", [n]) => Ok(IndentRule::Block(*n)),
            ("inner", [depth]) => Ok(IndentRule::Inner {
                depth: *depth,
                max_arg: None,
            }),
            ("inner", [depth, max_arg]) => Ok(IndentRule::Inner {
                depth: *depth,
                max_arg: Some(*max_arg),
            }),
            (name, numbers) => Err(format!(
                "`{}` with {} argument(s) is not a known rule",
                name,
                numbers.len()
            )),
        }
    }
}

/// An ordered indent rule table.
#[derive(Debug, Clone, Default)]
pub struct IndentRules {
    entries: Vec<(RuleKey, Vec<IndentRule>)>,
}

impl IndentRules {
    pub fn new() -> Self {
        IndentRules::default()
    }

    pub fn insert(&mut self, key: RuleKey, rules: Vec<IndentRule>) {
        self.entries.push((key, rules));
    }

    /// Builder-style [`insert`](Self::insert) from a textual key.
    pub fn with(mut self, key: &str, rules: Vec<IndentRule>) -> Result<Self, ConfigError> {
        self.insert(RuleKey::parse(key)?, rules);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RuleKey, Vec<IndentRule>)> {
        self.entries.iter()
    }

    /// First literal entry matching `head`.
    pub fn find_literal(&self, head: &str) -> Option<&[IndentRule]> {
        self.find(head, false)
    }

    /// First pattern entry matching `head`.
    pub fn find_pattern(&self, head: &str) -> Option<&[IndentRule]> {
        self.find(head, true)
    }

    fn find(&self, head: &str, pattern: bool) -> Option<&[IndentRule]> {
        self.entries
            .iter()
            .find(|(key, _)| key.is_pattern() == pattern && key.matches(head))
            .map(|(_, rules)| rules.as_slice())
    }

    /// `self` in front of `base`.
    fn layered_over(mut self, base: IndentRules) -> IndentRules {
        self.entries.extend(base.entries);
        self
    }
}

impl<'de> Deserialize<'de> for IndentRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = IndentRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from symbol names or #\"patterns\" to rule lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<IndentRules, A::Error> {
                let mut rules = IndentRules::new();
                while let Some(key) = map.next_key::<String>()? {
                    let value: Vec<IndentRule> = map.next_value()?;
                    rules.insert(RuleKey::parse(&key).map_err(de::Error::custom)?, value);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

#[derive(Debug, Clone)]
pub struct CljfmtOptions {
    pub indents: IndentRules,
    pub extra_indents: IndentRules,
}

impl Default for CljfmtOptions {
    fn default() -> Self {
        DEFAULT_CONFIG.cljfmt_options.clone()
    }
}

impl CljfmtOptions {
    /// Rules for a list headed by `head`: literal keys before pattern keys, and within
    /// each kind `extra-indents` before `indents`.
    pub fn rules_for(&self, head: &str) -> Option<&[IndentRule]> {
        self.extra_indents
            .find_literal(head)
            .or_else(|| self.indents.find_literal(head))
            .or_else(|| self.extra_indents.find_pattern(head))
            .or_else(|| self.indents.find_pattern(head))
    }
}

/// Configuration consumed by the indentation engine.
#[derive(Debug, Clone, Default)]
pub struct FormatterConfig {
    pub cljfmt_options: CljfmtOptions,
}

impl FormatterConfig {
    /// The built-in table with `extra` consulted first.
    pub fn with_extra_indents(extra: IndentRules) -> Self {
        let mut config = FormatterConfig::default();
        config.cljfmt_options.extra_indents = extra;
        config
    }

    /// Only the given table, no built-in rules.
    pub fn with_indents(indents: IndentRules) -> Self {
        FormatterConfig {
            cljfmt_options: CljfmtOptions {
                indents,
                extra_indents: IndentRules::new(),
            },
        }
    }

    fn apply(&mut self, layer: ConfigLayer) {
        let Some(options) = layer.cljfmt_options else {
            return;
        };
        if let Some(indents) = options.indents {
            self.cljfmt_options.indents = indents;
        }
        if let Some(extra) = options.extra_indents {
            let base = std::mem::take(&mut self.cljfmt_options.extra_indents);
            self.cljfmt_options.extra_indents = extra.layered_over(base);
        }
    }
}

/// What one configuration source says. Absent tables leave the layers below alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
    #[serde(rename = "cljfmt-options", default)]
    pub cljfmt_options: Option<LayerOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerOptions {
    #[serde(default)]
    pub indents: Option<IndentRules>,
    #[serde(default)]
    pub extra_indents: Option<IndentRules>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Edn,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "edn" => Ok(ConfigFormat::Edn),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parses one configuration source.
pub fn parse_layer(text: &str, format: ConfigFormat) -> Result<ConfigLayer, ConfigError> {
    match format {
        ConfigFormat::Json => Ok(serde_json::from_str(text)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        ConfigFormat::Edn => edn::parse_layer(text),
    }
}

/// Parses a complete configuration. Tables it leaves out are empty.
pub fn parse_str(text: &str, format: ConfigFormat) -> Result<FormatterConfig, ConfigError> {
    let mut config = FormatterConfig {
        cljfmt_options: CljfmtOptions {
            indents: IndentRules::new(),
            extra_indents: IndentRules::new(),
        },
    };
    config.apply(parse_layer(text, format)?);
    Ok(config)
}

enum Source {
    File { path: PathBuf, required: bool },
    Text { text: String, format: ConfigFormat },
}

/// Layers configuration sources over the built-in defaults.
pub struct Loader {
    sources: Vec<Source>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        Loader {
            sources: Vec::new(),
        }
    }

    /// Layer a configuration file. A missing file is an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: true,
        });
        self
    }

    /// Layer a configuration file if it exists.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(Source::File {
            path: path.as_ref().to_path_buf(),
            required: false,
        });
        self
    }

    /// Layer configuration text, e.g. settings passed by an editor.
    pub fn with_str(mut self, text: impl Into<String>, format: ConfigFormat) -> Self {
        self.sources.push(Source::Text {
            text: text.into(),
            format,
        });
        self
    }

    pub fn build(self) -> Result<FormatterConfig, ConfigError> {
        let mut config = FormatterConfig::default();
        for source in self.sources {
            let layer = match source {
                Source::File { path, required } => {
                    if !required && !path.exists() {
                        continue;
                    }
                    let format = ConfigFormat::from_path(&path)?;
                    let text = std::fs::read_to_string(&path)
                        .map_err(|source| ConfigError::Io { path, source })?;
                    parse_layer(&text, format)?
                }
                Source::Text { text, format } => parse_layer(&text, format)?,
            };
            config.apply(layer);
        }
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in configuration with the file at `path` layered on top.
pub fn load(path: impl AsRef<Path>) -> Result<FormatterConfig, ConfigError> {
    Loader::new().with_file(path).build()
}

/// Like [`load`], falling back to the built-in configuration if the file cannot be used.
pub fn load_or_default(path: impl AsRef<Path>) -> FormatterConfig {
    let path = path.as_ref();
    load(path).unwrap_or_else(|err| {
        log::warn!("using default formatter configuration: {}", err);
        FormatterConfig::default()
    })
}
