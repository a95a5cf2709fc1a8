//! Clean-up configuration.
//!
//! One switch per transformation family, deserializable from a
//! `[javaclean]` TOML table or buildable from the host's flat string-keyed
//! option map. Beyond "is family X enabled, with variant Y" the map is
//! opaque to the engine: unknown keys are ignored.

use serde::Deserialize;
use std::collections::HashMap;

/// Brace-normalization variant for control-statement bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BraceStyle {
    /// Every control-statement body gets braces.
    Always,
    /// Braces around single-statement bodies are removed wherever safe.
    Never,
    /// Only single `return`/`throw` bodies lose their braces.
    OnlyReturnAndThrow,
}

impl BraceStyle {
    /// Parse the option-map spelling of a variant.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            "only-return-and-throw" => Some(Self::OnlyReturnAndThrow),
            _ => None,
        }
    }
}

/// Per-family switches for one clean-up run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanUpOptions {
    /// Brace normalization; `None` disables the family.
    pub control_statement_braces: Option<BraceStyle>,
    /// Convert qualifying counted loops to element loops.
    pub convert_indexed_loops: bool,
    /// Merge string-literal concatenation chains.
    pub merge_string_concat: bool,
    /// Convert qualifying `if`/`else if` chains to `switch` statements.
    pub if_chain_to_switch: bool,
    /// Minimum number of branches (including `else`) before a chain is
    /// worth converting to a `switch`.
    pub min_switch_branches: usize,
    /// Indent unit used when synthesized text adds a nesting level.
    pub indent_unit: String,
}

impl Default for CleanUpOptions {
    fn default() -> Self {
        Self {
            control_statement_braces: None,
            convert_indexed_loops: false,
            merge_string_concat: false,
            if_chain_to_switch: false,
            min_switch_branches: 3,
            indent_unit: "    ".to_owned(),
        }
    }
}

impl CleanUpOptions {
    /// Build options from the host's flat string-keyed map.
    /// Keys the engine does not know are ignored.
    #[must_use]
    pub fn from_map<S: std::hash::BuildHasher>(map: &HashMap<String, String, S>) -> Self {
        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "braces" => options.control_statement_braces = BraceStyle::parse(value),
                "convert-indexed-loops" => options.convert_indexed_loops = value == "true",
                "merge-string-concat" => options.merge_string_concat = value == "true",
                "if-chain-to-switch" => options.if_chain_to_switch = value == "true",
                "min-switch-branches" => {
                    if let Ok(n) = value.parse() {
                        options.min_switch_branches = n;
                    }
                }
                "indent-unit" => options.indent_unit.clone_from(value),
                _ => {}
            }
        }
        options
    }

    /// Whether any family is enabled at all.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.control_statement_braces.is_some()
            || self.convert_indexed_loops
            || self.merge_string_concat
            || self.if_chain_to_switch
    }
}

/// Top-level configuration file shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// The `[javaclean]` table.
    #[serde(default)]
    pub javaclean: CleanUpOptions,
}

impl Config {
    /// Parse a TOML configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
