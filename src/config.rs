//! Per-worksheet extraction configuration.
//!
//! Configuration is a two-level mapping: worksheet name to a set of named
//! settings. Recognized settings are `hasHeaders` (bool, default true),
//! `headerRow` (int, default 0), `bodyRow` (int, default 0, a row offset
//! from the first used row) and `cols` (explicit column list or an `"A:B"`
//! range string; default is the full used-column span).
//!
//! Resolution is deliberately loose: a missing setting or one holding the
//! wrong variant silently falls back to its default. Callers cannot
//! distinguish "default applied" from "explicit value matched default".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extraction configuration: worksheet name to its settings, in the order
/// the worksheets should be processed.
pub type ExtractConfig = IndexMap<String, SheetConfig>;

/// A single configuration setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean setting (`hasHeaders`).
    Bool(bool),
    /// Integer setting (`headerRow`, `bodyRow`).
    Int(i64),
    /// Explicit 1-based column index list (`cols`).
    IntList(Vec<u32>),
    /// Textual setting, e.g. an `"A:B"` column range (`cols`).
    Text(String),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<Vec<u32>> for ConfigValue {
    fn from(v: Vec<u32>) -> Self {
        ConfigValue::IntList(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

/// Settings for one worksheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetConfig {
    settings: HashMap<String, ConfigValue>,
}

impl SheetConfig {
    /// Create an empty configuration; every setting resolves to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a setting, builder-style.
    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    /// Set a setting in place.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.settings.insert(key.to_string(), value.into());
    }

    /// Get the raw value for a setting, if present.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.settings.get(key)
    }

    /// Resolve a boolean setting, falling back to `default` when the key is
    /// absent or holds a non-boolean value.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.settings.get(key) {
            Some(ConfigValue::Bool(v)) => *v,
            _ => default,
        }
    }

    /// Resolve an integer setting, falling back to `default` when the key is
    /// absent or holds a non-integer value.
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        match self.settings.get(key) {
            Some(ConfigValue::Int(v)) => *v,
            _ => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_on_absent_keys() {
        let config = SheetConfig::new();
        assert!(config.bool_or("hasHeaders", true));
        assert_eq!(config.int_or("headerRow", 0), 0);
        assert_eq!(config.int_or("bodyRow", 0), 0);
    }

    #[test]
    fn test_explicit_values() {
        let config = SheetConfig::new()
            .with("hasHeaders", false)
            .with("headerRow", 2i64);
        assert!(!config.bool_or("hasHeaders", true));
        assert_eq!(config.int_or("headerRow", 0), 2);
    }

    #[test]
    fn test_wrong_variant_falls_back() {
        // A string where a bool is expected resolves to the default.
        let config = SheetConfig::new().with("hasHeaders", "yes");
        assert!(config.bool_or("hasHeaders", true));

        let config = SheetConfig::new().with("bodyRow", true);
        assert_eq!(config.int_or("bodyRow", 0), 0);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "Data": {"hasHeaders": true, "headerRow": 1, "bodyRow": 1, "cols": "A:B"},
            "Other": {"cols": [3, 1, 2]}
        }"#;
        let config: ExtractConfig = serde_json::from_str(json).unwrap();

        let data = &config["Data"];
        assert!(data.bool_or("hasHeaders", false));
        assert_eq!(data.int_or("headerRow", 0), 1);
        assert_eq!(data.get("cols"), Some(&ConfigValue::Text("A:B".to_string())));

        let other = &config["Other"];
        assert_eq!(
            other.get("cols"),
            Some(&ConfigValue::IntList(vec![3, 1, 2]))
        );

        // Key order is preserved
        let names: Vec<&str> = config.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Data", "Other"]);
    }
}
