//! Indentation settings read from `.editorconfig` style properties

use serde::{Deserialize, Deserializer};

use crate::error::KlintError;
use crate::result::Result;

pub const INDENT_SIZE: &str = "indent_size";
pub const CONTINUATION_INDENT_SIZE: &str = "continuation_indent_size";

const DEFAULT_INDENT_SIZE: usize = 4;

/// Indentation settings for one source file
///
/// `indent_size` is `None` when the property is explicitly `unset`, which
/// disables indentation checks. `continuation_indent_size` is `None` when it
/// is absent or unset, in which case it follows `indent_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "default_indent_size", deserialize_with = "deserialize_size")]
    pub indent_size: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub continuation_indent_size: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            continuation_indent_size: None,
        }
    }
}

impl EditorConfig {
    /// Settings with explicit sizes
    pub fn new(indent_size: usize, continuation_indent_size: usize) -> Self {
        Self {
            indent_size: Some(indent_size),
            continuation_indent_size: Some(continuation_indent_size),
        }
    }

    /// Build settings from raw property pairs
    ///
    /// Unknown properties are ignored. Sizes must be integers or `unset`;
    /// anything else is a [`KlintError::Config`].
    ///
    /// ```rust,ignore
    /// let config = EditorConfig::from_properties([("indent_size", "2")])?;
    /// assert_eq!(config.continuation_indent_size(), 2);
    /// ```
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            match key.as_ref() {
                INDENT_SIZE => config.indent_size = parse_size(INDENT_SIZE, value.as_ref())?,
                CONTINUATION_INDENT_SIZE => {
                    config.continuation_indent_size =
                        parse_size(CONTINUATION_INDENT_SIZE, value.as_ref())?
                }
                _ => {}
            }
        }
        Ok(config)
    }

    /// Spaces per indentation level; zero when unset
    pub fn indent_size(&self) -> usize {
        self.indent_size.unwrap_or(0)
    }

    /// Spaces per continuation level
    pub fn continuation_indent_size(&self) -> usize {
        self.continuation_indent_size
            .unwrap_or_else(|| self.indent_size())
    }

    /// Indentation is only checked for indent sizes above one
    pub fn is_enabled(&self) -> bool {
        self.indent_size.is_some_and(|size| size > 1)
    }
}

fn default_indent_size() -> Option<usize> {
    Some(DEFAULT_INDENT_SIZE)
}

/// `unset` → `None`; negative sizes clamp to zero
fn parse_size(key: &str, value: &str) -> Result<Option<usize>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("unset") {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(|size| Some(usize::try_from(size).unwrap_or(0)))
        .map_err(|_| KlintError::config_error(key, value))
}

/// Accepts either a number or a string such as `"2"` or `"unset"`
fn deserialize_size<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Number(i64),
        Text(String),
    }

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Number(size) => Ok(Some(usize::try_from(size).unwrap_or(0))),
        SizeValue::Text(text) => parse_size("size", &text).map_err(D::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.indent_size(), 4);
        assert_eq!(config.continuation_indent_size(), 4);
        assert!(config.is_enabled());
    }

    #[test]
    fn test_continuation_follows_indent_size() {
        let config = EditorConfig::from_properties([("indent_size", "2")]).expect("config");
        assert_eq!(config.indent_size(), 2);
        assert_eq!(config.continuation_indent_size(), 2);

        let config = EditorConfig::from_properties([
            ("indent_size", "4"),
            ("continuation_indent_size", "unset"),
        ])
        .expect("config");
        assert_eq!(config.continuation_indent_size(), 4);
    }

    #[test]
    fn test_explicit_sizes() {
        let properties: HashMap<String, String> = [
            ("indent_size".to_string(), "4".to_string()),
            ("continuation_indent_size".to_string(), "6".to_string()),
            ("max_line_length".to_string(), "off".to_string()),
        ]
        .into_iter()
        .collect();
        let config = EditorConfig::from_properties(&properties).expect("config");
        assert_eq!(config, EditorConfig::new(4, 6));
    }

    #[test]
    fn test_disabled_sizes() {
        for value in ["unset", "UNSET", "1", "0", "-3"] {
            let config = EditorConfig::from_properties([("indent_size", value)]).expect("config");
            assert!(!config.is_enabled(), "{value} should disable the rule");
        }
    }

    #[test]
    fn test_invalid_size_is_an_error() {
        let error = EditorConfig::from_properties([("indent_size", "tab")]).unwrap_err();
        assert_eq!(error, KlintError::config_error("indent_size", "tab"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: EditorConfig =
            toml::from_str("indent_size = 2\ncontinuation_indent_size = \"3\"").expect("toml");
        assert_eq!(config, EditorConfig::new(2, 3));

        let config: EditorConfig = toml::from_str("indent_size = \"unset\"").expect("toml");
        assert!(!config.is_enabled());

        let config: EditorConfig = toml::from_str("").expect("toml");
        assert_eq!(config, EditorConfig::default());

        assert!(toml::from_str::<EditorConfig>("indent_size = \"wide\"").is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"indent_size": 8}"#).expect("json");
        assert_eq!(config.indent_size(), 8);
        assert_eq!(config.continuation_indent_size(), 8);
    }
}
