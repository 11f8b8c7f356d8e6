use serde::{Deserialize, Serialize};

/// Configuration for outline parsing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// How many sibling positions ahead a heading may jump (per level)
    pub lookahead: usize,

    /// Drop form feed characters before scanning lines
    pub strip_form_feeds: bool,

    /// Regex patterns removed from plain text before scanning.
    /// `.` also matches newlines so a pattern can span a page break.
    pub strip_patterns: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookahead: 3,
            strip_form_feeds: true,
            strip_patterns: vec![],
        }
    }
}

impl ParserConfig {
    /// Builder: add a cleanup pattern
    #[must_use]
    pub fn with_strip_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.strip_patterns.push(pattern.into());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lookahead == 0 {
            return Err("lookahead must be > 0".to_string());
        }
        if self.strip_patterns.iter().any(|p| p.is_empty()) {
            return Err("strip_patterns must not contain empty patterns".to_string());
        }
        Ok(())
    }
}

/// Configuration for body text normalization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizerConfig {
    /// A bare number is a footnote only if it is at most this far above the last one
    pub max_footnote_jump: u32,

    /// How many lines above a footnote definition are searched for its reference
    pub footnote_lookback_lines: usize,

    /// Upper-case lines shorter than this (in characters) are emphasized as titles
    pub max_title_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_footnote_jump: 10,
            footnote_lookback_lines: 80,
            max_title_len: 50,
        }
    }
}

impl NormalizerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_footnote_jump == 0 {
            return Err("max_footnote_jump must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_valid() {
        assert!(ParserConfig::default().validate().is_ok());
        assert!(NormalizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = ParserConfig {
            lookahead: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ParserConfig::default().with_strip_pattern("");
        assert!(config.validate().is_err());

        let config = NormalizerConfig {
            max_footnote_jump: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{"strip_patterns": ["RIN .*?document\\."]}"#).unwrap();
        assert_eq!(config.lookahead, 3);
        assert!(config.strip_form_feeds);
        assert_eq!(config.strip_patterns.len(), 1);
    }
}
