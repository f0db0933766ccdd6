use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Thresholds and switches for the matching engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum lexical score for a key to be accepted
    pub lexical_threshold: f32,
    /// Minimum semantic score for a key to be accepted
    pub semantic_threshold: f32,
    /// Lexical score at or above which the semantic matcher is skipped
    pub short_circuit: f32,
    /// Added to the semantic score when the declared field type agrees with the key
    pub type_bonus: f32,
    /// Whether the semantic fallback may be used at all
    pub semantic_enabled: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            lexical_threshold: 0.3,
            semantic_threshold: 0.5,
            short_circuit: 0.7,
            type_bonus: 0.15,
            semantic_enabled: true,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<()> {
        let bounded = [
            ("lexical_threshold", self.lexical_threshold),
            ("semantic_threshold", self.semantic_threshold),
            ("short_circuit", self.short_circuit),
            ("type_bonus", self.type_bonus),
        ];
        for (name, value) in bounded {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.lexical_threshold, 0.3);
        assert_eq!(config.semantic_threshold, 0.5);
        assert_eq!(config.short_circuit, 0.7);
        assert_eq!(config.type_bonus, 0.15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MatcherConfig = serde_json::from_str(r#"{"semantic_enabled": false}"#).unwrap();
        assert!(!config.semantic_enabled);
        assert_eq!(config.short_circuit, 0.7);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let config = MatcherConfig {
            semantic_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
