//! Gate configuration - tag spellings and plugin identity
//!
//! Tag keys are built as `{tag_prefix}{index}{suffix}`, e.g. `EC1Switch`.
//! Each field accepts several suffixes; they are tried in order, so the
//! first spelling present in a note wins.
//!
//! # Example
//!
//! ```
//! use ecgate_core::{EffectIndex, GateConfig};
//!
//! let config = GateConfig::default();
//! let keys = config.switch_keys(EffectIndex(2));
//! assert_eq!(keys, vec!["EC2スイッチ".to_string(), "EC2Switch".to_string()]);
//! ```

use crate::{EffectIndex, Error, Result};
use serde::{Deserialize, Serialize};

/// Name reported in fatal script errors
pub const DEFAULT_PLUGIN_NAME: &str = "EffectConditions";

/// Configuration for [`EffectGate`](crate::EffectGate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Name reported in fatal script errors
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
    /// Prefix of every tag key
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    /// Suffixes of the switch field, in precedence order
    #[serde(default = "default_switch_tags")]
    pub switch_tags: Vec<String>,
    /// Suffixes of the condition field, in precedence order
    #[serde(default = "default_condition_tags")]
    pub condition_tags: Vec<String>,
}

fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}

fn default_tag_prefix() -> String {
    "EC".to_string()
}

fn default_switch_tags() -> Vec<String> {
    vec!["スイッチ".to_string(), "Switch".to_string()]
}

fn default_condition_tags() -> Vec<String> {
    vec!["条件".to_string(), "Cond".to_string()]
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            plugin_name: default_plugin_name(),
            tag_prefix: default_tag_prefix(),
            switch_tags: default_switch_tags(),
            condition_tags: default_condition_tags(),
        }
    }
}

impl GateConfig {
    /// Check that every field can produce at least one key
    pub fn validate(&self) -> Result<()> {
        if self.switch_tags.is_empty() {
            return Err(Error::InvalidConfig("switch_tags is empty".to_string()));
        }
        if self.condition_tags.is_empty() {
            return Err(Error::InvalidConfig("condition_tags is empty".to_string()));
        }
        if let Some(tag) = self
            .switch_tags
            .iter()
            .chain(&self.condition_tags)
            .find(|t| t.contains(['<', '>', ':']))
        {
            return Err(Error::InvalidConfig(format!(
                "tag suffix '{}' contains a reserved character",
                tag
            )));
        }
        Ok(())
    }

    /// Keys of the switch field for `index`, in precedence order
    pub fn switch_keys(&self, index: EffectIndex) -> Vec<String> {
        self.keys(index, &self.switch_tags)
    }

    /// Keys of the condition field for `index`, in precedence order
    pub fn condition_keys(&self, index: EffectIndex) -> Vec<String> {
        self.keys(index, &self.condition_tags)
    }

    fn keys(&self, index: EffectIndex, suffixes: &[String]) -> Vec<String> {
        suffixes
            .iter()
            .map(|suffix| format!("{}{}{}", self.tag_prefix, index, suffix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let config = GateConfig::default();
        assert_eq!(config.switch_keys(EffectIndex(1)), vec!["EC1スイッチ", "EC1Switch"]);
        assert_eq!(config.condition_keys(EffectIndex(3)), vec!["EC3条件", "EC3Cond"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: GateConfig = ron::from_str(r#"(tag_prefix: "Gate")"#).unwrap();
        assert_eq!(config.plugin_name, DEFAULT_PLUGIN_NAME);
        assert_eq!(config.switch_keys(EffectIndex(1))[1], "Gate1Switch");
    }

    #[test]
    fn test_validate_rejects_bad_tags() {
        let config = GateConfig {
            condition_tags: vec![],
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = GateConfig {
            switch_tags: vec!["Sw:".to_string()],
            ..GateConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
