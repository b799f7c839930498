//! lexenv_options: lexenv.json parsing and environment options.
//!
//! Parses project files and provides the `EnvOptions` structure that
//! configures the scope stack a replay session builds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest slot limit a scope can be configured with.
pub const MAX_SLOTS_PER_SCOPE: u32 = u16::MAX as u32;

/// Environment options, matching the `envOptions` object of lexenv.json.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvOptions {
    /// Report a warning when a program re-declares a global binding with a
    /// different type or modifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_redeclaration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_slots_per_scope: Option<u32>,
    /// Treat the outermost scope of a chain as a function boundary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_is_boundary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reuse_scopes: Option<bool>,
    /// Host-provided globals: name to native class name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_bindings: Option<BTreeMap<String, String>>,
}

impl EnvOptions {
    pub fn is_strict(&self) -> bool {
        self.strict_redeclaration.unwrap_or(false)
    }

    /// Per-scope slot limit, clamped to [`MAX_SLOTS_PER_SCOPE`].
    pub fn slot_limit(&self) -> usize {
        self.max_slots_per_scope
            .unwrap_or(MAX_SLOTS_PER_SCOPE)
            .min(MAX_SLOTS_PER_SCOPE) as usize
    }

    pub fn root_boundary(&self) -> bool {
        self.root_is_boundary.unwrap_or(false)
    }

    pub fn reuse_enabled(&self) -> bool {
        self.reuse_scopes.unwrap_or(true)
    }

    /// Seed bindings in name order.
    pub fn seeds(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.seed_bindings
            .iter()
            .flatten()
            .map(|(name, class)| (name.as_str(), class.as_str()))
    }

    pub fn has_seeds(&self) -> bool {
        self.seed_bindings.as_ref().map_or(false, |seeds| !seeds.is_empty())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slots_per_scope == Some(0) {
            return Err(ConfigError::Invalid(
                "maxSlotsPerScope must be at least 1".to_string(),
            ));
        }
        for (name, class) in self.seeds() {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "seed binding name '{}' is not an identifier",
                    name
                )));
            }
            if class.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "seed binding '{}' has no native class",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// The lexenv.json file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_options: Option<EnvOptions>,
    /// Trace files to replay, relative to the project file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

impl ProjectConfig {
    /// The configuration written by `lexenv --init`.
    pub fn starter() -> Self {
        let mut seeds = BTreeMap::new();
        seeds.insert("out".to_string(), "java.io.PrintStream".to_string());
        seeds.insert("args".to_string(), "java.lang.String[]".to_string());
        Self {
            env_options: Some(EnvOptions {
                strict_redeclaration: Some(false),
                max_slots_per_scope: Some(MAX_SLOTS_PER_SCOPE),
                root_is_boundary: Some(false),
                reuse_scopes: Some(true),
                seed_bindings: Some(seeds),
            }),
            files: Some(vec!["main.trace".to_string()]),
        }
    }

    pub fn options(&self) -> EnvOptions {
        self.env_options.clone().unwrap_or_default()
    }

    /// Listed files resolved against `base`.
    pub fn resolved_files(&self, base: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .flatten()
            .map(|file| base.join(file))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Failure to load a project file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid option: {0}")]
    Invalid(String),
}

/// Parse a lexenv.json file from a string.
pub fn parse_options(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig = serde_json::from_str(content)?;
    if let Some(options) = &config.env_options {
        options.validate()?;
    }
    Ok(config)
}

/// Parse a lexenv.json file from a path.
pub fn parse_options_file(path: impl AsRef<Path>) -> Result<ProjectConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EnvOptions::default();
        assert!(!options.is_strict());
        assert!(!options.root_boundary());
        assert!(options.reuse_enabled());
        assert_eq!(options.slot_limit(), 65535);
        assert_eq!(options.seeds().count(), 0);
    }

    #[test]
    fn test_slot_limit_clamped() {
        let options = EnvOptions {
            max_slots_per_scope: Some(1_000_000),
            ..EnvOptions::default()
        };
        assert_eq!(options.slot_limit(), 65535);
    }

    #[test]
    fn test_starter_round_trips() {
        let starter = ProjectConfig::starter();
        let parsed = parse_options(&starter.to_json().unwrap()).unwrap();
        assert_eq!(parsed, starter);
    }
}
