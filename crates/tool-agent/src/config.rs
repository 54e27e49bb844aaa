//! User configuration for tool-agent
//!
//! Configuration file: ~/.config/tool-agent/config.toml (or platform equivalent)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration for the tool-agent CLI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Agent loop defaults
    #[serde(default)]
    pub agent: AgentSection,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolsSection,

    /// Aliases for models
    #[serde(default)]
    pub aliases: AliasConfig,
}

/// `[agent]` table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentSection {
    /// Iteration ceiling when `--max-iterations` is not given
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Suppress the console trace by default
    #[serde(default)]
    pub quiet: bool,
}

/// `[tools]` table
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsSection {
    /// Document corpus searched by `search_docs`
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
}

/// Model aliases
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AliasConfig {
    /// Model aliases (e.g., "small" -> "llama3.2:1b")
    #[serde(default)]
    pub models: HashMap<String, String>,
}

impl UserConfig {
    /// Load user configuration from default location
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the configuration file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tool-agent").join("config.toml"))
    }

    /// Resolve a model name (check aliases first)
    pub fn resolve_model(&self, name: &str) -> String {
        self.aliases
            .models
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.agent.quiet);
        assert!(config.agent.max_iterations.is_none());
        assert!(config.tools.docs_dir.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[agent]
max_iterations = 8
quiet = true

[tools]
docs_dir = "/srv/corpus"

[aliases.models]
small = "llama3.2:1b"
"#;

        let config: UserConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.agent.max_iterations, Some(8));
        assert!(config.agent.quiet);
        assert_eq!(config.tools.docs_dir, Some(PathBuf::from("/srv/corpus")));
        assert_eq!(config.resolve_model("small"), "llama3.2:1b");
        assert_eq!(config.resolve_model("mistral"), "mistral");
    }

    #[test]
    fn test_partial_config() {
        let config: UserConfig = toml::from_str("[tools]\n").unwrap();
        assert!(config.aliases.models.is_empty());
        assert!(!config.agent.quiet);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = TempDir::new().unwrap();
        let config = UserConfig::load_from(&tmp.path().join("config.toml")).unwrap();
        assert!(config.agent.max_iterations.is_none());
    }

    #[test]
    fn test_load_from_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[agent]\nmax_iterations = \"many\"\n").unwrap();
        let err = UserConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
