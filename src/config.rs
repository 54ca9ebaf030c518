//! Checker configuration.
//!
//! Read from the `[tool.depscope]` table of `pyproject.toml` when present;
//! every field has a default so projects without a table get the stock
//! behavior. Ignore entries naming modules or packages absent from the
//! project are silently inert.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::dependencies::normalize_package_name;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The `[tool.depscope]` table is not valid TOML for this schema.
    #[error("Invalid [tool.depscope] configuration: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Per-rule ignore lists and scan options.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Module names never reported as missing (DEP001).
    pub ignore_missing: BTreeSet<String>,
    /// Package names never reported as unused (DEP002).
    pub ignore_unused: BTreeSet<String>,
    /// Package names never reported as transitive (DEP003).
    pub ignore_transitive: BTreeSet<String>,
    /// Package names never reported as misplaced dev dependencies (DEP004).
    pub ignore_misplaced_dev: BTreeSet<String>,
    /// Replaces the default exclude patterns when non-empty.
    pub exclude: Vec<String>,
    /// Extra exclude patterns on top of the defaults.
    pub extend_exclude: Vec<String>,
    /// Skip `.ipynb` files entirely.
    pub ignore_notebooks: bool,
    /// Extra first-party module names discovery cannot infer.
    pub known_first_party: Vec<String>,
    /// Target runtime version for standard-library membership, e.g. "3.11".
    pub python_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ToolTable {
    tool: Option<ToolSection>,
}

#[derive(Debug, Deserialize)]
struct ToolSection {
    depscope: Option<Config>,
}

impl Config {
    /// Loads configuration from a pyproject file's `[tool.depscope]`
    /// table. A missing file or missing table yields the defaults.
    pub fn from_pyproject(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_pyproject_str(&content)
    }

    /// Parses configuration from pyproject content.
    pub fn from_pyproject_str(content: &str) -> Result<Self, ConfigError> {
        let table: ToolTable = toml::from_str(content)?;
        let mut config = table
            .tool
            .and_then(|tool| tool.depscope)
            .unwrap_or_default();
        config.normalize_package_lists();
        Ok(config)
    }

    /// Package-keyed ignore lists compare normalized, so users may write
    /// names with any separator style.
    fn normalize_package_lists(&mut self) {
        for list in [
            &mut self.ignore_unused,
            &mut self.ignore_transitive,
            &mut self.ignore_misplaced_dev,
        ] {
            *list = list.iter().map(|p| normalize_package_name(p)).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_table() {
        let config = Config::from_pyproject_str("[project]\nname = \"demo\"\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_full_table() {
        let config = Config::from_pyproject_str(
            r#"
[tool.depscope]
ignore_missing = ["cv2"]
ignore_unused = ["Typing_Extensions"]
ignore_notebooks = true
extend_exclude = ["scripts"]
known_first_party = ["mytool"]
python_version = "3.11"
"#,
        )
        .unwrap();

        assert!(config.ignore_missing.contains("cv2"));
        // package lists are normalized on load
        assert!(config.ignore_unused.contains("typing-extensions"));
        assert!(config.ignore_notebooks);
        assert_eq!(config.extend_exclude, vec!["scripts"]);
        assert_eq!(config.python_version.as_deref(), Some("3.11"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::from_pyproject(Path::new("/nonexistent/pyproject.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_schema() {
        let result = Config::from_pyproject_str("[tool.depscope]\nignore_missing = \"oops\"\n");
        assert!(result.is_err());
    }
}
