//! Configuration handling for autofmt-hook.
//!
//! This module provides configuration loading and validation, supporting an
//! `autofmt.toml` file and built-in defaults.

use crate::core::error::{Error, Result};
use crate::formatters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "autofmt.toml";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Formatters, in the order they run.
    pub formatters: Vec<FormatterConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formatters: formatters::builtin(),
        }
    }
}

impl Config {
    /// Loads configuration or returns defaults if not found.
    pub fn load_or_default() -> Result<Self> {
        match Self::find_config_file() {
            Ok(path) => Self::load_from(&path),
            Err(Error::ConfigNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read config", e))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config_parse_with_source("Failed to parse TOML", e))?;

        config.validate()?;

        Ok(config)
    }

    /// Finds the configuration file by searching up the directory tree.
    pub fn find_config_file() -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| Error::io("get current dir", e))?;
        Self::find_config_file_from(&cwd)
    }

    /// Finds the configuration file by searching up from `start`.
    pub fn find_config_file_from(start: &Path) -> Result<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::ConfigNotFound {
                path: start.join(CONFIG_FILE_NAME),
            })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for (i, formatter) in self.formatters.iter().enumerate() {
            let field = |name: &str| format!("formatters[{i}].{name}");

            if formatter.name.trim().is_empty() {
                return Err(Error::config_invalid(field("name"), "must not be empty"));
            }
            if !seen.insert(formatter.name.as_str()) {
                return Err(Error::config_invalid(
                    field("name"),
                    format!("duplicate formatter name '{}'", formatter.name),
                ));
            }

            if formatter.extensions.is_empty() {
                return Err(Error::config_invalid(
                    field("extensions"),
                    "at least one extension is required",
                ));
            }
            for ext in &formatter.extensions {
                let ext = ext.trim_start_matches('.');
                if ext.is_empty() || ext.contains(['/', '\\']) {
                    return Err(Error::config_invalid(
                        field("extensions"),
                        format!("invalid extension '{ext}'"),
                    ));
                }
            }

            validate_argv(&formatter.command, &field("command"))?;
            validate_argv(&formatter.probe, &field("probe"))?;
        }

        Ok(())
    }

    /// Renders the default configuration as TOML.
    pub fn default_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).map_err(|e| Error::Internal {
            message: format!("Failed to serialize config: {e}"),
        })
    }
}

fn validate_argv(argv: &[String], field: &str) -> Result<()> {
    match argv.first() {
        None => Err(Error::config_invalid(field, "must not be empty")),
        Some(program) if program.trim().is_empty() => {
            Err(Error::config_invalid(field, "program name must not be empty"))
        },
        Some(_) => Ok(()),
    }
}

/// Configuration for a single formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Unique formatter name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// File extensions (without the leading dot) that trigger this formatter.
    pub extensions: Vec<String>,
    /// Command run over the whole working tree, as an argument vector.
    pub command: Vec<String>,
    /// Command used by the installer to check the formatter is available.
    pub probe: Vec<String>,
    /// Lines printed when the probe fails.
    #[serde(default)]
    pub install_hint: Vec<String>,
}

impl FormatterConfig {
    /// Returns true if `path` has one of this formatter's extensions.
    ///
    /// Matching is exact and case-sensitive on the final suffix.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };

        self.extensions
            .iter()
            .any(|candidate| candidate.trim_start_matches('.') == ext)
    }

    /// Returns the command line as a display string.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
