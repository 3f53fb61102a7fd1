//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.xdispatch/config.toml` - User-wide defaults
//! - Project: `.xdispatch/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line
//! `-o`/`-s` arguments take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::{RecipeError, RecipeResult};
use crate::core::options::{OptionSet, OptionValue};
use crate::core::platform::PlatformDescriptor;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A config file that exists but cannot be read or parsed.
#[derive(Debug, Error)]
#[error("failed to {action} config file {}", path.display())]
pub struct ConfigFileError {
    pub path: PathBuf,
    pub action: &'static str,
    pub message: String,
}

impl ConfigFileError {
    /// Convert to a diagnostic pointing at the file.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(format!("failed to {} config file", self.action))
            .with_location(&self.path)
            .with_context(self.message.trim_end())
            .with_suggestion(suggestions::CHECK_CONFIG)
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package version passed to the build (falls back to `0.0+dev`)
    pub version: Option<String>,

    /// Option assignments, e.g. `backend_primary = true`
    pub options: BTreeMap<String, toml::Value>,

    /// Platform settings
    pub settings: SettingsConfig,
}

/// Platform settings, kept as raw strings until applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Operating system (Linux, Macos, Windows, iOS, Android, FreeBSD)
    pub os: Option<String>,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    pub compiler: Option<String>,

    /// CPU architecture (x86_64, armv8)
    pub arch: Option<String>,

    /// Debug, Release, RelWithDebInfo or MinSizeRel
    pub build_type: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigFileError {
            path: path.to_path_buf(),
            action: "read",
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| ConfigFileError {
            path: path.to_path_buf(),
            action: "parse",
            message: e.to_string(),
        })
    }

    /// Load configuration, or defaults if the file doesn't exist.
    ///
    /// A file that exists but is broken is an error, never a fallback.
    pub fn load_if_exists(path: &Path) -> Result<Self, ConfigFileError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.version.is_some() {
            self.version = other.version;
        }

        self.options.extend(other.options);

        if other.settings.os.is_some() {
            self.settings.os = other.settings.os;
        }
        if other.settings.compiler.is_some() {
            self.settings.compiler = other.settings.compiler;
        }
        if other.settings.arch.is_some() {
            self.settings.arch = other.settings.arch;
        }
        if other.settings.build_type.is_some() {
            self.settings.build_type = other.settings.build_type;
        }
    }

    /// Overlay the configured options onto `base`.
    ///
    /// Only the value literals are checked here; names and domains are
    /// checked by the resolvers.
    pub fn apply_options(&self, base: &mut OptionSet) -> RecipeResult<()> {
        for (name, value) in &self.options {
            let value = match value {
                toml::Value::Boolean(b) => OptionValue::from(*b),
                toml::Value::String(s) => OptionValue::parse(name, s)?,
                other => {
                    return Err(RecipeError::configuration(
                        name.as_str(),
                        format!("expected a boolean or string, found {}", other.type_str()),
                    ))
                }
            };
            base.set(name.as_str(), value);
        }
        Ok(())
    }

    /// Overlay the configured settings onto `platform`.
    pub fn apply_settings(&self, platform: &mut PlatformDescriptor) -> RecipeResult<()> {
        let fields = [
            ("os", &self.settings.os),
            ("compiler", &self.settings.compiler),
            ("arch", &self.settings.arch),
            ("build_type", &self.settings.build_type),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                platform.set(field, value)?;
            }
        }
        Ok(())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xdispatch/config.toml)
/// 2. Global config (~/.xdispatch/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::load_if_exists(global_path)
        .context("failed to load global configuration")?;

    let project = Config::load_if_exists(project_path)
        .context("failed to load project configuration")?;
    config.merge(project);

    tracing::debug!(
        global = %global_path.display(),
        project = %project_path.display(),
        "loaded configuration"
    );

    Ok(config)
}

/// Get the global config directory (~/.xdispatch).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".xdispatch"))
}

/// Get the global config path (~/.xdispatch/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.xdispatch/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xdispatch").join("config.toml")
}
