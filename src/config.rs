//! Configuration file and settings resolution.
//!
//! Each setting is taken from the first source that provides it:
//! command-line flag, environment variable, `config.toml` in the config
//! directory, built-in default. Flags and environment variables are merged
//! by clap before they reach this module.

use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toolchain::{DEFAULT_DOWNLOAD_HOST, InstallerConfig};

/// File name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Contents of `config.toml`.
///
/// ```toml
/// cache_root = "~/.m2/repository"
/// download_host = "https://nodejs.org"
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub cache_root: Option<String>,

    #[serde(default)]
    pub download_host: Option<String>,
}

impl FileConfig {
    /// Load `config.toml` from the config directory, if there is one
    pub fn load() -> Result<Self> {
        let path = paths::config_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load a config file, returning defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }
}

/// Settings given on the command line (or through their environment variables).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub cache_root: Option<PathBuf>,
    pub download_host: Option<String>,
}

/// Build the installer configuration from overrides, file and defaults.
pub fn resolve(overrides: &Overrides, file: &FileConfig) -> Result<InstallerConfig> {
    let cache_root = match (&overrides.cache_root, &file.cache_root) {
        (Some(path), _) => paths::expand(&path.to_string_lossy()),
        (None, Some(path)) => paths::expand(path),
        (None, None) => paths::default_cache_root()?,
    };

    let download_host = overrides
        .download_host
        .clone()
        .or_else(|| file.download_host.clone())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_HOST.to_string());

    log::debug!(
        "Cache root: {}, download host: {download_host}",
        cache_root.display()
    );

    Ok(InstallerConfig::new(cache_root).download_host(download_host))
}
