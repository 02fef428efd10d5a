//! Path resolution for cdk-node
//!
//! # Environment Variables
//!
//! - `CDK_NODE_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `CDK_NODE_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/cdk-node` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\cdk-node`
//!    - macOS/Linux: `~/.config/cdk-node`
//!
//! For default_cache_root():
//! - The local Maven repository, `~/.m2/repository`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "CDK_NODE_CONFIG_DIR";

/// Directory name used under the platform config directory
const APP_DIR: &str = "cdk-node";

/// Get the cdk-node config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default cache root: the local Maven repository
pub fn default_cache_root() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".m2").join("repository"))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables leave the input unchanged.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run `f` with `key` set to `value`, restoring the previous value after.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: only this module's tests touch these variables
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: as above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/cdk-node/config", || {
            let result = config_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/cdk-node/config"));
        });
    }

    #[test]
    fn test_default_cache_root_is_maven_repository() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            default_cache_root().unwrap(),
            home.join(".m2").join("repository")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        assert_eq!(expand("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$CDK_NODE_NONEXISTENT_12345/file");
        assert_eq!(
            result,
            PathBuf::from("/path/$CDK_NODE_NONEXISTENT_12345/file")
        );
    }
}
