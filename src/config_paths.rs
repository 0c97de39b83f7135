//! Where cell-editor keeps its files
//!
//! Everything lives in one directory:
//! - Unix/macOS: `$XDG_CONFIG_HOME/cell-editor/` or `~/.config/cell-editor/`
//! - Windows: `%APPDATA%\cell-editor\`
//!
//! It holds `config.yaml` and the `logs/` directory.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "cell-editor";

/// The application directory, None when no home directory is known
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join(APP_DIR))
    }
}

/// Path of `config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// Create the log directory if needed and return it
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = config_dir()
        .ok_or_else(|| anyhow!("no config directory available"))?
        .join("logs");
    std::fs::create_dir_all(&logs)
        .with_context(|| format!("creating directory {}", logs.display()))?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_config_dir() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with(APP_DIR));
            assert_eq!(config_file(), Some(dir.join("config.yaml")));
        }
    }
}
