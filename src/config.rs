//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/cell-editor/config.yaml`

use crate::style::StyleOptions;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editing and wrapping preferences shared by all cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pixel width lines are soft-wrapped at
    pub wrap_width: f32,
    /// Soft-wrap text cells
    pub auto_wrap: bool,
    /// Soft-wrap code cells
    pub auto_wrap_code: bool,
    /// Indent new lines in code to their nesting depth
    pub auto_indent: bool,
    /// Insert closing brackets and quotes automatically
    pub match_parens: bool,
    /// Prefix an operator typed into an empty code cell with `%`
    pub insert_ans: bool,
    /// Keep the caret at the end of the indentation after a newline
    pub cursor_jump: bool,
    /// Code is Lisp: never append statement endings
    pub lisp_mode: bool,
    /// Maximum number of undo snapshots per cell
    pub history_limit: usize,
    /// Lines moved by Page Up / Page Down
    pub page_lines: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            wrap_width: 600.0,
            auto_wrap: true,
            auto_wrap_code: true,
            auto_indent: true,
            match_parens: true,
            insert_ans: false,
            cursor_jump: true,
            lisp_mode: false,
            history_limit: 1000,
            page_lines: 20,
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| anyhow!("No config directory available"))?;
        self.save_to(&path)
    }

    /// Write config to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Styling knobs derived from this config
    pub fn style_options(&self) -> StyleOptions {
        StyleOptions {
            wrap_width: self.wrap_width,
            auto_wrap: self.auto_wrap,
            auto_wrap_code: self.auto_wrap_code,
            first_line_only: false,
        }
    }
}
