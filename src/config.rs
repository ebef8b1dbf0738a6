// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for linefill
//!
//! Loads configuration from .linefillrc.toml in current directory or ~/.config/linefill/config.toml

use serde::Deserialize;
use std::path::PathBuf;

use crate::document::IndentStyle;
use crate::rg;

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration loaded from .linefillrc.toml or ~/.config/linefill/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Search backend binary (default: rg on PATH)
    pub rg_binary: Option<String>,
    /// ripgrep file-type filters applied to every search
    pub file_types: Vec<String>,
    /// Leading-context window for block mode
    pub before_context: Option<u32>,
    /// Trailing-context window for block mode
    pub after_context: Option<u32>,
    /// Indent character for applied edits ("spaces" or "tabs"; default:
    /// detected from the document)
    pub indent_style: Option<String>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .linefillrc.toml in current directory
    /// 2. ~/.config/linefill/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(&PathBuf::from(".linefillrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("linefill").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format
            .as_ref()
            .and_then(|s| match s.to_lowercase().as_str() {
                "json" => Some(ConfigOutputFormat::Json),
                "text" => Some(ConfigOutputFormat::Text),
                _ => None,
            })
    }

    /// Indent override for applied edits, when configured
    pub fn indent_override(&self) -> Option<IndentStyle> {
        self.indent_style
            .as_ref()
            .and_then(|s| match s.to_lowercase().as_str() {
                "tabs" => Some(IndentStyle::Tabs),
                "spaces" => Some(IndentStyle::Spaces),
                _ => None,
            })
    }

    /// Merge CLI file-type filters with config (CLI wins when non-empty)
    pub fn merge_file_types(&self, cli_types: &[String]) -> Vec<String> {
        if cli_types.is_empty() {
            self.file_types.clone()
        } else {
            cli_types.to_vec()
        }
    }

    /// Block-mode leading-context window
    pub fn before_context(&self) -> u32 {
        self.before_context.unwrap_or(rg::WHOLE_FILE_BEFORE_CONTEXT)
    }

    /// Block-mode trailing-context window
    pub fn after_context(&self) -> u32 {
        self.after_context.unwrap_or(rg::BLOCK_AFTER_CONTEXT)
    }
}
