//! Configuration file support for the allowlist tooling.
//!
//! This module provides configuration file loading from TOML format,
//! allowing the command-line tools to share limits and default paths.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_MAX_CSV_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_DUMP_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Configuration for the allowlist command-line tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub allowlist: AllowlistConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowlistConfig {
    #[serde(default = "default_max_csv_file_size")]
    pub max_file_size: u64,
    /// Merge duplicate addresses by default when building a commitment.
    #[serde(default = "default_deduplicate")]
    pub deduplicate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_max_dump_file_size")]
    pub max_dump_size: u64,
    #[serde(default = "default_tree_output_file")]
    pub output_file: PathBuf,
}

impl Default for AllowlistConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_CSV_FILE_SIZE,
            deduplicate: true,
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_dump_size: DEFAULT_MAX_DUMP_FILE_SIZE,
            output_file: PathBuf::from("allowlist-tree.json"),
        }
    }
}

fn default_max_csv_file_size() -> u64 {
    DEFAULT_MAX_CSV_FILE_SIZE
}

fn default_deduplicate() -> bool {
    true
}

fn default_max_dump_file_size() -> u64 {
    DEFAULT_MAX_DUMP_FILE_SIZE
}

fn default_tree_output_file() -> PathBuf {
    PathBuf::from("allowlist-tree.json")
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn load_from_file_or_default(path: &PathBuf) -> Self {
        Self::load_from_file(path).unwrap_or_default()
    }

    pub fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
