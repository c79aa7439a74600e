/*!
# Confirmation Engine Configuration

TOML-backed configuration for the confirmation engine: per-category enable
flags and the DAO guard-search depth bound.
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::Category;

/// Configuration for a confirmation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineConfig {
    /// Depth bound for the DAO checker's state-assignment search
    #[serde(default = "default_max_guard_depth")]
    pub max_guard_depth: usize,

    /// Per-category enable flags; a missing entry means enabled
    #[serde(default)]
    pub categories: BTreeMap<Category, bool>,
}

fn default_max_guard_depth() -> usize {
    4
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_guard_depth: default_max_guard_depth(),
            categories: BTreeMap::new(),
        }
    }
}

impl RefineConfig {
    /// Loads configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse refine configuration")
    }

    /// True unless the category was explicitly disabled
    pub fn is_enabled(&self, category: Category) -> bool {
        self.categories.get(&category).copied().unwrap_or(true)
    }
}
