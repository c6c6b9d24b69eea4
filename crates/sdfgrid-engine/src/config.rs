//! Engine configuration
//!
//! Stored as JSON. A missing file means defaults; a file that exists but does not
//! parse is an error.

use anyhow::{Context, Result};
use sdfgrid_core::config::ContextConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Limits and backend selection for every kernel the session dispatches
    pub context: ContextConfig,
    /// Voxels at or below this distance count toward an intersection
    pub intersection_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context: ContextConfig::default(),
            intersection_threshold: 0.0,
        }
    }
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sdfgrid-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = EngineConfig::load(&scratch("does-not-exist.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = scratch("partial.json");
        fs::write(&path, r#"{ "context": { "parallel": false }, "intersection_threshold": 0.25 }"#)
            .unwrap();
        let config = EngineConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(!config.context.parallel);
        assert_eq!(config.context.block_size, 8);
        assert_eq!(config.intersection_threshold, 0.25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = scratch("malformed.json");
        fs::write(&path, "{ not json").unwrap();
        let result = EngineConfig::load(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn save_then_load() {
        let path = scratch("saved.json");
        let config = EngineConfig {
            context: ContextConfig::default().with_max_voxels(1000),
            intersection_threshold: -0.1,
        };
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
