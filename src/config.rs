use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{RefmarkError, Result};
use crate::types::ReferenceKind;

/// Name of the configuration file stored inside the `.refmark` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory used to store refmark metadata.
pub const REFMARK_DIR: &str = ".refmark";

/// Configuration for a refmark workspace.
///
/// Controls which reference kinds are resolved. Kinds missing from
/// `enabled_kinds` behave exactly like unregistered reference types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefmarkConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Root directory of the workspace.
    pub root_dir: String,
    /// Type tags of the reference kinds the registry activates.
    pub enabled_kinds: Vec<String>,
}

impl Default for RefmarkConfig {
    fn default() -> Self {
        Self {
            version: 1,
            root_dir: String::new(),
            enabled_kinds: ReferenceKind::ALL
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }
}

impl RefmarkConfig {
    /// Returns `true` if the given kind is enabled in this configuration.
    pub fn kind_enabled(&self, kind: ReferenceKind) -> bool {
        self.enabled_kinds.iter().any(|k| k == kind.as_str())
    }
}

/// Returns the path to the `.refmark` directory within the given workspace root.
pub fn get_refmark_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(REFMARK_DIR)
}

/// Returns the path to the configuration file (`config.json`) within the `.refmark` directory.
pub fn get_config_path(workspace_root: &Path) -> PathBuf {
    get_refmark_dir(workspace_root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// If the configuration file does not exist, returns a default configuration
/// with `root_dir` set to the given workspace root.
pub fn load_config(workspace_root: &Path) -> Result<RefmarkConfig> {
    let config_path = get_config_path(workspace_root);

    if !config_path.exists() {
        return Ok(RefmarkConfig {
            root_dir: workspace_root.to_string_lossy().to_string(),
            ..RefmarkConfig::default()
        });
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| RefmarkError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: RefmarkConfig =
        serde_json::from_str(&contents).map_err(|e| RefmarkError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it to the final location,
/// ensuring that a partial write never corrupts the configuration.
pub fn save_config(workspace_root: &Path, config: &RefmarkConfig) -> Result<()> {
    let refmark_dir = get_refmark_dir(workspace_root);
    fs::create_dir_all(&refmark_dir).map_err(|e| RefmarkError::Config {
        message: format!(
            "failed to create refmark directory '{}': {}",
            refmark_dir.display(),
            e
        ),
    })?;

    let config_path = get_config_path(workspace_root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| RefmarkError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| RefmarkError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path).map_err(|e| RefmarkError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}
