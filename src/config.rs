//! Configuration loaded from `~/.salesboard/config.json`.
//!
//! Everything has a built-in default so the app runs without a config file
//! (in-memory demo store, the shipped target table). A file overrides only
//! what it sets.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::SalesTargets;

const DEFAULT_COLLECTION: &str = "customers";
const DEFAULT_POLL_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    /// Per-salesperson targets, in display order.
    #[serde(default = "SalesTargets::default_table")]
    pub targets: SalesTargets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            targets: SalesTargets::default_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Firestore project id. When absent the app runs against the
    /// in-memory demo store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// API key appended to REST calls. Test-mode projects can omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Seconds between change-feed poll cycles.
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            collection: DEFAULT_COLLECTION.to_string(),
            api_key: None,
            poll_interval_secs: DEFAULT_POLL_SECS,
        }
    }
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_poll_secs() -> u64 {
    DEFAULT_POLL_SECS
}

/// Canonical config file path (`~/.salesboard/config.json`).
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".salesboard").join("config.json"))
}

/// Load configuration, falling back to defaults when the file is absent.
/// A present-but-unparseable file is an error, not a silent default.
pub fn load_config() -> Result<Config, String> {
    let path = config_path()?;
    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}
