//! Application configuration loaded from a TOML file.
//!
//! Every field has a default, so dsux runs without a config file:
//!
//! ```toml
//! [shell]
//! prompt_suffix = "Enter a command: "
//! history_limit = 100
//!
//! [scan]
//! timeout_secs = 0        # 0 disables the limit
//! show_singletons = false
//!
//! [store]
//! # data_dir = "/var/lib/dsux"
//! # registry_path = "/var/lib/dsux/dsu_s.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::nav::history::DEFAULT_HISTORY_LIMIT;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::FileNotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_host_io(e, path))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load(path) {
            Err(CoreError::FileNotFound(_)) => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// REPL behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Text printed after `[<cwd>] ` in the prompt.
    #[serde(default = "default_prompt_suffix")]
    pub prompt_suffix: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt_suffix: default_prompt_suffix(),
            history_limit: default_history_limit(),
        }
    }
}

/// Duplicate scan settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub show_singletons: bool,
}

impl ScanConfig {
    /// Scan time limit, or `None` when unlimited.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Where stores and the DSU registry live on the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub registry_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Directory new local stores are created under.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| config_dir().join("dsus"))
    }

    /// Location of the DSU registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| config_dir().join("dsu_s.json"))
    }
}

/// Returns `$HOME/.config/dsux` (or `/.config/dsux` without `$HOME`).
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".config")
        .join("dsux")
}

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_prompt_suffix() -> String {
    "Enter a command: ".to_string()
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
