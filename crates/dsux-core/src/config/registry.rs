//! Registry of known DSUs, persisted as JSON.
//!
//! The file looks like:
//!
//! ```json
//! { "dsus": [ { "key": "dsu:local:…", "name": "default", "type": "local",
//!               "location": "/home/me/.config/dsux/dsus/default" } ] }
//! ```
//!
//! The shell opens the first entry, or creates and records a default DSU
//! when the registry is empty.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Backend type recorded for stores created by this tool.
pub const LOCAL_KIND: &str = "local";

/// One known DSU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub location: Option<PathBuf>,
}

impl RegistryEntry {
    /// Describes a fresh local store named `name` under `data_dir`, with a
    /// newly generated key.
    pub fn new_local(name: &str, data_dir: &Path) -> Self {
        Self {
            key: format!("dsu:{LOCAL_KIND}:{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            kind: LOCAL_KIND.to_string(),
            location: Some(data_dir.join(name)),
        }
    }
}

/// The persisted list of DSUs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub dsus: Vec<RegistryEntry>,
}

impl Registry {
    /// Loads the registry at `path`. A missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// [`CoreError::Corrupt`] if the file is not valid registry JSON, or an
    /// I/O variant if it cannot be read.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CoreError::from_host_io(e, path)),
        };
        serde_json::from_str(&raw).map_err(|e| CoreError::Corrupt {
            what: "registry",
            reason: e.to_string(),
        })
    }

    /// Writes the registry to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::from_host_io(e, parent))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| CoreError::Corrupt {
            what: "registry",
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| CoreError::from_host_io(e, path))
    }

    /// Returns a new registry with `entry` appended.
    pub fn with_entry(&self, entry: RegistryEntry) -> Self {
        let mut dsus = self.dsus.clone();
        dsus.push(entry);
        Self { dsus }
    }

    /// The DSU opened by default.
    pub fn first(&self) -> Option<&RegistryEntry> {
        self.dsus.first()
    }

    pub fn is_empty(&self) -> bool {
        self.dsus.is_empty()
    }
}
