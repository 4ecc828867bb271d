//! Error types for `dsux-core`.
//!
//! Store, path, configuration and registry operations return
//! [`CoreResult<T>`], an alias for `Result<T, CoreError>`. The duplicate
//! finder wraps these in its own [`crate::dups::ScanError`].

use std::path::PathBuf;

/// Unified error type for all core operations.
///
/// Virtual paths inside a DSU are carried as strings; host filesystem paths
/// (config files, registry, store directories) as [`PathBuf`].
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist in the store.
    #[error("path not found: {0}")]
    NotFound(String),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A file was expected but the path points to a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// The path already exists with an incompatible kind.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The path cannot be used for this operation (e.g. deleting `/`).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A host file is missing (config, registry, store directory).
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The process lacks permission to access a host file.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A persisted JSON document (manifest, registry) is malformed.
    #[error("corrupt {what}: {reason}")]
    Corrupt {
        /// Which document was being read.
        what: &'static str,
        /// Parser message.
        reason: String,
    },

    /// A referenced content object is missing from the backend.
    #[error("missing object {0}")]
    MissingObject(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps an I/O error on a host path to the most specific variant.
    pub(crate) fn from_host_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(err),
        }
    }
}

/// Convenience alias used throughout `dsux-core`.
pub type CoreResult<T> = Result<T, CoreError>;
