//! The storage capability the shell and the duplicate finder run against.
//!
//! [`Store`] is the seam between the UI-agnostic logic in this crate and
//! whatever actually holds the bytes. Two backends ship here:
//!
//! - [`MemoryStore`] — in-process, used by tests and `--ephemeral` sessions.
//! - [`LocalStore`] — a content-addressed directory on the host filesystem.
//!
//! Both share the namespace rules implemented by [`tree::Tree`].

pub mod local;
pub mod memory;
pub mod tree;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::path::DsuPath;

pub use local::LocalStore;
pub use memory::MemoryStore;

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A single file or directory record returned by enumeration.
///
/// Directory sizes are always `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: DsuPath,
    kind: EntryKind,
    size: u64,
}

impl Entry {
    /// Creates a file entry of `size` bytes.
    pub fn file(path: DsuPath, size: u64) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            size,
        }
    }

    /// Creates a directory entry.
    pub fn directory(path: DsuPath) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &DsuPath {
        &self.path
    }

    /// Returns the last path segment.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns `true` if this entry is a file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Returns the file size in bytes. Always `0` for directories.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Hierarchical file/directory storage.
///
/// All paths are absolute [`DsuPath`]s. Implementations must enumerate in a
/// deterministic order so that duplicate scans are reproducible.
///
/// # Errors
///
/// Operations report [`crate::CoreError::NotFound`] for missing paths,
/// [`crate::CoreError::NotADirectory`] / [`crate::CoreError::IsADirectory`]
/// for kind mismatches, and [`crate::CoreError::Io`] for backend failures.
#[async_trait]
pub trait Store: Send + Sync {
    /// Lists the entries under the directory at `path`, excluding `path`
    /// itself. With `recursive`, all descendants are returned.
    async fn list_entries(&self, path: &DsuPath, recursive: bool) -> CoreResult<Vec<Entry>>;

    /// Reads the full content of the file at `path`.
    async fn read_file(&self, path: &DsuPath) -> CoreResult<Vec<u8>>;

    /// Creates or replaces the file at `path`, creating missing parents.
    async fn write_file(&self, path: &DsuPath, content: &[u8]) -> CoreResult<()>;

    /// Creates the directory at `path` and any missing parents. Succeeds if
    /// the directory already exists.
    async fn create_folder(&self, path: &DsuPath) -> CoreResult<()>;

    /// Deletes the file or directory at `path`, recursively.
    async fn delete(&self, path: &DsuPath) -> CoreResult<()>;

    /// Returns the entry at `path`.
    async fn stat(&self, path: &DsuPath) -> CoreResult<Entry>;

    /// Short human-readable description of the backend.
    fn label(&self) -> String;
}
