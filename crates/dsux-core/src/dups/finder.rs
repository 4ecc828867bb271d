//! Duplicate-file detection over a [`Store`].
//!
//! The scan enumerates every file under a root, reads and hashes each one
//! exactly once, in enumeration order, and groups paths by digest. Reads are
//! strictly sequential: the next file is not requested until the previous
//! one has been hashed, so group order is stable and the store sees at most
//! one outstanding read.
//!
//! # Example
//!
//! ```
//! use dsux_core::{find_duplicates, DsuPath, MemoryStore};
//!
//! # tokio_test_block_on(async {
//! let store = MemoryStore::from_files([
//!     ("/a", &b"hello"[..]),
//!     ("/b", &b"hello"[..]),
//!     ("/c", &b"world"[..]),
//! ])
//! .unwrap();
//!
//! let map = find_duplicates(&store, &DsuPath::root()).await.unwrap();
//! assert_eq!(map.duplicate_count(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use indexmap::IndexMap;

use crate::digest::ContentDigest;
use crate::error::CoreError;
use crate::path::DsuPath;
use crate::store::Store;

/// Errors that abort a duplicate scan. No partial result is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Listing the scan root failed.
    #[error("failed to enumerate {path}: {source}")]
    Enumeration {
        path: DsuPath,
        #[source]
        source: CoreError,
    },

    /// Reading a specific file's content failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: DsuPath,
        #[source]
        source: CoreError,
    },
}

impl ScanError {
    /// The path the failing store call was made for.
    pub fn path(&self) -> &DsuPath {
        match self {
            Self::Enumeration { path, .. } | Self::Read { path, .. } => path,
        }
    }
}

/// Digest → paths, in first-seen order at both levels.
///
/// Holds every scanned file, including those whose content is unique;
/// [`DuplicateMap::duplicates`] filters for real duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateMap {
    groups: IndexMap<ContentDigest, Vec<DsuPath>>,
    bytes: IndexMap<ContentDigest, u64>,
}

impl DuplicateMap {
    fn insert(&mut self, digest: ContentDigest, path: DsuPath, size: u64) {
        self.bytes.entry(digest.clone()).or_insert(size);
        self.groups.entry(digest).or_default().push(path);
    }

    /// All groups, singletons included.
    pub fn groups(&self) -> impl Iterator<Item = (&ContentDigest, &[DsuPath])> {
        self.groups.iter().map(|(d, paths)| (d, paths.as_slice()))
    }

    /// Groups with two or more members.
    pub fn duplicates(&self) -> impl Iterator<Item = (&ContentDigest, &[DsuPath])> {
        self.groups().filter(|(_, paths)| paths.len() >= 2)
    }

    /// Paths sharing `digest`, if any file had it.
    pub fn get(&self, digest: &ContentDigest) -> Option<&[DsuPath]> {
        self.groups.get(digest).map(Vec::as_slice)
    }

    /// The digest whose group contains `path`.
    pub fn group_of(&self, path: &DsuPath) -> Option<&ContentDigest> {
        self.groups
            .iter()
            .find(|(_, paths)| paths.contains(path))
            .map(|(digest, _)| digest)
    }

    /// Content size in bytes for the files behind `digest`.
    pub fn size_of(&self, digest: &ContentDigest) -> Option<u64> {
        self.bytes.get(digest).copied()
    }

    /// Number of distinct digests.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when no file was scanned.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of files scanned.
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Number of groups with two or more members.
    pub fn duplicate_count(&self) -> usize {
        self.duplicates().count()
    }

    /// Files that could be removed while keeping one copy of each content.
    pub fn redundant_files(&self) -> usize {
        self.duplicates().map(|(_, paths)| paths.len() - 1).sum()
    }

    /// Bytes occupied by redundant copies.
    pub fn wasted_bytes(&self) -> u64 {
        self.duplicates()
            .map(|(digest, paths)| {
                self.size_of(digest).unwrap_or(0) * (paths.len() as u64 - 1)
            })
            .sum()
    }
}

/// Groups every file under `root` by content digest.
///
/// Directories are never hashed. Each file is read once; files are visited
/// in the store's enumeration order.
///
/// # Errors
///
/// - [`ScanError::Enumeration`] if `root` cannot be listed (missing, not a
///   directory, backend failure).
/// - [`ScanError::Read`] for the first file whose content cannot be read.
pub async fn find_duplicates<S>(store: &S, root: &DsuPath) -> Result<DuplicateMap, ScanError>
where
    S: Store + ?Sized,
{
    let entries = store
        .list_entries(root, true)
        .await
        .map_err(|source| ScanError::Enumeration {
            path: root.clone(),
            source,
        })?;

    let files: Vec<_> = entries.into_iter().filter(|e| e.is_file()).collect();
    tracing::info!("scanning {} file(s) under {root}", files.len());

    let mut map = DuplicateMap::default();
    for (idx, entry) in files.into_iter().enumerate() {
        let path = entry.path().clone();
        let content = store
            .read_file(&path)
            .await
            .map_err(|source| ScanError::Read {
                path: path.clone(),
                source,
            })?;
        let digest = ContentDigest::of(&content);
        tracing::trace!("[{}] {} {}", idx + 1, digest.short(), path);
        map.insert(digest, path, content.len() as u64);
    }

    tracing::debug!(
        "scan of {root} done: {} file(s), {} duplicate group(s)",
        map.file_count(),
        map.duplicate_count()
    );
    Ok(map)
}
