//! Content-addressed [`Store`] backend on the host filesystem.
//!
//! Layout of a store directory:
//!
//! ```text
//! <root>/manifest.json          path → node map, see [`Tree`]
//! <root>/objects/<aa>/<digest>  file content, named by SHA-256
//! ```
//!
//! Objects are written before the manifest that references them, and the
//! manifest is replaced atomically (temp file + rename), so a crash never
//! leaves the manifest pointing at a missing object. Writes and object
//! garbage collection both run under the tree write lock.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::digest::ContentDigest;
use crate::error::{CoreError, CoreResult};
use crate::path::DsuPath;
use crate::store::tree::Tree;
use crate::store::{Entry, Store};

const MANIFEST_FILE: &str = "manifest.json";
const OBJECTS_DIR: &str = "objects";
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    nodes: Tree,
}

/// A DSU persisted as a directory of content-addressed objects.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    tree: RwLock<Tree>,
}

impl LocalStore {
    /// Opens an existing store directory.
    ///
    /// # Errors
    ///
    /// - [`CoreError::FileNotFound`] if `root` holds no manifest.
    /// - [`CoreError::Corrupt`] if the manifest cannot be parsed, has an
    ///   unknown version, or violates the tree invariants.
    pub async fn open(root: &Path) -> CoreResult<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        let raw = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| CoreError::from_host_io(e, &manifest_path))?;
        let manifest: Manifest = serde_json::from_str(&raw).map_err(|e| CoreError::Corrupt {
            what: "manifest",
            reason: e.to_string(),
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(CoreError::Corrupt {
                what: "manifest",
                reason: format!("unsupported version {}", manifest.version),
            });
        }
        if !manifest.nodes.is_consistent() {
            return Err(CoreError::Corrupt {
                what: "manifest",
                reason: "dangling or missing parent directories".to_string(),
            });
        }
        tracing::debug!(
            "opened local store at {} ({} nodes)",
            root.display(),
            manifest.nodes.len()
        );
        Ok(Self {
            root: root.to_path_buf(),
            tree: RwLock::new(manifest.nodes),
        })
    }

    /// Creates a new, empty store at `root`, or opens it if a manifest is
    /// already present.
    pub async fn open_or_create(root: &Path) -> CoreResult<Self> {
        if tokio::fs::try_exists(root.join(MANIFEST_FILE)).await? {
            return Self::open(root).await;
        }
        tokio::fs::create_dir_all(root.join(OBJECTS_DIR))
            .await
            .map_err(|e| CoreError::from_host_io(e, root))?;
        let store = Self {
            root: root.to_path_buf(),
            tree: RwLock::new(Tree::new()),
        };
        store.persist(&Tree::new()).await?;
        tracing::info!("created local store at {}", root.display());
        Ok(store)
    }

    /// Directory this store lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, digest: &ContentDigest) -> PathBuf {
        self.root
            .join(OBJECTS_DIR)
            .join(&digest.as_str()[..2])
            .join(digest.as_str())
    }

    async fn write_object(&self, digest: &ContentDigest, content: &[u8]) -> CoreResult<()> {
        let path = self.object_path(digest);
        if tokio::fs::try_exists(&path).await? {
            tracing::trace!("object {} already present", digest.short());
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn persist(&self, tree: &Tree) -> CoreResult<()> {
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            nodes: tree.clone(),
        };
        let json = serde_json::to_string_pretty(&manifest).map_err(|e| CoreError::Corrupt {
            what: "manifest",
            reason: e.to_string(),
        })?;
        let target = self.root.join(MANIFEST_FILE);
        let tmp = self.root.join(format!("{MANIFEST_FILE}.tmp"));
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &target).await?;
        Ok(())
    }

    /// Applies `change` to a copy of the tree, persists it, then publishes
    /// it. The returned guard keeps other mutations out until dropped.
    async fn mutate<F>(&self, change: F) -> CoreResult<RwLockWriteGuard<'_, Tree>>
    where
        F: FnOnce(&mut Tree) -> CoreResult<()> + Send,
    {
        let mut guard = self.tree.write().await;
        let mut next = guard.clone();
        change(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(guard)
    }

    /// Removes object files no longer referenced by the manifest. Returns
    /// how many were deleted.
    pub async fn collect_garbage(&self) -> CoreResult<usize> {
        let guard = self.tree.write().await;
        self.sweep_objects(&guard).await
    }

    /// Deletes objects not referenced by `tree`. Callers must hold the tree
    /// write lock so no write can add an object mid-sweep.
    async fn sweep_objects(&self, tree: &Tree) -> CoreResult<usize> {
        let live: std::collections::HashSet<&str> = tree
            .referenced_digests()
            .into_iter()
            .map(ContentDigest::as_str)
            .collect();

        let mut removed = 0;
        let mut shards = match tokio::fs::read_dir(self.root.join(OBJECTS_DIR)).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        while let Some(shard) = shards.next_entry().await? {
            let mut objects = tokio::fs::read_dir(shard.path()).await?;
            while let Some(object) = objects.next_entry().await? {
                let name = object.file_name().to_string_lossy().into_owned();
                if !live.contains(name.as_str()) {
                    tokio::fs::remove_file(object.path()).await?;
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            tracing::debug!("garbage-collected {removed} object(s)");
        }
        Ok(removed)
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn list_entries(&self, path: &DsuPath, recursive: bool) -> CoreResult<Vec<Entry>> {
        self.tree.read().await.list(path, recursive)
    }

    async fn read_file(&self, path: &DsuPath) -> CoreResult<Vec<u8>> {
        let guard = self.tree.read().await;
        let (digest, _) = guard.file(path)?;
        let object = self.object_path(digest);
        match tokio::fs::read(&object).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::MissingObject(digest.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, path: &DsuPath, content: &[u8]) -> CoreResult<()> {
        let digest = ContentDigest::of(content);
        let size = content.len() as u64;
        let mut guard = self.tree.write().await;
        let mut next = guard.clone();
        next.insert_file(path, digest.clone(), size)?;
        // Object before manifest, both under the lock a sweep also takes.
        self.write_object(&digest, content).await?;
        self.persist(&next).await?;
        *guard = next;
        Ok(())
    }

    async fn create_folder(&self, path: &DsuPath) -> CoreResult<()> {
        self.mutate(|tree| tree.create_dir(path)).await?;
        Ok(())
    }

    async fn delete(&self, path: &DsuPath) -> CoreResult<()> {
        let guard = self.mutate(|tree| tree.remove(path).map(|_| ())).await?;
        self.sweep_objects(&guard).await?;
        Ok(())
    }

    async fn stat(&self, path: &DsuPath) -> CoreResult<Entry> {
        self.tree.read().await.entry(path)
    }

    fn label(&self) -> String {
        format!("local store at {}", self.root.display())
    }
}
