//! In-process [`Store`] backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::digest::ContentDigest;
use crate::error::{CoreError, CoreResult};
use crate::path::DsuPath;
use crate::store::tree::Tree;
use crate::store::{Entry, Store};

#[derive(Debug, Default)]
struct MemoryState {
    tree: Tree,
    blobs: HashMap<ContentDigest, Arc<[u8]>>,
}

/// A store that lives entirely in memory and vanishes with the process.
///
/// Content is deduplicated by digest, like [`crate::LocalStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store holding only `/`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `files`, in order.
    ///
    /// # Errors
    ///
    /// Fails on the same conditions as [`Store::write_file`].
    pub fn from_files<'a, I>(files: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut state = MemoryState::default();
        for (path, content) in files {
            let path = DsuPath::new(path)?;
            state.put(&path, content)?;
        }
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Number of distinct content blobs held.
    pub async fn blob_count(&self) -> usize {
        self.state.read().await.blobs.len()
    }
}

impl MemoryState {
    fn put(&mut self, path: &DsuPath, content: &[u8]) -> CoreResult<()> {
        let digest = ContentDigest::of(content);
        self.tree
            .insert_file(path, digest.clone(), content.len() as u64)?;
        self.blobs
            .entry(digest)
            .or_insert_with(|| Arc::from(content));
        Ok(())
    }

    fn collect_garbage(&mut self) {
        let live: std::collections::HashSet<ContentDigest> =
            self.tree.referenced_digests().into_iter().cloned().collect();
        self.blobs.retain(|digest, _| live.contains(digest));
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_entries(&self, path: &DsuPath, recursive: bool) -> CoreResult<Vec<Entry>> {
        self.state.read().await.tree.list(path, recursive)
    }

    async fn read_file(&self, path: &DsuPath) -> CoreResult<Vec<u8>> {
        let state = self.state.read().await;
        let (digest, _) = state.tree.file(path)?;
        state
            .blobs
            .get(digest)
            .map(|blob| blob.to_vec())
            .ok_or_else(|| CoreError::MissingObject(digest.to_string()))
    }

    async fn write_file(&self, path: &DsuPath, content: &[u8]) -> CoreResult<()> {
        let mut state = self.state.write().await;
        state.put(path, content)?;
        state.collect_garbage();
        Ok(())
    }

    async fn create_folder(&self, path: &DsuPath) -> CoreResult<()> {
        self.state.write().await.tree.create_dir(path)
    }

    async fn delete(&self, path: &DsuPath) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let removed = state.tree.remove(path)?;
        tracing::debug!("deleted {removed} node(s) under {path}");
        state.collect_garbage();
        Ok(())
    }

    async fn stat(&self, path: &DsuPath) -> CoreResult<Entry> {
        self.state.read().await.tree.entry(path)
    }

    fn label(&self) -> String {
        "memory (ephemeral)".to_string()
    }
}
