//! In-memory namespace shared by the store backends.
//!
//! A [`Tree`] maps every path to a [`Node`]. Files reference their content by
//! digest; the bytes live wherever the backend keeps its objects. All
//! namespace rules (implicit parents, kind conflicts, recursive delete) are
//! enforced here so both backends behave identically.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::{CoreError, CoreResult};
use crate::path::DsuPath;
use crate::store::Entry;

/// What lives at a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Directory,
    File { digest: ContentDigest, size: u64 },
}

/// Path → node map. The root directory is always present.
///
/// Iteration is lexicographic by path, which gives deterministic
/// enumeration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    nodes: BTreeMap<DsuPath, Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Creates a tree holding only the root directory.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(DsuPath::root(), Node::Directory);
        Self { nodes }
    }

    /// Returns `true` if the root is present and every non-root node has a
    /// directory parent.
    pub fn is_consistent(&self) -> bool {
        matches!(self.nodes.get(&DsuPath::root()), Some(Node::Directory))
            && self.nodes.keys().filter(|p| !p.is_root()).all(|p| {
                p.parent()
                    .is_some_and(|parent| matches!(self.nodes.get(&parent), Some(Node::Directory)))
            })
    }

    pub fn get(&self, path: &DsuPath) -> Option<&Node> {
        self.nodes.get(path)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is never removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the entry at `path`.
    pub fn entry(&self, path: &DsuPath) -> CoreResult<Entry> {
        match self.nodes.get(path) {
            Some(node) => Ok(to_entry(path, node)),
            None => Err(CoreError::NotFound(path.to_string())),
        }
    }

    /// Lists the children (or, with `recursive`, all descendants) of the
    /// directory at `path`.
    pub fn list(&self, path: &DsuPath, recursive: bool) -> CoreResult<Vec<Entry>> {
        match self.nodes.get(path) {
            None => return Err(CoreError::NotFound(path.to_string())),
            Some(Node::File { .. }) => return Err(CoreError::NotADirectory(path.to_string())),
            Some(Node::Directory) => {}
        }

        let entries = self
            .nodes
            .iter()
            .filter(|(candidate, _)| *candidate != path && candidate.starts_with(path))
            .filter(|(candidate, _)| recursive || candidate.parent().as_ref() == Some(path))
            .map(|(candidate, node)| to_entry(candidate, node))
            .collect();
        Ok(entries)
    }

    /// Returns the digest and size of the file at `path`.
    pub fn file(&self, path: &DsuPath) -> CoreResult<(&ContentDigest, u64)> {
        match self.nodes.get(path) {
            None => Err(CoreError::NotFound(path.to_string())),
            Some(Node::Directory) => Err(CoreError::IsADirectory(path.to_string())),
            Some(Node::File { digest, size }) => Ok((digest, *size)),
        }
    }

    /// Records a file at `path`, creating missing parent directories.
    pub fn insert_file(
        &mut self,
        path: &DsuPath,
        digest: ContentDigest,
        size: u64,
    ) -> CoreResult<()> {
        if matches!(self.nodes.get(path), Some(Node::Directory)) {
            return Err(CoreError::IsADirectory(path.to_string()));
        }
        self.ensure_parents(path)?;
        self.nodes.insert(path.clone(), Node::File { digest, size });
        Ok(())
    }

    /// Creates a directory at `path` and any missing parents.
    pub fn create_dir(&mut self, path: &DsuPath) -> CoreResult<()> {
        match self.nodes.get(path) {
            Some(Node::Directory) => return Ok(()),
            Some(Node::File { .. }) => return Err(CoreError::AlreadyExists(path.to_string())),
            None => {}
        }
        self.ensure_parents(path)?;
        self.nodes.insert(path.clone(), Node::Directory);
        Ok(())
    }

    /// Removes `path` and everything below it. Returns the number of nodes
    /// removed.
    pub fn remove(&mut self, path: &DsuPath) -> CoreResult<usize> {
        if path.is_root() {
            return Err(CoreError::InvalidPath(path.to_string()));
        }
        if !self.nodes.contains_key(path) {
            return Err(CoreError::NotFound(path.to_string()));
        }
        let before = self.nodes.len();
        self.nodes.retain(|candidate, _| !candidate.starts_with(path));
        Ok(before - self.nodes.len())
    }

    /// All digests still referenced by some file.
    pub fn referenced_digests(&self) -> HashSet<&ContentDigest> {
        self.nodes
            .values()
            .filter_map(|node| match node {
                Node::File { digest, .. } => Some(digest),
                Node::Directory => None,
            })
            .collect()
    }

    fn ensure_parents(&mut self, path: &DsuPath) -> CoreResult<()> {
        for ancestor in path.ancestors() {
            match self.nodes.get(&ancestor) {
                Some(Node::Directory) => {}
                Some(Node::File { .. }) => {
                    return Err(CoreError::NotADirectory(ancestor.to_string()));
                }
                None => {
                    self.nodes.insert(ancestor, Node::Directory);
                }
            }
        }
        Ok(())
    }
}

fn to_entry(path: &DsuPath, node: &Node) -> Entry {
    match node {
        Node::Directory => Entry::directory(path.clone()),
        Node::File { size, .. } => Entry::file(path.clone(), *size),
    }
}
