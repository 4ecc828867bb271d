//! Normalized virtual paths inside a DSU.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CoreError, CoreResult};

/// An absolute, normalized, slash-separated path inside a store.
///
/// Invariants: always begins with `/`, never contains `//`, never ends with
/// `/` unless it is the root, and contains no `.` or `..` segments. Segments
/// are NFC-normalized so that visually identical names compare equal.
///
/// # Examples
///
/// ```
/// use dsux_core::DsuPath;
///
/// let cwd = DsuPath::new("/docs//drafts/").unwrap();
/// assert_eq!(cwd.as_str(), "/docs/drafts");
///
/// let up = cwd.resolve("../notes.txt").unwrap();
/// assert_eq!(up.as_str(), "/docs/notes.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DsuPath(String);

impl DsuPath {
    /// Returns the root path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Normalizes `input` as a path relative to the root.
    ///
    /// A missing leading slash is tolerated; `"a/b"` and `"/a/b"` are the
    /// same path.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidPath`] if a segment contains a NUL byte.
    pub fn new(input: &str) -> CoreResult<Self> {
        Self::root().resolve(input)
    }

    /// Resolves `input` against `self` as the working directory.
    ///
    /// Absolute input ignores `self`. `..` at the root stays at the root.
    /// Empty input resolves to `self`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidPath`] if a segment contains a NUL byte.
    pub fn resolve(&self, input: &str) -> CoreResult<Self> {
        let mut segments: Vec<String> = if input.starts_with('/') {
            Vec::new()
        } else {
            self.segments().map(str::to_string).collect()
        };

        for segment in input.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                name => {
                    if name.contains('\0') {
                        return Err(CoreError::InvalidPath(input.to_string()));
                    }
                    segments.push(name.nfc().collect());
                }
            }
        }

        Ok(Self(format!("/{}", segments.join("/"))))
    }

    /// Appends a single name to this path.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidPath`] if `name` is empty, `.`, `..`, or contains
    /// `/` or NUL.
    pub fn join(&self, name: &str) -> CoreResult<Self> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
            return Err(CoreError::InvalidPath(name.to_string()));
        }
        self.resolve(name)
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Iterates over the non-empty segments (none for the root).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, or `""` for the root.
    pub fn name(&self) -> &str {
        self.segments().last().unwrap_or("")
    }

    /// Parent directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let idx = self.0.rfind('/').unwrap_or(0);
        if idx == 0 {
            Some(Self::root())
        } else {
            Some(Self(self.0[..idx].to_string()))
        }
    }

    /// All strict ancestors from the root downwards, excluding `self`.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while let Some(p) = current {
            current = p.parent();
            out.push(p);
        }
        out.reverse();
        out
    }

    /// Component-wise prefix test: `/a` is an ancestor-or-self of `/a/b`
    /// but not of `/ab`.
    pub fn starts_with(&self, prefix: &DsuPath) -> bool {
        if prefix.is_root() {
            return true;
        }
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0.as_bytes()[prefix.0.len()] == b'/')
    }
}

impl Default for DsuPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for DsuPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DsuPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DsuPath {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::new(&value)
    }
}

impl From<DsuPath> for String {
    fn from(path: DsuPath) -> Self {
        path.0
    }
}
