//! Serializable summary of a duplicate scan.
//!
//! [`DuplicateReport`] keeps only real duplicate groups (two or more files)
//! and is what the shell prints for `dups --json`.

use serde::{Deserialize, Serialize};

use super::finder::DuplicateMap;
use crate::error::{CoreError, CoreResult};
use crate::path::DsuPath;

/// One group of files with identical content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportGroup {
    pub digest: String,
    pub size: u64,
    pub paths: Vec<DsuPath>,
}

/// Duplicate groups found under `root`, in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateReport {
    pub root: DsuPath,
    pub files_scanned: usize,
    /// Bytes held by redundant copies.
    pub wasted_bytes: u64,
    pub groups: Vec<ReportGroup>,
}

impl DuplicateReport {
    /// Builds a report from a finished scan of `root`.
    pub fn from_map(root: DsuPath, map: &DuplicateMap) -> Self {
        let groups = map
            .duplicates()
            .map(|(digest, paths)| ReportGroup {
                digest: digest.to_string(),
                size: map.size_of(digest).unwrap_or(0),
                paths: paths.to_vec(),
            })
            .collect();
        Self {
            root,
            files_scanned: map.file_count(),
            wasted_bytes: map.wasted_bytes(),
            groups,
        }
    }

    /// Returns `true` if no duplicate groups were found.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::Corrupt {
            what: "report",
            reason: e.to_string(),
        })
    }
}
