//! Duplicate detection by content digest.
//!
//! - [`finder`] — the sequential scan producing a [`DuplicateMap`].
//! - [`report`] — a serializable [`DuplicateReport`] of the duplicate groups.

pub mod finder;
pub mod report;

pub use finder::{find_duplicates, DuplicateMap, ScanError};
pub use report::{DuplicateReport, ReportGroup};
