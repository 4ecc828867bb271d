//! dsux core library — UI-agnostic logic for browsing a DSU.
//!
//! `dsux-core` holds everything the `dsux` shell does apart from terminal
//! I/O, so the same logic can be driven from tests or another frontend.
//!
//! # Modules
//!
//! - [`path`] — normalized absolute paths inside a DSU ([`DsuPath`]).
//! - [`store`] — the async [`Store`] capability and its [`MemoryStore`] / [`LocalStore`] backends.
//! - [`digest`] — SHA-256 content digests ([`ContentDigest`]).
//! - [`dups`] — duplicate detection ([`find_duplicates`]) and reports.
//! - [`nav`] — back/forward navigation history.
//! - [`shell`] — command parsing and dispatch ([`Session`]).
//! - [`config`] — TOML settings and the DSU registry.
//! - [`error`] — unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod config;
pub mod digest;
pub mod dups;
pub mod error;
pub mod nav;
pub mod path;
pub mod shell;
pub mod store;

pub use config::registry::{Registry, RegistryEntry};
pub use config::settings::Config;
pub use digest::ContentDigest;
pub use dups::{find_duplicates, DuplicateMap, DuplicateReport, ReportGroup, ScanError};
pub use error::{CoreError, CoreResult};
pub use nav::history::History;
pub use path::DsuPath;
pub use shell::{Command, CommandCatalog, Outcome, Session, SessionError};
pub use store::{Entry, EntryKind, LocalStore, MemoryStore, Store};
