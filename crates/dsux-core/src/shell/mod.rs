//! The command layer behind the `dsux` prompt.
//!
//! - [`catalog`] — command names, usage lines and fuzzy suggestions.
//! - [`command`] — parsing input lines into [`Command`]s.
//! - [`session`] — executing commands against a store.

pub mod catalog;
pub mod command;
pub mod session;

pub use catalog::{CommandCatalog, CommandDescriptor, CommandKind};
pub use command::{parse, Command, ParseError};
pub use session::{Outcome, Session, SessionError};
