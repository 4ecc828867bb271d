//! Navigation state for the shell.
//!
//! [`history::History`] tracks the directories a session has visited so that
//! `back` and `forward` can retrace them.

pub mod history;
