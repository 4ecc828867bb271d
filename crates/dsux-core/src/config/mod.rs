//! User-facing configuration: TOML settings and the DSU registry.

pub mod registry;
pub mod settings;
