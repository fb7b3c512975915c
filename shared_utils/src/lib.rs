//! Small helpers shared by the workspace crates: environment lookups and
//! configuration errors.

pub mod config;
pub mod env;
