//! vitrine application library
//!
//! Application modules plus the bootstrap sequence shared by the `vitrine`
//! binary and the CLI.

pub mod app;
pub mod modules;

pub use app::{build_registry, open_store, run};
