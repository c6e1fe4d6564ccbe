//! CLI for the consistent-hash key/value store.
//!
//! Bundles both the storage-server binary (`serve`) and the client-facing
//! operations (`put`/`get`/`delete`/`ring`) behind one `pdb` executable.

pub mod commands;
pub mod config;

pub use commands::{Cli, Command};
pub use config::init_tracing;
