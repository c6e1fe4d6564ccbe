//! Logging setup shared by every subcommand.
//!
//! Replaces the global `log.DefaultLog` singleton of the system this was
//! ported from with a `tracing` subscriber installed once per process,
//! configured from `RUST_LOG` (defaulting to `info`).

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
