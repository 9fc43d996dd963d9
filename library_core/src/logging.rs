//! Tracing subscriber setup for the binary.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Install a compact fmt subscriber writing to stderr.
///
/// Respects `RUST_LOG` if set; otherwise uses `default_directive`
/// (e.g. `"info"` or `"library_core=debug"`). Calling it twice is harmless.
pub fn init_logging(default_directive: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
