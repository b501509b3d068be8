//! Log output setup.
//!
//! Library code only emits `tracing` events. Native hosts install a
//! `tracing-subscriber` formatter here; the browser build forwards events
//! through `tracing`'s `log` bridge to `console_log` (see `browser::mount_*`).

#[cfg(all(test, not(target_arch = "wasm32")))]
#[path = "logging_test.rs"]
mod logging_test;

/// Install a formatter filtered by `RUST_LOG` (default `info`). Safe to call
/// more than once; later calls are ignored.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
