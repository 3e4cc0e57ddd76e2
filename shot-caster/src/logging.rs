/// Log output for the command-line tool
use bevy::log::tracing_subscriber::{EnvFilter, fmt};

/// Installs a formatter honouring `RUST_LOG`, falling back to `default_filter`.
/// Calling it again after a subscriber is installed has no effect.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
