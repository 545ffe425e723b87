//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default filter
///
/// `RUST_LOG` still wins when it is set. The filter uses `env_logger` syntax,
/// e.g. `"info"` or `"scene_ecs=debug"`.
pub fn init_with_filter(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
