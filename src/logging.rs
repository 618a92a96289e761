//! Logger installation for hosts that do not bring their own.
//!
//! The crate logs through the `log` facade (see the macro re-exports in
//! `lib.rs`). A UI shell that already installs a logger can skip this module.

use log::LevelFilter;

/// Default level: Debug in debug builds, Info in release builds.
pub fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install `env_logger` at the given level.
///
/// `RUST_LOG` still overrides the level per module. Calling this twice is
/// harmless: the second install fails and is ignored.
pub fn init(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    if result.is_ok() {
        crate::info!("Logging initialized at {}", level);
    }
}
