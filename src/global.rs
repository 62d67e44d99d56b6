//! Process-wide default logger.
//!
//! Passing a [`Logger`] handle explicitly is preferred. The default slot
//! serves code that has not been wired up yet; until something is
//! installed it holds [`Logger::disabled`].

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::Logger;

static GLOBAL: Lazy<RwLock<Logger>> = Lazy::new(|| RwLock::new(Logger::disabled()));

/// Install `logger` as the process default, returning the previous one.
pub fn set_global(logger: Logger) -> Logger {
    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, logger)
}

/// The current process default.
pub fn logger() -> Logger {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Build a logger with [`Logger::new`] and install it as the process default.
///
/// Calling this again replaces the default; handles obtained earlier keep
/// their old configuration.
pub fn init(remote_token: &str, log_file: impl AsRef<Path>) -> Logger {
    let logger = Logger::new(remote_token, log_file);
    set_global(logger.clone());
    logger
}
