//! The process-wide registry and its free-function entry points.
//!
//! Programs that do not want to pass a [`LoggerRegistry`] around can use
//! these functions and the `debug!`..`fatal!` macros. The registry is created
//! on first use and lives for the rest of the process, unless [`init`] installs
//! a configured one (custom enricher, terminator or default handler) first.

use crate::context::Context;
use crate::error::DispatchError;
use crate::handler::Handler;
use crate::level::Level;
use crate::registry::{Logger, LoggerRegistry};
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

static REGISTRY: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();

#[derive(Debug, Error)]
#[error("the process-wide registry is already initialized")]
pub struct AlreadyInitialized;

/// Installs `registry` as the process-wide registry.
///
/// Fails if the registry was already installed or already created by an
/// earlier call into this module.
pub fn init(registry: LoggerRegistry) -> Result<(), AlreadyInitialized> {
    REGISTRY.set(Arc::new(registry)).map_err(|_| AlreadyInitialized)
}

/// The process-wide registry.
pub fn registry() -> &'static Arc<LoggerRegistry> {
    REGISTRY.get_or_init(|| Arc::new(LoggerRegistry::new()))
}

pub fn register_handler(handler: Arc<dyn Handler>, min_level: Level) {
    registry().register(handler, min_level);
}

pub fn clear_handlers() {
    registry().clear();
}

pub fn get_logger(name: impl Into<String>) -> Logger {
    registry().get_logger(name)
}

pub fn log(level: Level, message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().log(level, message)
}

pub fn logm(level: Level, message: &str, context: Context) -> Result<(), DispatchError> {
    registry().logm(level, message, context)
}

pub fn debug(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().debug(message)
}

pub fn info(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().info(message)
}

pub fn warning(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().warning(message)
}

pub fn error(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().error(message)
}

pub fn critical(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().critical(message)
}

/// Logs at FATAL, then exits the process.
pub fn fatal(message: impl fmt::Display) -> Result<(), DispatchError> {
    registry().fatal(message)
}

pub fn debugm(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().debugm(message, context)
}

pub fn infom(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().infom(message, context)
}

pub fn warningm(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().warningm(message, context)
}

pub fn errorm(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().errorm(message, context)
}

pub fn criticalm(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().criticalm(message, context)
}

pub fn fatalm(message: &str, context: Context) -> Result<(), DispatchError> {
    registry().fatalm(message, context)
}

/// Formats a message and logs it at DEBUG on the process-wide registry.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::global::debug(::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::global::info(::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::global::warning(::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::global::error(::std::format!($($arg)+))
    };
}

#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::global::critical(::std::format!($($arg)+))
    };
}

/// Formats a message, logs it at FATAL, then exits the process.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::global::fatal(::std::format!($($arg)+))
    };
}
