//! The handler registry and the dispatch path.
//!
//! A [`LoggerRegistry`] owns an ordered list of `(handler, minimum level)`
//! registrations. Dispatch enriches the event context, then delivers the event
//! to every registration whose minimum level is at or below the event level,
//! in insertion order. With no registrations, the event goes to the default
//! handler instead.
//!
//! Registration changes take the write lock; dispatch holds the read lock for
//! the whole fan-out, so a dispatch never sees a partially updated list.

use crate::context::Context;
use crate::enrichment::{Enricher, KEY_NAME};
use crate::error::{DispatchError, HandlerFailure};
use crate::handler::{Handler, TextHandler};
use crate::level::Level;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Exit code passed to the [`Terminator`] after a fatal event.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Decides what happens to the process after a fatal event.
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

/// A handler paired with the minimum level it accepts.
#[derive(Clone)]
pub struct Registration {
    pub handler: Arc<dyn Handler>,
    pub min_level: Level,
}

impl Registration {
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.min_level
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("handler", &self.handler.name())
            .field("min_level", &self.min_level)
            .finish()
    }
}

pub struct LoggerRegistry {
    registrations: RwLock<Vec<Registration>>,
    default_handler: Arc<dyn Handler>,
    enricher: Enricher,
    terminator: Arc<dyn Terminator>,
}

impl LoggerRegistry {
    /// An empty registry that falls back to a text handler on stderr.
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            default_handler: Arc::new(TextHandler::stderr()),
            enricher: Enricher::system(),
            terminator: Arc::new(ProcessExit),
        }
    }

    /// Replaces the handler used while no registrations exist.
    pub fn with_default_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.default_handler = handler;
        self
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// Appends a registration. Duplicates are kept and each one fires.
    pub fn register(&self, handler: Arc<dyn Handler>, min_level: Level) {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        registrations.push(Registration { handler, min_level });
    }

    /// Removes every registration.
    pub fn clear(&self) {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *registrations = Vec::new();
    }

    pub fn len(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enriches the context and delivers the event to every applicable handler.
    ///
    /// Every selected handler is invoked even if an earlier one fails; the
    /// error lists all failures in delivery order.
    pub fn dispatch(
        &self,
        level: Level,
        message: &str,
        context: Option<Context>,
    ) -> Result<(), DispatchError> {
        let context = self.enricher.enrich(context);
        let registrations = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        if registrations.is_empty() {
            return self
                .default_handler
                .deliver(level, message, &context)
                .map_err(|error| {
                    DispatchError::new(vec![HandlerFailure {
                        handler: self.default_handler.name().to_string(),
                        error,
                    }])
                });
        }

        let failures: Vec<HandlerFailure> = registrations
            .iter()
            .filter(|r| r.accepts(level))
            .filter_map(|r| {
                r.handler
                    .deliver(level, message, &context)
                    .err()
                    .map(|error| HandlerFailure {
                        handler: r.handler.name().to_string(),
                        error,
                    })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::new(failures))
        }
    }

    /// Logs a displayable message with no caller context.
    pub fn log(&self, level: Level, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.dispatch(level, &message.to_string(), None)
    }

    /// Logs a message with caller context.
    pub fn logm(&self, level: Level, message: &str, context: Context) -> Result<(), DispatchError> {
        self.dispatch(level, message, Some(context))
    }

    /// Runs the terminator after a fatal dispatch, whatever its outcome.
    fn terminate_after(&self, result: Result<(), DispatchError>) -> Result<(), DispatchError> {
        self.terminator.terminate(FATAL_EXIT_CODE);
        result
    }

    pub fn debug(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Critical, message)
    }

    /// Logs at FATAL, then terminates.
    pub fn fatal(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        let result = self.log(Level::Fatal, message);
        self.terminate_after(result)
    }

    pub fn debugm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Debug, message, context)
    }

    pub fn infom(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Info, message, context)
    }

    pub fn warningm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Warning, message, context)
    }

    pub fn errorm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Error, message, context)
    }

    pub fn criticalm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Critical, message, context)
    }

    /// Logs at FATAL with context, then terminates.
    pub fn fatalm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        let result = self.logm(Level::Fatal, message, context);
        self.terminate_after(result)
    }

    /// Returns a named handle onto this registry.
    ///
    /// Handles are not cached; every call returns a fresh, equivalent one.
    pub fn get_logger(self: &Arc<Self>, name: impl Into<String>) -> Logger {
        Logger {
            name: name.into(),
            registry: Arc::clone(self),
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registrations = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LoggerRegistry")
            .field("registrations", &*registrations)
            .field("default_handler", &self.default_handler.name())
            .finish_non_exhaustive()
    }
}

/// A named handle that stamps its name on every event it logs.
#[derive(Clone)]
pub struct Logger {
    name: String,
    registry: Arc<LoggerRegistry>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.logm(level, &message.to_string(), Context::new())
    }

    /// Logs with context; the logger's name replaces any caller `name`.
    pub fn logm(&self, level: Level, message: &str, mut context: Context) -> Result<(), DispatchError> {
        context.insert(KEY_NAME, self.name.as_str());
        self.registry.dispatch(level, message, Some(context))
    }

    pub fn debug(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        self.log(Level::Critical, message)
    }

    pub fn fatal(&self, message: impl fmt::Display) -> Result<(), DispatchError> {
        let result = self.log(Level::Fatal, message);
        self.registry.terminate_after(result)
    }

    pub fn debugm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Debug, message, context)
    }

    pub fn infom(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Info, message, context)
    }

    pub fn warningm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Warning, message, context)
    }

    pub fn errorm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Error, message, context)
    }

    pub fn criticalm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        self.logm(Level::Critical, message, context)
    }

    pub fn fatalm(&self, message: &str, context: Context) -> Result<(), DispatchError> {
        let result = self.logm(Level::Fatal, message, context);
        self.registry.terminate_after(result)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}
