//! fanlog - a leveled, structured logging facade
//!
//! Callers emit events with a level, a message and optional key/value
//! context. Each event is enriched with process metadata and delivered
//! synchronously to every registered handler whose minimum level it meets.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod global;
pub mod handler;
pub mod level;
pub mod registry;
pub mod reporting;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export core types for convenience
pub use context::{Context, Value};
pub use enrichment::Enricher;
pub use error::{DeliveryError, DispatchError, HandlerFailure};
pub use global::{
    clear_handlers, critical, criticalm, debug, debugm, error, errorm, fatal, fatalm, get_logger,
    info, infom, log, logm, register_handler, warning, warningm,
};
pub use handler::{Handler, RemoteHandler, StructuredHandler, TextHandler};
pub use level::Level;
pub use registry::{Logger, LoggerRegistry, ProcessExit, Registration, Terminator};
