//! Routes records from the `log` facade into a [`LoggerRegistry`].
//!
//! Records emitted while a bridged dispatch is running on the same thread
//! are dropped, as are records from this crate and from the crates the
//! remote transport runs on (their records can be emitted on the transport's
//! own threads). Handler I/O can therefore never loop back into the handlers.

use crate::context::Context;
use crate::enrichment::KEY_NAME;
use crate::level::Level;
use crate::registry::LoggerRegistry;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::cell::Cell;
use std::sync::Arc;

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Crates used by the handlers' transports.
const TRANSPORT_TARGETS: &[&str] = &[
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "http",
    "rustls",
    "native_tls",
    "tokio",
    "tokio_util",
    "mio",
    "want",
    "tower",
];

thread_local! {
    static IN_DISPATCH: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as dispatching until dropped.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        if IN_DISPATCH.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(DispatchGuard)
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        IN_DISPATCH.with(|flag| flag.set(false));
    }
}

fn has_root(target: &str, root: &str) -> bool {
    target
        .strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

pub struct LogBridge {
    registry: Arc<LoggerRegistry>,
    max_level: LevelFilter,
}

impl LogBridge {
    pub fn new(registry: Arc<LoggerRegistry>, max_level: LevelFilter) -> Self {
        Self {
            registry,
            max_level,
        }
    }

    /// Whether records for `target` must never reach the registry.
    fn is_own(target: &str) -> bool {
        has_root(target, OWN_TARGET)
            || TRANSPORT_TARGETS.iter().any(|root| has_root(target, root))
    }

    fn context_for(record: &Record<'_>) -> Context {
        let mut context = Context::new().with(KEY_NAME, record.target());
        if let Some(module) = record.module_path() {
            context.insert("module", module);
        }
        if let Some(file) = record.file() {
            context.insert("file", file);
        }
        if let Some(line) = record.line() {
            context.insert("line", line);
        }
        context
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level && !Self::is_own(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Some(_guard) = DispatchGuard::enter() else {
            return;
        };
        // log::Log has no error channel; failed deliveries are dropped here.
        let _ = self.registry.dispatch(
            Level::from(record.level()),
            &record.args().to_string(),
            Some(Self::context_for(record)),
        );
    }

    fn flush(&self) {}
}

/// Installs a bridge to `registry` as the global `log` logger.
pub fn install(registry: Arc<LoggerRegistry>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(LogBridge::new(registry, max_level)))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;
    use crate::handler::Handler;
    use crate::test_utils::RecordingHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    fn bridge() -> (LogBridge, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::new());
        let registry = Arc::new(LoggerRegistry::new());
        registry.register(handler.clone(), Level::Debug);
        (LogBridge::new(registry, LevelFilter::Info), handler)
    }

    #[test]
    fn test_record_is_dispatched_with_target_as_name() {
        let (bridge, handler) = bridge();
        bridge.log(
            &Record::builder()
                .args(format_args!("connected to {}", "db"))
                .level(log::Level::Warn)
                .target("app::db")
                .module_path(Some("app::db"))
                .line(Some(12))
                .build(),
        );

        let events = handler.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::Warning);
        assert_eq!(events[0].message, "connected to db");
        assert_eq!(events[0].context.get("name").and_then(|v| v.as_str()), Some("app::db"));
        assert_eq!(events[0].context.get("line").map(|v| v.to_string()).as_deref(), Some("12"));
    }

    #[test]
    fn test_records_below_max_level_are_dropped() {
        let (bridge, handler) = bridge();
        bridge.log(
            &Record::builder()
                .args(format_args!("noise"))
                .level(log::Level::Debug)
                .target("app")
                .build(),
        );
        assert!(handler.events().is_empty());
    }

    #[test]
    fn test_own_records_are_dropped() {
        assert!(LogBridge::is_own("fanlog"));
        assert!(LogBridge::is_own("fanlog::handler::remote"));
        assert!(!LogBridge::is_own("fanlogger"));
        assert!(!LogBridge::is_own("app"));
    }

    #[test]
    fn test_transport_records_are_dropped() {
        assert!(LogBridge::is_own("reqwest::blocking::wait"));
        assert!(LogBridge::is_own("hyper_util::client::legacy::pool"));
        assert!(LogBridge::is_own("h2"));
        assert!(LogBridge::is_own("tokio::runtime"));
        assert!(!LogBridge::is_own("hyperion"));
        assert!(!LogBridge::is_own("tokenizer"));
    }

    /// A handler that emits a record through the bridge while delivering.
    struct ChattyHandler {
        bridge: OnceLock<Arc<LogBridge>>,
        deliveries: AtomicUsize,
    }

    impl Handler for ChattyHandler {
        fn name(&self) -> &str {
            "chatty"
        }

        fn deliver(&self, _level: Level, _message: &str, _context: &Context) -> Result<(), DeliveryError> {
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            if let Some(bridge) = self.bridge.get() {
                bridge.log(
                    &Record::builder()
                        .args(format_args!("sending event"))
                        .level(log::Level::Info)
                        .target("app::transport")
                        .build(),
                );
            }
            Ok(())
        }
    }

    #[test]
    fn test_records_emitted_during_dispatch_are_dropped() {
        let handler = Arc::new(ChattyHandler {
            bridge: OnceLock::new(),
            deliveries: AtomicUsize::new(0),
        });
        let registry = Arc::new(LoggerRegistry::new());
        registry.register(handler.clone(), Level::Debug);
        let bridge = Arc::new(LogBridge::new(registry, LevelFilter::Trace));
        assert!(handler.bridge.set(bridge.clone()).is_ok());

        for _ in 0..2 {
            bridge.log(
                &Record::builder()
                    .args(format_args!("outer"))
                    .level(log::Level::Warn)
                    .target("app")
                    .build(),
            );
        }
        assert_eq!(handler.deliveries.load(Ordering::SeqCst), 2);
    }
}
