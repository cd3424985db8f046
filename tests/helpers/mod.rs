#![allow(dead_code)]
use fanlog::test_utils::{RecordingHandler, RecordingTerminator};
use fanlog::{Enricher, LoggerRegistry};
use std::sync::Arc;

pub const TEST_HOST: &str = "test-host";

pub fn fixed_enricher() -> Enricher {
    Enricher::with_hostname_source(|| Some(TEST_HOST.to_string()))
}

/// A registry with a fixed hostname, a recording default handler and a
/// terminator that never exits.
pub struct TestRegistry {
    pub registry: Arc<LoggerRegistry>,
    pub default_handler: Arc<RecordingHandler>,
    pub terminator: Arc<RecordingTerminator>,
}

impl TestRegistry {
    pub fn new() -> Self {
        let default_handler = Arc::new(RecordingHandler::new());
        let terminator = Arc::new(RecordingTerminator::new());
        let registry = LoggerRegistry::new()
            .with_enricher(fixed_enricher())
            .with_default_handler(default_handler.clone())
            .with_terminator(terminator.clone());
        Self {
            registry: Arc::new(registry),
            default_handler,
            terminator,
        }
    }
}
