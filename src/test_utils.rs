//! Test doubles shared by unit and integration tests.

use crate::context::Context;
use crate::error::DeliveryError;
use crate::handler::Handler;
use crate::level::Level;
use crate::registry::Terminator;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// A cloneable in-memory writer; clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedEvent {
    pub level: Level,
    pub message: String,
    pub context: Context,
}

/// A handler that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn levels(&self) -> Vec<Level> {
        self.events.lock().unwrap().iter().map(|e| e.level).collect()
    }
}

impl Handler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    fn deliver(&self, level: Level, message: &str, context: &Context) -> Result<(), DeliveryError> {
        self.events.lock().unwrap().push(RecordedEvent {
            level,
            message: message.to_string(),
            context: context.clone(),
        });
        Ok(())
    }
}

/// A handler that always fails with a transport error.
#[derive(Debug)]
pub struct FailingHandler {
    name: String,
}

impl FailingHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Handler for FailingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, _level: Level, message: &str, _context: &Context) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport(format!("{} refused {:?}", self.name, message)))
    }
}

/// Records exit codes instead of exiting.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    calls: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<i32> {
        self.calls.lock().unwrap().clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.calls.lock().unwrap().push(code);
    }
}
