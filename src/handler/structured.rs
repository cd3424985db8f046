//! Newline-delimited JSON sink with a fixed record schema.
//!
//! Each record carries `time` (with UTC offset), `v` (schema version),
//! `level` (numeric code from [`Level::structured_code`]) and `msg`, plus
//! every other context entry as-is.

use super::{event_time, Handler};
use crate::context::{Context, Value};
use crate::enrichment::KEY_TIME;
use crate::error::DeliveryError;
use crate::level::Level;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

pub const STRUCTURED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";
pub const SCHEMA_VERSION: u8 = 0;

pub struct StructuredHandler<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> StructuredHandler<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StructuredHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StructuredHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

/// Builds the record for one event from a copy of its context.
pub fn build_record(level: Level, message: &str, context: &Context) -> Context {
    let time = event_time(context).format(STRUCTURED_TIME_FORMAT).to_string();
    let mut record = context.clone();
    record.insert(KEY_TIME, Value::String(time));
    record.insert("v", SCHEMA_VERSION);
    record.insert("level", level.structured_code());
    record.insert("msg", message);
    record
}

impl<W: Write + Send> Handler for StructuredHandler<W> {
    fn name(&self) -> &str {
        "structured"
    }

    fn deliver(&self, level: Level, message: &str, context: &Context) -> Result<(), DeliveryError> {
        let record = build_record(level, message, context);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(&line)?;
        out.flush()?;
        Ok(())
    }
}
