//! Line-oriented plain-text sink.

use super::{event_time, Handler};
use crate::context::Context;
use crate::enrichment::{HOSTNAME_UNKNOWN, KEY_HOSTNAME};
use crate::error::DeliveryError;
use crate::level::Level;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

pub const TEXT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes one line per event:
/// `(<hostname>) [<time>] <LEVEL>: <message> k1 = v1 k2 = v2 ...`
///
/// Every context entry is rendered, in unspecified order.
pub struct TextHandler<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> TextHandler<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consumes the handler, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TextHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl TextHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

/// Renders an event as a single newline-terminated line.
pub fn format_line(level: Level, message: &str, context: &Context) -> String {
    let hostname = context
        .get(KEY_HOSTNAME)
        .map(ToString::to_string)
        .unwrap_or_else(|| HOSTNAME_UNKNOWN.to_string());
    let time = event_time(context).format(TEXT_TIME_FORMAT);
    let fields: Vec<String> = context
        .iter()
        .map(|(k, v)| format!("{} = {}", k, v))
        .collect();

    format!(
        "({}) [{}] {}: {} {}\n",
        hostname,
        time,
        level,
        message,
        fields.join(" ")
    )
}

impl<W: Write + Send> Handler for TextHandler<W> {
    fn name(&self) -> &str {
        "text"
    }

    fn deliver(&self, level: Level, message: &str, context: &Context) -> Result<(), DeliveryError> {
        let line = format_line(level, message, context);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(line.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
