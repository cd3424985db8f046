//! Delivery targets for log events.
//!
//! A [`Handler`] receives an already-enriched event and delivers it to its
//! sink. The registry decides which handlers see an event; handlers never
//! filter by level themselves.

pub mod remote;
pub mod structured;
pub mod text;

pub use remote::{RemoteEvent, RemoteHandler, RemoteSeverity, ReportingClient};
pub use structured::StructuredHandler;
pub use text::TextHandler;

use crate::context::Context;
use crate::error::DeliveryError;
use crate::level::Level;
use chrono::{DateTime, Local};

/// Delivers one event to a sink.
pub trait Handler: Send + Sync {
    /// A short, descriptive name (e.g. "text", "remote") used in error reports.
    fn name(&self) -> &str;

    /// Delivers a single event.
    ///
    /// # Returns
    /// * `Ok(())` once the sink has accepted the event
    /// * `Err` with the sink's own failure, unchanged
    fn deliver(&self, level: Level, message: &str, context: &Context) -> Result<(), DeliveryError>;
}

/// The event time recorded by the enricher, or now if it is absent.
pub(crate) fn event_time(context: &Context) -> DateTime<Local> {
    context
        .get(crate::enrichment::KEY_TIME)
        .and_then(|v| v.as_time())
        .copied()
        .unwrap_or_else(Local::now)
}
