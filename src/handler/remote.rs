//! Remote error-reporting sink.
//!
//! The handler maps events onto [`RemoteEvent`] and hands them to a
//! [`ReportingClient`]. The client is created on first use and reused for
//! every later event.

use super::{event_time, Handler};
use crate::context::{Context, Value};
use crate::enrichment::{KEY_HOSTNAME, KEY_NAME, KEY_TIME};
use crate::error::DeliveryError;
use crate::level::Level;
use crate::reporting::SentryClient;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

pub const REMOTE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Severity vocabulary of the reporting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl From<Level> for RemoteSeverity {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => RemoteSeverity::Debug,
            Level::Info => RemoteSeverity::Info,
            Level::Warning => RemoteSeverity::Warning,
            Level::Error | Level::Critical => RemoteSeverity::Error,
            Level::Fatal => RemoteSeverity::Fatal,
        }
    }
}

/// One event in the reporting service's shape.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteEvent {
    pub event_id: String,
    pub project: String,
    pub message: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub level: RemoteSeverity,
    pub logger: String,
    pub platform: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    pub extra: Context,
}

fn serialize_timestamp<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format(REMOTE_TIME_FORMAT))
}

impl RemoteEvent {
    /// Maps an enriched event onto the remote shape.
    ///
    /// `name` must be present; `name` and `time` are dropped from `extra`.
    pub fn from_event(
        project: &str,
        level: Level,
        message: &str,
        context: &Context,
    ) -> Result<Self, DeliveryError> {
        let logger = context
            .get(KEY_NAME)
            .and_then(Value::as_str)
            .ok_or(DeliveryError::MissingContext(KEY_NAME))?
            .to_string();
        let timestamp = event_time(context).with_timezone(&Utc);
        let server_name = context
            .get(KEY_HOSTNAME)
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut extra = context.clone();
        extra.remove(KEY_NAME);
        extra.remove(KEY_TIME);

        Ok(Self {
            event_id: Uuid::new_v4().simple().to_string(),
            project: project.to_string(),
            message: message.to_string(),
            timestamp,
            level: level.into(),
            logger,
            platform: "other",
            server_name,
            extra,
        })
    }
}

/// A connection to an error-reporting service.
///
/// `capture` blocks until the service has accepted or rejected the event.
pub trait ReportingClient: Send + Sync {
    fn capture(&self, event: &RemoteEvent) -> Result<(), DeliveryError>;
}

type ClientFactory = dyn Fn(&str) -> Result<Arc<dyn ReportingClient>, DeliveryError> + Send + Sync;

pub struct RemoteHandler {
    project: String,
    dsn: String,
    connect: Box<ClientFactory>,
    client: Mutex<Option<Arc<dyn ReportingClient>>>,
}

impl RemoteHandler {
    /// A handler reporting to a Sentry-compatible endpoint.
    pub fn new(project: impl Into<String>, dsn: impl Into<String>) -> Self {
        Self::with_client_factory(project, dsn, |dsn| {
            let client = SentryClient::connect(dsn)?;
            Ok(Arc::new(client) as Arc<dyn ReportingClient>)
        })
    }

    /// A handler whose client is built by `connect` on first use.
    pub fn with_client_factory<F>(
        project: impl Into<String>,
        dsn: impl Into<String>,
        connect: F,
    ) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn ReportingClient>, DeliveryError> + Send + Sync + 'static,
    {
        Self {
            project: project.into(),
            dsn: dsn.into(),
            connect: Box::new(connect),
            client: Mutex::new(None),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the shared client, constructing it under the lock if needed.
    fn client(&self) -> Result<Arc<dyn ReportingClient>, DeliveryError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }
        log::debug!("connecting reporting client for project {}", self.project);
        let client = (self.connect)(&self.dsn)?;
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }
}

impl Handler for RemoteHandler {
    fn name(&self) -> &str {
        "remote"
    }

    fn deliver(&self, level: Level, message: &str, context: &Context) -> Result<(), DeliveryError> {
        let client = self.client()?;
        let event = RemoteEvent::from_event(&self.project, level, message, context)?;
        client.capture(&event)
    }
}
