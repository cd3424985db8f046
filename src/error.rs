//! Error types returned by handlers and by dispatch.

use std::fmt;
use thiserror::Error;

/// Why a single handler failed to deliver an event.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not construct reporting client: {0}")]
    ClientConstruction(String),

    #[error("reporting transport failed: {0}")]
    Transport(String),

    #[error("event context is missing required key '{0}'")]
    MissingContext(&'static str),
}

/// A failure recorded against one registered handler.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The name reported by the failing handler.
    pub handler: String,
    pub error: DeliveryError,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.handler, self.error)
    }
}

/// Every handler failure from one dispatch, in delivery order.
#[derive(Debug)]
pub struct DispatchError {
    failures: Vec<HandlerFailure>,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} handler(s) failed: ", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures.last().map(|f| &f.error as _)
    }
}

impl DispatchError {
    pub(crate) fn new(failures: Vec<HandlerFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<HandlerFailure> {
        self.failures
    }

    /// The most recent failure of the dispatch.
    pub fn last(&self) -> Option<&HandlerFailure> {
        self.failures.last()
    }
}
