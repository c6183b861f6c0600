//! Process-wide error policy for failures that happen off the request path.

use parley_core::{config::Settings, error::ParleyError};
use tokio::sync::mpsc;
use tracing::error;

/// What to do with a runtime error once it has been logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log and keep serving.
    Report,
    /// Stop the gateway with the error.
    Raise,
}

impl ErrorPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.throw_errors {
            Self::Raise
        } else {
            Self::Report
        }
    }
}

/// Single sink every handler, pipeline task, and settings write reports into.
///
/// Reported errors are logged, then forwarded to the receiver returned by
/// [`ErrorSink::new`]; the gateway loop decides from the policy whether to stop.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    policy: ErrorPolicy,
    tx: mpsc::UnboundedSender<ParleyError>,
}

impl ErrorSink {
    pub fn new(policy: ErrorPolicy) -> (Self, mpsc::UnboundedReceiver<ParleyError>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { policy, tx }, rx)
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn report(&self, err: ParleyError) {
        error!("{err}");
        // Receiver gone means the gateway already stopped.
        let _ = self.tx.send(err);
    }
}
