use crate::key::EventKey;
use std::time::Duration;

/// How a dispatched handler finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStatus {
    Completed,
    Failed(String),
    Panicked(String),
}

impl DispatchStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub key: EventKey,
    pub subscriber: String,
    pub status: DispatchStatus,
    pub elapsed: Duration,
}

/// Receives one outcome per dispatched handler.
///
/// Called from the handler's own task after it finishes, so implementations
/// must not block for long. The publisher never sees these outcomes.
pub trait DispatchObserver: Send + Sync {
    fn on_outcome(&self, outcome: &DispatchOutcome);
}

/// Default observer: logs every outcome through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn on_outcome(&self, outcome: &DispatchOutcome) {
        let elapsed_ms = outcome.elapsed.as_millis() as u64;
        match &outcome.status {
            DispatchStatus::Completed => tracing::debug!(
                key = %outcome.key,
                subscriber = %outcome.subscriber,
                elapsed_ms,
                "handler completed"
            ),
            DispatchStatus::Failed(error) => tracing::warn!(
                key = %outcome.key,
                subscriber = %outcome.subscriber,
                elapsed_ms,
                error = %error,
                "handler failed"
            ),
            DispatchStatus::Panicked(message) => tracing::error!(
                key = %outcome.key,
                subscriber = %outcome.subscriber,
                elapsed_ms,
                panic = %message,
                "handler panicked"
            ),
        }
    }
}
