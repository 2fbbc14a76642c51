use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::request::RequestSpec;
use super::trace::PhaseTimestamps;
use super::transport::{Exchange, Transport, TransportError};
use crate::metrics::{FailureReason, FailureRecord, Measurement, SuccessRecord};

/// Exponential backoff between attempts of one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub const BASE_DELAY: Duration = Duration::from_millis(100);

    /// `max_retries` counts attempts in total; `0` still makes one attempt.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_attempts: max_retries.max(1),
            base_delay: Self::BASE_DELAY,
        }
    }

    #[must_use]
    pub const fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the failed attempt `attempt` (0-indexed).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Receives one tick per finished logical request.
pub trait ProgressSink: Send + Sync {
    fn increment(&self);
}

impl<F> ProgressSink for F
where
    F: Fn() + Send + Sync,
{
    fn increment(&self) {
        self();
    }
}

/// Runs `request` until it succeeds, fails without retry, or exhausts the
/// policy, and returns the single record describing the outcome.
pub async fn execute_request(
    transport: &dyn Transport,
    request: &RequestSpec,
    policy: &RetryPolicy,
) -> Measurement {
    let mut attempt: u32 = 0;
    loop {
        let mut timestamps = PhaseTimestamps::default();
        match transport.round_trip(request, &mut timestamps).await {
            Ok(exchange) => return success_record(exchange, &timestamps),
            Err(err) => {
                let next_attempt = attempt.saturating_add(1);
                if !err.retryable || next_attempt >= policy.max_attempts() {
                    debug!(
                        "Request failed after {} attempt(s): {}",
                        next_attempt, err.message
                    );
                    return failure_record(err);
                }
                let delay = policy.backoff(attempt);
                debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    next_attempt, err.message, delay
                );
                tokio::time::sleep(delay).await;
                attempt = next_attempt;
            }
        }
    }
}

fn success_record(exchange: Exchange, timestamps: &PhaseTimestamps) -> Measurement {
    let Some(phases) = timestamps.durations() else {
        warn!("Transport returned a response without complete phase timestamps");
        return Measurement::Failure(FailureRecord {
            reason: FailureReason::Other,
            message: String::from("incomplete phase timestamps"),
            status_code: exchange.status,
        });
    };
    Measurement::Success(SuccessRecord {
        phases,
        status_code: exchange.status,
        response_size_bytes: exchange.body_bytes,
        connection_reused: timestamps.connection_reused(),
    })
}

fn failure_record(err: TransportError) -> Measurement {
    let message = if err.message.is_empty() {
        String::from("request failed")
    } else {
        err.message
    };
    Measurement::Failure(FailureRecord {
        reason: err.reason,
        message,
        status_code: err.partial_status.unwrap_or(0),
    })
}

/// Shared per-worker handles for [`run_request`].
pub(crate) struct WorkerContext<'ctx> {
    pub(crate) transport: &'ctx dyn Transport,
    pub(crate) request: &'ctx RequestSpec,
    pub(crate) policy: &'ctx RetryPolicy,
    pub(crate) progress: &'ctx dyn ProgressSink,
    pub(crate) metrics_tx: &'ctx mpsc::Sender<Measurement>,
}

/// Executes one logical request, ticks progress and publishes the record.
/// Returns `false` once the aggregator has gone away.
pub(crate) async fn run_request(worker: &WorkerContext<'_>) -> bool {
    let record = execute_request(worker.transport, worker.request, worker.policy).await;
    worker.progress.increment();
    if worker.metrics_tx.send(record).await.is_err() {
        warn!("Measurement channel closed; dropping record");
        return false;
    }
    true
}
