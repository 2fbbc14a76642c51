use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::client::build_client;
use super::executor::{ProgressSink, RetryPolicy, WorkerContext, run_request};
use super::request::LoadConfig;
use super::transport::{ReqwestTransport, Transport};
use crate::args::PositiveUsize;
use crate::error::AppResult;
use crate::metrics::{Measurement, ResultMetrics, build_result, setup_aggregator};

/// Splits `total` requests across `workers`; the first `total % workers`
/// workers take one extra.
#[must_use]
pub fn partition_requests(total: usize, workers: PositiveUsize) -> Vec<usize> {
    let worker_count = workers.get();
    let base = total.checked_div(worker_count).unwrap_or(0);
    let remainder = total.checked_rem(worker_count).unwrap_or(0);
    (0..worker_count)
        .map(|worker_id| {
            if worker_id < remainder {
                base.saturating_add(1)
            } else {
                base
            }
        })
        .collect()
}

/// Runs a load test against the network with a freshly built client.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or a worker task
/// panics. Request failures are reported in the result, not as errors.
pub async fn run_load_test(
    config: &LoadConfig,
    progress: Arc<dyn ProgressSink>,
) -> AppResult<ResultMetrics> {
    let client = build_client(config)?;
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(client));
    run_load_test_with_transport(config, transport, progress).await
}

/// Runs a load test through the given transport.
///
/// # Errors
///
/// Returns an error when a worker or the aggregator task fails to join.
pub async fn run_load_test_with_transport(
    config: &LoadConfig,
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressSink>,
) -> AppResult<ResultMetrics> {
    let total_requests = config.total_requests.get();
    info!(
        "Starting load test with {} requests using {} concurrent users",
        total_requests,
        config.concurrency.get()
    );

    let (metrics_tx, metrics_rx) = mpsc::channel::<Measurement>(total_requests);
    let run_start = Instant::now();
    let aggregator_handle = setup_aggregator(metrics_rx, run_start);

    let request = Arc::new(config.request.clone());
    let policy = RetryPolicy::new(config.max_retries);

    let assignments = partition_requests(total_requests, config.concurrency);
    let mut worker_handles = Vec::with_capacity(assignments.len());
    for (worker_id, assigned) in assignments.into_iter().enumerate() {
        let transport = Arc::clone(&transport);
        let request = Arc::clone(&request);
        let progress = Arc::clone(&progress);
        let metrics_tx = metrics_tx.clone();
        worker_handles.push(tokio::spawn(async move {
            let worker = WorkerContext {
                transport: transport.as_ref(),
                request: request.as_ref(),
                policy: &policy,
                progress: progress.as_ref(),
                metrics_tx: &metrics_tx,
            };
            for _ in 0..assigned {
                if !run_request(&worker).await {
                    break;
                }
            }
            debug!("Worker {} finished {} requests", worker_id, assigned);
        }));
    }

    let mut join_error = None;
    for handle in worker_handles {
        if let Err(err) = handle.await
            && join_error.is_none()
        {
            join_error = Some(err);
        }
    }
    drop(metrics_tx);

    let aggregator = aggregator_handle.await?;
    let elapsed = run_start.elapsed();
    if let Some(err) = join_error {
        return Err(err.into());
    }

    let result = build_result(
        aggregator,
        u64::try_from(total_requests).unwrap_or(u64::MAX),
        elapsed,
    );
    info!(
        "Load test finished in {:.2}s ({} failed)",
        result.summary_metrics.duration_seconds, result.summary_metrics.failed_requests
    );
    Ok(result)
}
