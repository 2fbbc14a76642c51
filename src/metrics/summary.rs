use std::time::Duration;

use tracing::warn;

use super::aggregator::Aggregator;
use super::types::{ResultMetrics, SummaryMetrics};

const PERCENT: f64 = 100.0;

/// Folds the drained aggregator into the final result of a run.
///
/// Rates are `0.0` when `elapsed` rounds to zero.
#[must_use]
pub fn build_result(aggregator: Aggregator, total_requests: u64, elapsed: Duration) -> ResultMetrics {
    if aggregator.received() != total_requests {
        warn!(
            "Expected {} measurements, aggregated {}",
            total_requests,
            aggregator.received()
        );
    }

    let duration_seconds = elapsed.as_secs_f64();
    let per_second = |value: f64| {
        if duration_seconds > 0.0 {
            value / duration_seconds
        } else {
            0.0
        }
    };

    let failed_requests = aggregator.failed_requests().min(total_requests);
    let error_percentage = if total_requests > 0 {
        failed_requests as f64 / total_requests as f64 * PERCENT
    } else {
        0.0
    };
    let requests_per_second = per_second(total_requests as f64);
    let resp_bytes_per_sec = per_second(aggregator.total_response_bytes() as f64);
    let avg_resp_time = aggregator.avg_resp_time_ms();
    let (status_codes, aggregate_metrics) = aggregator.into_parts();

    ResultMetrics {
        summary_metrics: SummaryMetrics {
            total_requests,
            failed_requests,
            successful_requests: total_requests.saturating_sub(failed_requests),
            error_percentage,
            requests_per_second,
            status_codes,
            avg_resp_time,
            resp_bytes_per_sec,
            duration_seconds,
        },
        aggregate_metrics,
    }
}
