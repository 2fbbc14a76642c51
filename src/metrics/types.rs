use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Why a request ended without a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Timeout,
    Cancelled,
    ConnectionError,
    Other,
}

/// Millisecond durations of the four request phases plus their sum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseDurations {
    pub dns_lookup_ms: f64,
    pub tcp_conn_ms: f64,
    pub server_processing_ms: f64,
    pub content_transfer_ms: f64,
    pub total_duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessRecord {
    pub phases: PhaseDurations,
    pub status_code: u16,
    pub response_size_bytes: u64,
    /// The connection came from the idle pool, so DNS and connect collapsed to zero.
    pub connection_reused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub reason: FailureReason,
    pub message: String,
    /// Status of a partial response, `0` when no server answered.
    pub status_code: u16,
}

/// Outcome of one logical request, emitted exactly once by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Success(SuccessRecord),
    Failure(FailureRecord),
}

impl Measurement {
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Measurement::Success(record) => record.status_code,
            Measurement::Failure(record) => record.status_code,
        }
    }

    #[must_use]
    pub const fn response_size_bytes(&self) -> u64 {
        match self {
            Measurement::Success(record) => record.response_size_bytes,
            Measurement::Failure(_) => 0,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Measurement::Success(_) => None,
            Measurement::Failure(record) => Some(record.message.as_str()),
        }
    }

    #[must_use]
    pub const fn phases(&self) -> Option<&PhaseDurations> {
        match self {
            Measurement::Success(record) => Some(&record.phases),
            Measurement::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub mean: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Cumulative per-phase statistics at one point of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub tcp_conn_stat: Stat,
    pub server_processing_stat: Stat,
    pub content_transfer_stat: Stat,
    pub resp_duration_stat: Stat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_requests: u64,
    pub failed_requests: u64,
    pub successful_requests: u64,
    pub error_percentage: f64,
    pub requests_per_second: f64,
    pub status_codes: BTreeMap<u16, u64>,
    /// Mean total duration of successful requests in ms, `0` without successes.
    pub avg_resp_time: f64,
    #[serde(rename = "resp_per_sec")]
    pub resp_bytes_per_sec: f64,
    pub duration_seconds: f64,
}

/// Final outcome of a run: the summary plus snapshots keyed by `HH:MM:SS`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetrics {
    pub summary_metrics: SummaryMetrics,
    pub aggregate_metrics: BTreeMap<String, AggregateMetrics>,
}

/// On-disk shape of a result: `{"result": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub result: ResultMetrics,
}
