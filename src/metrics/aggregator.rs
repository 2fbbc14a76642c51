use std::collections::BTreeMap;
use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::Instant};
use tracing::debug;

use super::percentiles::stat_from_sorted;
use super::types::{AggregateMetrics, Measurement, Stat};

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);
/// Connect samples at or above this are dropped from the TCP series.
const TCP_CONN_OUTLIER_MS: f64 = 1000.0;
/// Statuses above this count as failed outcomes.
const LAST_OK_STATUS: u16 = 226;
/// Smallest status that is counted in the status histogram.
const MIN_HISTOGRAM_STATUS: u16 = 100;
const SNAPSHOT_LABEL_FORMAT: &str = "%H:%M:%S";

/// Growing sample buffer that keeps an ascending copy for quantiles.
///
/// New samples land in `pending`; a snapshot sorts only those and merges them
/// into the already ordered run, so the full history is never re-sorted from
/// scratch.
#[derive(Debug, Default)]
pub(crate) struct SampleSeries {
    sorted: Vec<f64>,
    pending: Vec<f64>,
    sum: f64,
}

impl SampleSeries {
    pub(crate) fn push(&mut self, value: f64) {
        self.pending.push(value);
        self.sum += value;
    }

    pub(crate) fn len(&self) -> usize {
        self.sorted.len().saturating_add(self.pending.len())
    }

    pub(crate) fn mean(&self) -> f64 {
        let count = self.len();
        if count == 0 {
            return 0.0;
        }
        self.sum / count as f64
    }

    pub(crate) fn stat(&mut self) -> Stat {
        self.settle();
        stat_from_sorted(&self.sorted, self.sum)
    }

    fn settle(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.pending.sort_unstable_by(f64::total_cmp);
        self.sorted.append(&mut self.pending);
        // Two ascending runs: the stable sort degenerates into a single merge.
        self.sorted.sort_by(f64::total_cmp);
    }
}

/// Sole owner of the per-phase samples, counters and snapshots of a run.
#[derive(Debug)]
pub struct Aggregator {
    tcp_conn: SampleSeries,
    server_processing: SampleSeries,
    content_transfer: SampleSeries,
    resp_duration: SampleSeries,
    received: u64,
    failed_requests: u64,
    status_codes: BTreeMap<u16, u64>,
    total_response_bytes: u64,
    snapshots: BTreeMap<String, AggregateMetrics>,
    last_snapshot: Instant,
    snapshot_interval: Duration,
}

impl Aggregator {
    #[must_use]
    pub fn new(started: Instant) -> Self {
        Self {
            tcp_conn: SampleSeries::default(),
            server_processing: SampleSeries::default(),
            content_transfer: SampleSeries::default(),
            resp_duration: SampleSeries::default(),
            received: 0,
            failed_requests: 0,
            status_codes: BTreeMap::new(),
            total_response_bytes: 0,
            snapshots: BTreeMap::new(),
            last_snapshot: started,
            snapshot_interval: SNAPSHOT_INTERVAL,
        }
    }

    #[must_use]
    pub const fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = interval;
        self
    }

    /// Folds one record into the counters and sample buffers.
    pub fn observe(&mut self, record: &Measurement) {
        self.received = self.received.saturating_add(1);

        let status = record.status_code();
        if matches!(record, Measurement::Failure(_)) || status > LAST_OK_STATUS {
            self.failed_requests = self.failed_requests.saturating_add(1);
        }
        if status >= MIN_HISTOGRAM_STATUS {
            let count = self.status_codes.entry(status).or_insert(0);
            *count = count.saturating_add(1);
        }
        self.total_response_bytes = self
            .total_response_bytes
            .saturating_add(record.response_size_bytes());

        if let Some(phases) = record.phases() {
            if phases.tcp_conn_ms < TCP_CONN_OUTLIER_MS {
                self.tcp_conn.push(phases.tcp_conn_ms);
            }
            self.server_processing.push(phases.server_processing_ms);
            self.content_transfer.push(phases.content_transfer_ms);
            self.resp_duration.push(phases.total_duration_ms);
        }
    }

    /// Stores a snapshot under the current wall-clock second when more than
    /// the snapshot interval has passed since the previous one.
    pub fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_snapshot) <= self.snapshot_interval {
            return;
        }
        let label = chrono::Local::now()
            .format(SNAPSHOT_LABEL_FORMAT)
            .to_string();
        self.record_snapshot(label);
        self.last_snapshot = Instant::now();
    }

    /// Stores the closing snapshot once the stream is exhausted, so short
    /// runs still report their percentiles.
    pub fn finish(&mut self) {
        if self.received == 0 {
            return;
        }
        let label = chrono::Local::now()
            .format(SNAPSHOT_LABEL_FORMAT)
            .to_string();
        self.record_snapshot(label);
    }

    /// Computes the cumulative statistics and stores them under `label`,
    /// replacing an earlier snapshot with the same label.
    pub fn record_snapshot(&mut self, label: String) {
        let snapshot = self.current_snapshot();
        debug!(
            "Snapshot {}: {} samples, p99 {:.2}ms",
            label,
            self.resp_duration.len(),
            snapshot.resp_duration_stat.p99
        );
        self.snapshots.insert(label, snapshot);
    }

    pub fn current_snapshot(&mut self) -> AggregateMetrics {
        AggregateMetrics {
            tcp_conn_stat: self.tcp_conn.stat(),
            server_processing_stat: self.server_processing.stat(),
            content_transfer_stat: self.content_transfer.stat(),
            resp_duration_stat: self.resp_duration.stat(),
        }
    }

    #[must_use]
    pub const fn received(&self) -> u64 {
        self.received
    }

    #[must_use]
    pub const fn failed_requests(&self) -> u64 {
        self.failed_requests
    }

    #[must_use]
    pub const fn total_response_bytes(&self) -> u64 {
        self.total_response_bytes
    }

    #[must_use]
    pub const fn status_codes(&self) -> &BTreeMap<u16, u64> {
        &self.status_codes
    }

    #[must_use]
    pub const fn snapshots(&self) -> &BTreeMap<String, AggregateMetrics> {
        &self.snapshots
    }

    /// Mean total duration over successful requests, `0.0` without any.
    #[must_use]
    pub fn avg_resp_time_ms(&self) -> f64 {
        self.resp_duration.mean()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (BTreeMap<u16, u64>, BTreeMap<String, AggregateMetrics>) {
        (self.status_codes, self.snapshots)
    }
}

/// Drains `metrics_rx` until every sender is gone.
pub async fn consume_measurements(
    mut metrics_rx: mpsc::Receiver<Measurement>,
    mut aggregator: Aggregator,
) -> Aggregator {
    while let Some(record) = metrics_rx.recv().await {
        aggregator.observe(&record);
        aggregator.tick(Instant::now());
    }
    aggregator.finish();
    aggregator
}

#[must_use]
pub fn setup_aggregator(
    metrics_rx: mpsc::Receiver<Measurement>,
    run_start: Instant,
) -> JoinHandle<Aggregator> {
    tokio::spawn(consume_measurements(metrics_rx, Aggregator::new(run_start)))
}
