use crate::metrics::{ResultMetrics, Stat};

const LATENCY_ROWS: [&str; 4] = [
    "TCP Connect",
    "Server Processing",
    "Content Transfer",
    "Total Response",
];

/// Renders the run summary shown after a load test.
pub(crate) fn summary_lines(result: &ResultMetrics) -> Vec<String> {
    let summary = &result.summary_metrics;
    let mut lines = vec![
        format!("Total Requests: {}", summary.total_requests),
        format!("Successful Requests: {}", summary.successful_requests),
        format!("Failed Requests: {}", summary.failed_requests),
        format!("Error Rate: {:.2}%", summary.error_percentage),
        format!("Duration: {:.2}s", summary.duration_seconds),
        format!("Requests/sec: {:.2}", summary.requests_per_second),
        format!("Avg Response Time: {:.2} ms", summary.avg_resp_time),
        format!("Response Bytes/sec: {:.2}", summary.resp_bytes_per_sec),
    ];

    if !summary.status_codes.is_empty() {
        lines.push("Status Codes:".to_owned());
        for (status, count) in &summary.status_codes {
            lines.push(format!("  {}: {}", status, count));
        }
    }

    if let Some((label, snapshot)) = result.aggregate_metrics.last_key_value() {
        lines.push(format!(
            "Latency at {} (ms) {:>10} {:>10} {:>10} {:>10}",
            label, "mean", "p90", "p95", "p99"
        ));
        let stats = [
            snapshot.tcp_conn_stat,
            snapshot.server_processing_stat,
            snapshot.content_transfer_stat,
            snapshot.resp_duration_stat,
        ];
        for (name, stat) in LATENCY_ROWS.iter().zip(stats.iter()) {
            lines.push(latency_row(name, stat));
        }
    }

    lines
}

fn latency_row(name: &str, stat: &Stat) -> String {
    format!(
        "  {:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
        name, stat.mean, stat.p90, stat.p95, stat.p99
    )
}

pub(crate) fn print_summary(result: &ResultMetrics) {
    for line in summary_lines(result) {
        println!("{}", line);
    }
}
