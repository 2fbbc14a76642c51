//! Measurement records, streaming aggregation, and the run summary.
mod aggregator;
mod percentiles;
mod summary;
mod types;


pub use aggregator::{Aggregator, consume_measurements, setup_aggregator};
pub use summary::build_result;
pub use types::{
    AggregateMetrics, FailureReason, FailureRecord, Measurement, PhaseDurations, ResultDocument,
    ResultMetrics, Stat, SuccessRecord, SummaryMetrics,
};
