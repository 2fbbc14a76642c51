//! Core library for the `loadphase` CLI.
//!
//! The load driver splits a request budget across concurrent workers, times
//! every round trip per network phase (DNS, TCP connect, server processing,
//! content transfer), retries transport failures with exponential backoff and
//! folds the measurement stream into per-second percentile snapshots plus a
//! final summary. [`http::run_load_test`] is the entry point;
//! [`http::run_load_test_with_transport`] accepts any [`http::Transport`].
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
