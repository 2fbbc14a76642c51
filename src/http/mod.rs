//! Phase-timed request execution and the worker pool that drives a run.
mod client;
mod driver;
mod executor;
mod request;
mod trace;
mod transport;


pub use client::build_client;
pub use driver::{partition_requests, run_load_test, run_load_test_with_transport};
pub use executor::{ProgressSink, RetryPolicy, execute_request};
pub use request::{LoadConfig, RequestSpec};
pub use trace::PhaseTimestamps;
pub use transport::{Exchange, ReqwestTransport, Transport, TransportError};
