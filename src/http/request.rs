use std::time::Duration;

use crate::args::{HttpMethod, PositiveUsize};

/// The request every worker repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    /// Header pairs in insertion order; repeated keys are sent as separate lines.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

/// Everything a single load test run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    pub request: RequestSpec,
    pub concurrency: PositiveUsize,
    pub total_requests: PositiveUsize,
    /// Per-request deadline; `None` disables it.
    pub timeout: Option<Duration>,
    pub max_retries: u32,
    pub keep_alive_disabled: bool,
}
