use serde::Deserialize;

use crate::args::HttpMethod;

/// Run options read from `loadphase.toml` / `loadphase.json`.
///
/// Every field is optional; values given on the command line take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    /// Header lines in `Key: Value` form.
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub concurrency: Option<usize>,
    pub requests: Option<usize>,
    /// Per-request timeout in seconds, `0` disables it.
    pub timeout: Option<u64>,
    pub max_retries: Option<u32>,
    pub disable_keepalive: Option<bool>,
    pub json: Option<bool>,
    pub output: Option<String>,
    pub no_progress: Option<bool>,
    pub verbose: Option<bool>,
}
