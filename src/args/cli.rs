use clap::Parser;

use super::defaults::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use super::parsers::{parse_header, parse_positive_usize};
use super::types::{HttpMethod, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load tester with per-phase latency breakdown (DNS, connect, server processing, content transfer)."
)]
pub struct TesterArgs {
    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Target URL to test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP header to add to every request (repeatable, 'Key: Value')
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body for POST, PUT or PATCH requests
    #[arg(long, short, default_value = "")]
    pub data: String,

    /// Number of concurrent workers
    #[arg(
        long,
        short = 'c',
        default_value = "5",
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Total number of requests to send
    #[arg(
        long,
        short = 'n',
        default_value = "100",
        value_parser = parse_positive_usize
    )]
    pub requests: PositiveUsize,

    /// Per-request timeout in seconds (0 disables the timeout)
    #[arg(long = "timeout", short = 'T', default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Attempts per request before it is recorded as failed
    #[arg(long = "max-retries", short = 'r', default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Open a fresh connection for every request
    #[arg(long = "disable-keepalive")]
    pub disable_keepalive: bool,

    /// Write the result document as JSON
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Output file for the JSON result (defaults to {yyyy-mm-dd}_{method}_loadphase-result.json)
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Do not draw the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Path to a TOML or JSON config file
    #[arg(long)]
    pub config: Option<String>,
}
