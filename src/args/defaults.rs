pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadphase/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;

/// Result file name used when `--json` is set without `--output`.
#[must_use]
pub fn default_output_name(method_lower: &str) -> String {
    format!(
        "{}_{}_loadphase-result",
        chrono::Local::now().format("%Y-%m-%d"),
        method_lower
    )
}
