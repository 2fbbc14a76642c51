use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. `LOADPHASE_LOG` wins over `RUST_LOG`;
/// without either the level is `debug` when verbose, `info` otherwise.
pub fn init_logging(verbose: bool) {
    let directive = filter_directive(
        verbose,
        std::env::var("LOADPHASE_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(fallback(verbose)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

const fn fallback(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Picks the first configured directive; an unparsable one falls back to the
/// verbosity level.
fn filter_directive(verbose: bool, primary: Option<String>, secondary: Option<String>) -> String {
    primary
        .or(secondary)
        .filter(|value| EnvFilter::try_new(value).is_ok())
        .unwrap_or_else(|| fallback(verbose).to_owned())
}
