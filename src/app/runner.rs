use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::info;

use crate::args::TesterArgs;
use crate::error::AppResult;
use crate::http::{LoadConfig, ProgressSink, run_load_test};
use crate::metrics::ResultDocument;

use super::export::{export_json, resolve_output_path};
use super::progress::{RequestProgress, setup_progress_indicator};
use super::summary::print_summary;

/// Runs one load test, then prints the summary and writes the JSON export
/// when requested.
pub(crate) async fn run_local(args: &TesterArgs, config: &LoadConfig) -> AppResult<()> {
    let progress = Arc::new(RequestProgress::default());
    let (done_tx, done_rx) = oneshot::channel();
    let indicator = if args.no_progress {
        None
    } else {
        let goal = u64::try_from(config.total_requests.get()).unwrap_or(u64::MAX);
        Some(setup_progress_indicator(
            Arc::clone(&progress),
            goal,
            Instant::now(),
            done_rx,
        ))
    };

    let sink: Arc<dyn ProgressSink> = progress;
    let outcome = run_load_test(config, sink).await;

    if let Some(indicator) = indicator {
        drop(done_tx.send(()));
        indicator.await?;
    }
    let result = outcome?;

    print_summary(&result);

    if args.json {
        let path = resolve_output_path(args.output.as_deref(), config.request.method);
        export_json(&path, &ResultDocument { result }).await?;
        info!("Result written to {}", path.display());
    }

    Ok(())
}
