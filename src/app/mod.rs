//! The CLI run: progress rendering, summary output and JSON export.
mod export;
mod progress;
mod runner;
mod summary;

pub(crate) use runner::run_local;
