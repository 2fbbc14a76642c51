use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to encode result document: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write result to '{path}': {source}")]
    WriteResult {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
