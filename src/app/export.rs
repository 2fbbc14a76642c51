use std::path::{Path, PathBuf};

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::args::{HttpMethod, default_output_name};
use crate::error::{AppError, AppResult, MetricsError};
use crate::metrics::ResultDocument;

const JSON_EXTENSION: &str = ".json";

/// Output path for `--json`: the given name or the dated default, always
/// ending in `.json`.
pub(crate) fn resolve_output_path(output: Option<&str>, method: HttpMethod) -> PathBuf {
    let mut name = output.map_or_else(
        || default_output_name(&method.as_str().to_ascii_lowercase()),
        str::to_owned,
    );
    if !name.ends_with(JSON_EXTENSION) {
        name.push_str(JSON_EXTENSION);
    }
    PathBuf::from(name)
}

pub(crate) async fn export_json(path: &Path, document: &ResultDocument) -> AppResult<()> {
    let json = serde_json::to_vec_pretty(document)
        .map_err(|err| AppError::metrics(MetricsError::Encode { source: err }))?;
    let write_error = |err: std::io::Error| {
        AppError::metrics(MetricsError::WriteResult {
            path: path.to_path_buf(),
            source: err,
        })
    };

    let file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await.map_err(write_error)?;
    writer.flush().await.map_err(write_error)?;
    Ok(())
}
