use super::types::PositiveUsize;
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

/// Checks that `value` parses as an absolute URL with both a scheme and a host.
///
/// # Errors
///
/// Returns an error when the URL does not parse or lacks a host.
pub fn validate_target_url(value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value).map_err(|err| ValidationError::InvalidUrl {
        url: value.to_owned(),
        source: err,
    })?;
    if parsed.scheme().is_empty() || parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::UrlMissingSchemeOrHost {
            url: value.to_owned(),
        });
    }
    Ok(())
}
