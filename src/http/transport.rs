use std::error::Error as StdError;
use std::io;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::time::Instant;

use super::request::RequestSpec;
use super::trace::{PhaseTimestamps, with_connection_hooks};
use crate::metrics::FailureReason;

/// A completed round trip: any status, body fully drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub status: u16,
    pub body_bytes: u64,
}

/// A round trip that did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub reason: FailureReason,
    pub message: String,
    /// Status of a response whose body could not be read.
    pub partial_status: Option<u16>,
    pub retryable: bool,
}

impl TransportError {
    #[must_use]
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            partial_status: None,
            retryable: true,
        }
    }

    #[must_use]
    pub fn timeout() -> Self {
        Self::new(FailureReason::Timeout, "Timeout")
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(FailureReason::Cancelled, "Cancelled")
    }

    /// The request could not be built; retrying cannot help.
    #[must_use]
    pub fn construction(message: impl Into<String>) -> Self {
        Self {
            retryable: false,
            ..Self::new(
                FailureReason::Other,
                format!("Error creating request: {}", message.into()),
            )
        }
    }

    #[must_use]
    pub const fn with_partial_status(mut self, status: u16) -> Self {
        self.partial_status = Some(status);
        self
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::construction(error_chain(&err.without_url()));
        }
        if err.is_timeout() {
            return Self::timeout();
        }
        if is_interrupted(&err) {
            return Self::cancelled();
        }
        let reason = if err.is_connect() || err.is_request() {
            FailureReason::ConnectionError
        } else {
            FailureReason::Other
        };
        Self::new(reason, error_chain(&err.without_url()))
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_interrupted(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::Interrupted)
        {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Performs one instrumented attempt.
///
/// Implementations fill `timestamps` for every phase they observe; on success
/// at least `request_written`, `first_byte` and `completed` must be set.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(
        &self,
        request: &RequestSpec,
        timestamps: &mut PhaseTimestamps,
    ) -> Result<Exchange, TransportError>;
}

/// Transport backed by a shared `reqwest` client built with
/// [`super::client::build_client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(
        &self,
        request: &RequestSpec,
        timestamps: &mut PhaseTimestamps,
    ) -> Result<Exchange, TransportError> {
        let outgoing = build_request(&self.client, request)
            .map_err(|err| TransportError::construction(error_chain(&err.without_url())))?;

        let dispatched = Instant::now();
        let (outcome, hooks) = with_connection_hooks(self.client.execute(outgoing)).await;
        let response = outcome.map_err(TransportError::from_reqwest)?;
        let first_byte = Instant::now();
        hooks.apply(timestamps, dispatched);
        timestamps.first_byte = Some(first_byte);

        let status = response.status().as_u16();
        let body_bytes = drain_response_body(response).await.map_err(|err| {
            let mut failure = TransportError::from_reqwest(err).with_partial_status(status);
            failure.message = format!("Failed to read response body: {}", failure.message);
            failure
        })?;
        timestamps.completed = Some(Instant::now());

        Ok(Exchange { status, body_bytes })
    }
}

fn build_request(client: &Client, spec: &RequestSpec) -> Result<reqwest::Request, reqwest::Error> {
    let mut builder = client.request(spec.method.to_reqwest(), spec.url.as_str());
    for (key, value) in &spec.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    if !spec.body.is_empty() {
        builder = builder.body(spec.body.clone());
    }
    builder.build()
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
