use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::request::LoadConfig;
use super::trace::{ConnectTimingLayer, TracingResolver};
use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

pub(crate) const MAX_IDLE_CONNS_PER_HOST: usize = 10_000;

/// Builds the client shared by every worker of a run.
///
/// # Errors
///
/// Returns an error when the TLS backend or resolver cannot be initialised.
pub fn build_client(config: &LoadConfig) -> AppResult<Client> {
    let mut client_builder = Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .dns_resolver(Arc::new(TracingResolver))
        .connector_layer(ConnectTimingLayer);

    if let Some(timeout) = config.timeout {
        client_builder = client_builder.timeout(timeout);
    }

    client_builder = if config.keep_alive_disabled {
        client_builder
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Some(Duration::from_secs(0)))
    } else {
        client_builder.pool_max_idle_per_host(MAX_IDLE_CONNS_PER_HOST)
    };

    client_builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
