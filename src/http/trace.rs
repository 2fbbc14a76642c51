use std::cell::Cell;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tokio::time::Instant;
use tower::{Layer, Service};

use crate::metrics::PhaseDurations;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MILLIS_PER_SECOND: f64 = 1000.0;

/// Lifecycle instants of a single request attempt.
///
/// `connected` stays `None` when the connection was taken from the idle pool;
/// [`PhaseTimestamps::durations`] then collapses every pre-write instant onto
/// `request_written`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimestamps {
    pub dns_start: Option<Instant>,
    pub dns_done: Option<Instant>,
    pub dial_start: Option<Instant>,
    pub connected: Option<Instant>,
    pub request_written: Option<Instant>,
    pub first_byte: Option<Instant>,
    pub completed: Option<Instant>,
}

impl PhaseTimestamps {
    #[must_use]
    pub const fn connection_reused(&self) -> bool {
        self.connected.is_none()
    }

    /// Derives the phase durations, or `None` when the write, first byte or
    /// completion instant is missing.
    #[must_use]
    pub fn durations(&self) -> Option<PhaseDurations> {
        let written = self.request_written?;
        let first_byte = self.first_byte?;
        let completed = self.completed?;

        let (dns_start, dns_done, connected) = match self.connected {
            None => (written, written, written),
            Some(connected) => {
                // IP literals skip the resolver; the dial start stands in for DNS.
                let dns_done = self.dns_done.or(self.dial_start).unwrap_or(connected);
                let dns_start = self.dns_start.unwrap_or(dns_done);
                (dns_start, dns_done, connected)
            }
        };

        let dns_lookup_ms = millis_between(dns_start, dns_done);
        let tcp_conn_ms = millis_between(dns_done, connected);
        let server_processing_ms = millis_between(written, first_byte);
        let content_transfer_ms = millis_between(first_byte, completed);

        Some(PhaseDurations {
            dns_lookup_ms,
            tcp_conn_ms,
            server_processing_ms,
            content_transfer_ms,
            total_duration_ms: dns_lookup_ms
                + tcp_conn_ms
                + server_processing_ms
                + content_transfer_ms,
        })
    }
}

fn millis_between(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64() * MILLIS_PER_SECOND
}

tokio::task_local! {
    static CONNECTION_HOOKS: ConnectionHooks;
}

#[derive(Debug, Default)]
struct ConnectionHooks {
    dns_start: Cell<Option<Instant>>,
    dns_done: Cell<Option<Instant>>,
    dial_start: Cell<Option<Instant>>,
    connected: Cell<Option<Instant>>,
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    DnsStart,
    DnsDone,
    DialStart,
    Connected,
}

/// Instants captured by the resolver and connector while one request ran.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct HookTimes {
    dns_start: Option<Instant>,
    dns_done: Option<Instant>,
    dial_start: Option<Instant>,
    connected: Option<Instant>,
}

impl HookTimes {
    /// Copies the captured instants into `timestamps`. The request counts as
    /// written once connected, or at `dispatched` on a pooled connection.
    pub(crate) fn apply(self, timestamps: &mut PhaseTimestamps, dispatched: Instant) {
        timestamps.dns_start = self.dns_start;
        timestamps.dns_done = self.dns_done;
        timestamps.dial_start = self.dial_start;
        timestamps.connected = self.connected;
        timestamps.request_written = Some(self.connected.unwrap_or(dispatched));
    }
}

/// Runs `future` with a fresh hook recorder and returns what it captured.
///
/// Connects that the pool finishes in the background run outside the scope
/// and leave the recorder untouched.
pub(crate) async fn with_connection_hooks<F>(future: F) -> (F::Output, HookTimes)
where
    F: Future,
{
    CONNECTION_HOOKS
        .scope(ConnectionHooks::default(), async move {
            let output = future.await;
            let times = CONNECTION_HOOKS
                .try_with(|hooks| HookTimes {
                    dns_start: hooks.dns_start.get(),
                    dns_done: hooks.dns_done.get(),
                    dial_start: hooks.dial_start.get(),
                    connected: hooks.connected.get(),
                })
                .unwrap_or_default();
            (output, times)
        })
        .await
}

fn mark(hook: Hook) {
    let now = Instant::now();
    drop(CONNECTION_HOOKS.try_with(|hooks| {
        let slot = match hook {
            Hook::DnsStart => &hooks.dns_start,
            Hook::DnsDone => &hooks.dns_done,
            Hook::DialStart => &hooks.dial_start,
            Hook::Connected => &hooks.connected,
        };
        slot.set(Some(now));
    }));
}

/// System resolver that reports DNS start/done to the active request.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TracingResolver;

impl Resolve for TracingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        Box::pin(async move {
            mark(Hook::DnsStart);
            let resolved = tokio::net::lookup_host((name.as_str(), 0)).await;
            mark(Hook::DnsDone);
            let addrs: Vec<SocketAddr> = resolved?.collect();
            Ok::<Addrs, BoxError>(Box::new(addrs.into_iter()))
        })
    }
}

/// Connector layer that reports dial start and connection establishment.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConnectTimingLayer;

impl<S> Layer<S> for ConnectTimingLayer {
    type Service = ConnectTiming<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ConnectTiming { inner }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConnectTiming<S> {
    inner: S,
}

impl<S, Target> Service<Target> for ConnectTiming<S>
where
    S: Service<Target>,
    S::Future: Send + 'static,
    S::Response: 'static,
    S::Error: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, target: Target) -> Self::Future {
        let connecting = self.inner.call(target);
        Box::pin(async move {
            mark(Hook::DialStart);
            let connection = connecting.await;
            if connection.is_ok() {
                mark(Hook::Connected);
            }
            connection
        })
    }
}
