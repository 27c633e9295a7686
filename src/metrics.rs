use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if a recorder is
    /// already installed in this process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time registration so series show up on /metrics with help text.
fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("http_requests_total", "API requests by route.");
        describe_counter!("http_errors_total", "API errors by route and kind.");
        describe_histogram!("downstream_ms", "Latency of outbound calls in milliseconds.");
    });
}

pub fn record_request(route: &'static str) {
    counter!("http_requests_total", "route" => route).increment(1);
}

pub fn record_error(route: &'static str, kind: &'static str) {
    counter!("http_errors_total", "route" => route, "kind" => kind).increment(1);
}
