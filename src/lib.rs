// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod article;
pub mod config;
pub mod error;
pub mod metrics;
pub mod news;
pub mod sentiment;
pub mod spelling;
pub mod summarize;
pub mod translate;

pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::error::ApiError;

use axum::Router;
use tracing::info;

/// Build the full application router from a loaded config: production
/// collaborators plus `/metrics` when enabled.
pub fn app(config: AppConfig) -> anyhow::Result<Router> {
    let metrics_enabled = config.metrics_enabled;
    let state = AppState::from_config(config)?;
    info!(
        country = %state.config().country,
        page_size = state.config().search_page_size,
        metrics_enabled,
        "app state ready"
    );

    let mut router = api::router(state);
    if metrics_enabled {
        let m = crate::metrics::Metrics::init()?;
        router = router.merge(m.router());
    }
    Ok(router)
}
