//! News Summarizer — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use news_summarizer::AppConfig;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `RUST_LOG`. The shuttle runtime may have installed
/// its own subscriber already; in that case this is a no-op.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_summarizer=info,tower_http=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env()?;
    let router = news_summarizer::app(config)?;

    Ok(router.into())
}
