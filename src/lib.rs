pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::pipeline::inference::HuggingFaceClient;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Arc::new(AppConfig::from_env());
    if !config.has_credential() {
        tracing::warn!("No inference token configured; running in offline demo mode");
    }

    // Blocking HTTP clients must be built (and dropped) outside the async runtime.
    let inference = match HuggingFaceClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build inference client");
            return;
        }
    };

    let ctx = api::ApiContext::new(config.clone(), inference.clone(), inference);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start tokio runtime");
            return;
        }
    };

    if let Err(e) = runtime.block_on(api::serve_until_shutdown(ctx.clone(), config.bind_addr)) {
        tracing::error!("{e}");
    }

    drop(runtime);
    drop(ctx);
    tracing::info!("{} stopped", config::APP_NAME);
}
