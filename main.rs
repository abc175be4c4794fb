//! x402 edge gateway server
//!
//! Reads configuration from the environment (and `.env`, when present), then serves the
//! gateway until Ctrl+C or SIGTERM.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_edge_gateway::{
    facilitator::{Facilitator, FacilitatorClient},
    routes::{build_router, AppState},
    server::ServerBuilder,
    GatewayConfig, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in production.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    let missing = config.missing_settings();
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Priced or gated paths will fail until these settings are provided"
        );
    }
    if config.short_circuit {
        tracing::warn!("SHORT_CIRCUIT is on: every request is treated as paid");
    }

    let facilitator: Option<Arc<dyn Facilitator>> = match config.facilitator_config() {
        Some(facilitator_config) => {
            let client = FacilitatorClient::new(facilitator_config)?;
            tracing::info!(url = %client.url(), "Using facilitator");
            Some(Arc::new(client))
        }
        None => None,
    };

    tracing::info!(
        origin = %config.origin_base_url,
        version = x402_edge_gateway::VERSION,
        "Starting x402 edge gateway"
    );

    let bind_address = config.bind_address.clone();
    let router = build_router(AppState::new(config, facilitator)?);

    ServerBuilder::new(router).bind(bind_address).serve().await
}
