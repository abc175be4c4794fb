//! HTTP routing
//!
//! Exact free routes are served without the payment gate. Everything else, including
//! the catch-all fallback, sits behind it; free paths pass straight through.

use crate::config::GatewayConfig;
use crate::facilitator::Facilitator;
use crate::middleware::{payment_gate, PaymentGate, PaymentGateConfig};
use crate::policy::PolicyBuilder;
use crate::proxy::OriginProxy;
use crate::Result;
use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod handlers;


/// Shared, read-only state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gate: PaymentGate,
    pub proxy: OriginProxy,
}

impl AppState {
    /// Wire the gate and proxy from configuration
    pub fn new(config: GatewayConfig, facilitator: Option<Arc<dyn Facilitator>>) -> Result<Self> {
        let proxy = OriginProxy::from_config(&config)?;

        let mut gate = PaymentGate::new(
            PaymentGateConfig::from_gateway_config(&config),
            PolicyBuilder::new(config.policies.clone()),
        );
        if let Some(facilitator) = facilitator {
            gate = gate.with_facilitator(facilitator);
        }

        Ok(Self {
            config: Arc::new(config),
            gate,
            proxy,
        })
    }
}

/// Build the gateway router
///
/// Each fixed route also answers with a trailing slash, matching the policy table's
/// normalization.
pub fn build_router(state: AppState) -> Router {
    let free = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/ready/", get(handlers::ready));

    // Other methods on the gated paths fall through to the origin.
    let gated = Router::new()
        .route(
            "/gated/{resource}",
            get(handlers::gated).fallback(handlers::catch_all),
        )
        .route(
            "/gated/{resource}/",
            get(handlers::gated).fallback(handlers::catch_all),
        )
        .route("/paid", get(handlers::paid).fallback(handlers::catch_all))
        .route("/paid/", get(handlers::paid).fallback(handlers::catch_all))
        .fallback(handlers::catch_all)
        .layer(from_fn_with_state(state.gate.clone(), payment_gate));

    free.merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
