//! Payment gate middleware
//!
//! Every inbound request passes through [`payment_gate`], which builds the policy table
//! for the request's path and decides whether the request may proceed.
//!
//! # Architecture
//!
//! - [`config`] - Gate settings and payment requirements builder
//! - [`payment`] - The gate itself and its axum middleware function
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use x402_edge_gateway::facilitator::FacilitatorClient;
//! use x402_edge_gateway::middleware::{payment_gate, PaymentGate, PaymentGateConfig};
//! use x402_edge_gateway::policy::PolicyBuilder;
//! use x402_edge_gateway::types::FacilitatorConfig;
//!
//! # fn example() -> x402_edge_gateway::Result<()> {
//! let config = FacilitatorConfig::new("https://x402.org/facilitator");
//! let facilitator = FacilitatorClient::new(config)?;
//! let gate = PaymentGate::new(
//!     PaymentGateConfig::new(Some("0x209693Bc6afc0C5328bA36FaF03C514EF312287C".to_string())),
//!     PolicyBuilder::default(),
//! )
//! .with_facilitator(Arc::new(facilitator));
//!
//! let app: Router = Router::new()
//!     .route("/paid", get(|| async { "paid content" }))
//!     .layer(axum::middleware::from_fn_with_state(gate, payment_gate));
//! # Ok(())
//! # }
//! ```
//!
//! # Payment Flow
//!
//! 1. No priced policy for the path → handler runs
//! 2. Priced path without X-PAYMENT header → 402 Payment Required
//! 3. X-PAYMENT present → facilitator verifies it
//! 4. Verified → handler runs
//! 5. Handler succeeds → payment settled, X-PAYMENT-RESPONSE attached

pub mod config;
pub mod payment;

#[cfg(test)]
mod tests;

pub use config::PaymentGateConfig;
pub use payment::{payment_gate, payment_required_response, PaymentGate, PaymentResult};
