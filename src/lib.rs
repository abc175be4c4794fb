//! # x402 edge gateway
//!
//! An HTTP gateway that sits in front of an origin site and charges for selected paths
//! using the x402 payment protocol (HTTP 402 Payment Required).
//!
//! ## Request flow
//!
//! 1. `/health` and `/ready` are answered directly.
//! 2. Every other request passes the payment gate. A per-request policy table decides
//!    whether the path is priced; priced requests must carry an `X-PAYMENT` proof that
//!    the facilitator accepts.
//! 3. `/gated/{resource}` is fetched from the origin's protected `/paid/{resource}` with
//!    Basic auth and returned fully buffered, so the payment can be settled against the
//!    final status.
//! 4. `/paid` answers a fixed JSON body.
//! 5. Anything else is streamed to and from the origin unchanged.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use x402_edge_gateway::{
//!     facilitator::{Facilitator, FacilitatorClient},
//!     routes::{build_router, AppState},
//!     server::ServerBuilder,
//!     GatewayConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> x402_edge_gateway::Result<()> {
//!     let config = GatewayConfig::from_env()?;
//!
//!     let facilitator = match config.facilitator_config() {
//!         Some(facilitator_config) => Some(
//!             Arc::new(FacilitatorClient::new(facilitator_config)?) as Arc<dyn Facilitator>,
//!         ),
//!         None => None,
//!     };
//!
//!     let bind_address = config.bind_address.clone();
//!     let router = build_router(AppState::new(config, facilitator)?);
//!     ServerBuilder::new(router).bind(bind_address).serve().await
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`config`**: Startup configuration read from the environment
//! - **`policy`**: Per-request access policy tables
//! - **`middleware`**: The payment gate
//! - **`facilitator`**: Payment verification and settlement
//! - **`proxy`**: Buffered and streaming forwarding to the origin
//! - **`routes`**: Router and handlers
//! - **`server`**: Listener and graceful shutdown
//! - **`types`**: x402 wire types
//! - **`crypto`**: JWTs for the managed facilitator
//! - **`error`**: Error handling

pub mod config;
pub mod crypto;
pub mod error;
pub mod facilitator;
pub mod middleware;
pub mod policy;
pub mod proxy;
pub mod routes;
pub mod server;
pub mod types;

// Re-exports for convenience
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use types::X402_VERSION;

/// Current version of the gateway
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
