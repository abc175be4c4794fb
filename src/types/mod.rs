//! Core x402 types used by the gateway
//!
//! This module defines the wire structures exchanged with clients (402 challenges,
//! payment proofs, settlement receipts) and with the facilitator (verify/settle
//! verdicts).
//!
//! # Architecture
//!
//! - [`payment`] - Payment requirements, the opaque payment proof and the 402 body
//! - [`facilitator`] - Facilitator configuration and response types
//! - [`constants`] - Protocol constants (networks, schemes, header names)
//!
//! # Examples
//!
//! ```
//! use x402_edge_gateway::types::{PaymentRequirements, networks, schemes};
//!
//! # fn example() -> x402_edge_gateway::Result<()> {
//! let mut requirements = PaymentRequirements::new(
//!     schemes::EXACT,
//!     networks::BASE_MAINNET,
//!     "10000000",                                       // $10.00 in USDC units
//!     networks::get_usdc_address("base").unwrap(),
//!     "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
//!     "https://gateway.example.com/gated/my-post",
//!     "Gated post",
//! );
//! requirements.set_usdc_info()?;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod facilitator;
pub mod payment;

// Re-export commonly used types
pub use constants::{headers, networks, schemes};
pub use facilitator::{
    AuthHeadersFn, AuthHeadersFnArc, AuthHeadersFnBox, FacilitatorConfig, SettleResponse,
    VerifyResponse,
};
pub use payment::{
    to_atomic_units, PaymentProof, PaymentRequirements, PaymentRequirementsResponse,
    USDC_DECIMALS, X402_VERSION,
};
