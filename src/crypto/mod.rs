//! Cryptographic helpers
//!
//! The gateway never verifies payment signatures itself; the only cryptography it performs
//! is signing bearer tokens for a managed facilitator.
//!
//! - [`jwt`] - JWT generation for Coinbase CDP API authentication
//!
//! ```no_run
//! use x402_edge_gateway::crypto::jwt;
//!
//! # fn example() -> x402_edge_gateway::Result<()> {
//! let auth_header = jwt::create_auth_header_with_method(
//!     "api_key_id",
//!     "api_key_secret",
//!     "POST",
//!     "api.cdp.coinbase.com",
//!     "/platform/v2/x402/verify",
//! )?;
//! println!("Authorization: {}", auth_header);
//! # Ok(())
//! # }
//! ```

pub mod jwt;

pub use jwt::{create_auth_header_with_method, generate_jwt, JwtOptions};
