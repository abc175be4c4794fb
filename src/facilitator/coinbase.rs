//! Coinbase CDP facilitator integration
//!
//! The managed facilitator authenticates every call with a short-lived JWT bound to the
//! HTTP method and path of that call.

use crate::crypto::jwt;
use crate::types::FacilitatorConfig;
use crate::{GatewayError, Result};
use std::collections::HashMap;

/// Coinbase facilitator base URL
pub const COINBASE_FACILITATOR_BASE_URL: &str = "https://api.cdp.coinbase.com";
/// Coinbase facilitator v2 route
pub const COINBASE_FACILITATOR_V2_ROUTE: &str = "/platform/v2/x402";
/// SDK version reported in the correlation header
pub const SDK_VERSION: &str = "0.1.0";

/// Create authentication headers for Coinbase facilitator
pub fn create_auth_headers(
    api_key_id: &str,
    api_key_secret: &str,
) -> impl Fn() -> Result<HashMap<String, HashMap<String, String>>> + Send + Sync {
    let api_key_id = api_key_id.to_string();
    let api_key_secret = api_key_secret.to_string();

    move || {
        if api_key_id.is_empty() || api_key_secret.is_empty() {
            return Err(GatewayError::config(
                "Missing credentials: CDP_API_KEY_ID and CDP_API_KEY_SECRET must be set",
            ));
        }

        let correlation_header = create_correlation_header();
        let mut headers = HashMap::new();

        for operation in ["verify", "settle"] {
            let token = jwt::create_auth_header_with_method(
                &api_key_id,
                &api_key_secret,
                "POST",
                COINBASE_FACILITATOR_BASE_URL,
                &format!("{}/{}", COINBASE_FACILITATOR_V2_ROUTE, operation),
            )?;

            let mut operation_headers = HashMap::new();
            operation_headers.insert("Authorization".to_string(), token);
            operation_headers.insert(
                "Correlation-Context".to_string(),
                correlation_header.clone(),
            );
            headers.insert(operation.to_string(), operation_headers);
        }

        Ok(headers)
    }
}

/// Create a facilitator config for Coinbase
pub fn create_facilitator_config(api_key_id: &str, api_key_secret: &str) -> FacilitatorConfig {
    FacilitatorConfig::new(format!(
        "{}{}",
        COINBASE_FACILITATOR_BASE_URL, COINBASE_FACILITATOR_V2_ROUTE
    ))
    .with_auth_headers(Box::new(create_auth_headers(api_key_id, api_key_secret)))
}

/// Create correlation header for requests
fn create_correlation_header() -> String {
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

    let data = [
        ("sdk_version", SDK_VERSION),
        ("sdk_language", "rust"),
        ("source", "x402-edge-gateway"),
        ("source_version", crate::VERSION),
    ];

    let pairs: Vec<String> = data
        .iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, NON_ALPHANUMERIC)))
        .collect();

    pairs.join(",")
}
