//! Facilitator client for payment verification and settlement
//!
//! A facilitator is the external service that judges payment proofs and settles them on
//! chain. The gateway never inspects a proof itself; it only builds the request the
//! facilitator expects and interprets the verdict.
//!
//! # Architecture
//!
//! - [`Facilitator`] - The seam the payment gate talks to
//! - [`FacilitatorClient`] - HTTP implementation against a facilitator service
//! - [`coinbase`] - Coinbase CDP (managed) facilitator configuration
//!
//! # Examples
//!
//! ```no_run
//! use x402_edge_gateway::facilitator::{Facilitator, FacilitatorClient};
//! use x402_edge_gateway::types::{FacilitatorConfig, PaymentRequirements};
//!
//! # async fn example(payload: serde_json::Value, requirements: PaymentRequirements)
//! #     -> x402_edge_gateway::Result<()> {
//! let config = FacilitatorConfig::new("https://x402.org/facilitator");
//! let client = FacilitatorClient::new(config)?;
//!
//! let verdict = client.verify(&payload, &requirements).await?;
//! if verdict.is_valid {
//!     let receipt = client.settle(&payload, &requirements).await?;
//!     println!("Payment settled: {}", receipt.transaction);
//! }
//! # Ok(())
//! # }
//! ```

use crate::types::{
    FacilitatorConfig, PaymentRequirements, SettleResponse, VerifyResponse, X402_VERSION,
};
use crate::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

pub mod coinbase;

#[cfg(test)]
pub(crate) mod stub;

/// Default facilitator URL
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Verification and settlement of payment proofs
///
/// `payment_payload` is the decoded proof, passed through untouched.
#[async_trait]
pub trait Facilitator: Send + Sync {
    /// Judge a payment proof against the requirements without settling it
    async fn verify(
        &self,
        payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse>;

    /// Settle a verified payment
    async fn settle(
        &self,
        payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse>;
}

/// Facilitator client for verifying and settling payments over HTTP
#[derive(Clone)]
pub struct FacilitatorClient {
    /// Base URL of the facilitator service
    url: String,
    /// HTTP client
    client: Client,
    /// Configuration for authentication headers
    auth_config: Option<crate::types::AuthHeadersFnArc>,
}

impl std::fmt::Debug for FacilitatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorClient")
            .field("url", &self.url)
            .field("auth_config", &"<function>")
            .finish()
    }
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> Result<Self> {
        config.validate()?;

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            client,
            auth_config: config.create_auth_headers,
        })
    }

    /// Get the base URL of this facilitator
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(payment_payload: &Value, payment_requirements: &PaymentRequirements) -> Value {
        json!({
            "x402Version": X402_VERSION,
            "paymentPayload": payment_payload,
            "paymentRequirements": payment_requirements,
        })
    }

    /// Add the per-operation authentication headers, if configured
    fn with_auth_headers(
        &self,
        mut request: RequestBuilder,
        operation: &str,
    ) -> Result<RequestBuilder> {
        if let Some(auth_config) = &self.auth_config {
            let headers = auth_config()?;
            if let Some(operation_headers) = headers.get(operation) {
                for (key, value) in operation_headers {
                    request = request.header(key, value);
                }
            }
        }
        Ok(request)
    }
}

#[async_trait]
impl Facilitator for FacilitatorClient {
    async fn verify(
        &self,
        payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        let request_body = Self::request_body(payment_payload, payment_requirements);

        tracing::debug!(
            url = %self.url,
            resource = %payment_requirements.resource,
            "Sending facilitator verify request"
        );

        let request = self
            .client
            .post(format!("{}/verify", self.url))
            .json(&request_body);
        let request = self.with_auth_headers(request, "verify")?;

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, "facilitator"))?;
        let status = response.status();

        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                status = %status,
                body = %response_body,
                "Facilitator verify failed"
            );
            return Err(GatewayError::facilitator_error(format!(
                "Verification failed with status: {}. Response: {}",
                status, response_body
            )));
        }

        let verify_response: VerifyResponse = response.json().await?;
        Ok(verify_response)
    }

    async fn settle(
        &self,
        payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        let request_body = Self::request_body(payment_payload, payment_requirements);

        let request = self
            .client
            .post(format!("{}/settle", self.url))
            .json(&request_body);
        let request = self.with_auth_headers(request, "settle")?;

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, "facilitator"))?;

        if !response.status().is_success() {
            return Err(GatewayError::facilitator_error(format!(
                "Settlement failed with status: {}",
                response.status()
            )));
        }

        let settle_response: SettleResponse = response.json().await?;
        Ok(settle_response)
    }
}
