//! Payment-related types

use super::constants::networks;
use base64::{engine::general_purpose, Engine as _};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// x402 protocol version
pub const X402_VERSION: u32 = 1;

/// Decimal places of the settlement token (USDC)
pub const USDC_DECIMALS: u32 = 6;

/// Payment requirements for a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequirements {
    /// Payment scheme identifier (e.g., "exact")
    pub scheme: String,
    /// Blockchain network identifier (e.g., "base", "base-sepolia")
    pub network: String,
    /// Required payment amount in atomic token units
    #[serde(rename = "maxAmountRequired")]
    pub max_amount_required: String,
    /// Token contract address
    pub asset: String,
    /// Recipient wallet address for the payment
    #[serde(rename = "payTo")]
    pub pay_to: String,
    /// URL of the protected resource
    pub resource: String,
    /// Human-readable description of the resource
    pub description: String,
    /// MIME type of the expected response
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// JSON schema describing the request and response format
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Maximum time allowed for payment completion in seconds
    #[serde(rename = "maxTimeoutSeconds")]
    pub max_timeout_seconds: u32,
    /// Scheme-specific additional information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

impl PaymentRequirements {
    /// Create a new payment requirements instance
    pub fn new(
        scheme: impl Into<String>,
        network: impl Into<String>,
        max_amount_required: impl Into<String>,
        asset: impl Into<String>,
        pay_to: impl Into<String>,
        resource: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            network: network.into(),
            max_amount_required: max_amount_required.into(),
            asset: asset.into(),
            pay_to: pay_to.into(),
            resource: resource.into(),
            description: description.into(),
            mime_type: None,
            output_schema: None,
            max_timeout_seconds: 60,
            extra: None,
        }
    }

    /// Set the token's EIP-712 domain information in the extra field
    pub fn set_usdc_info(&mut self) -> crate::Result<()> {
        let name = networks::get_usdc_name(&self.network).ok_or_else(|| {
            crate::GatewayError::NetworkNotSupported {
                network: self.network.clone(),
            }
        })?;

        let mut usdc_info = HashMap::new();
        usdc_info.insert("name".to_string(), name.to_string());
        usdc_info.insert("version".to_string(), "2".to_string());

        self.extra = Some(serde_json::to_value(usdc_info)?);
        Ok(())
    }
}

/// Convert a USD price into atomic USDC units
pub fn to_atomic_units(price: Decimal) -> String {
    (price * Decimal::from(10u64.pow(USDC_DECIMALS)))
        .trunc()
        .normalize()
        .to_string()
}

/// Payment proof attached to an inbound request
///
/// The gateway only unwraps the transport encoding (base64 JSON) so the proof can be
/// embedded in a facilitator request; its fields are never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    raw: String,
}

impl PaymentProof {
    /// Wrap the raw header value
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The header value exactly as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decode into the opaque JSON payload forwarded to the facilitator
    pub fn to_payload(&self) -> crate::Result<Value> {
        let decoded = general_purpose::STANDARD.decode(self.raw.trim())?;
        let payload: Value = serde_json::from_slice(&decoded)?;
        if !payload.is_object() {
            return Err(crate::GatewayError::validation(
                "payment payload must be a JSON object",
            ));
        }
        Ok(payload)
    }
}

/// Payment requirements response (HTTP 402 response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequirementsResponse {
    /// Protocol version
    #[serde(rename = "x402Version")]
    pub x402_version: u32,
    /// Human-readable error message
    pub error: String,
    /// Array of acceptable payment methods
    pub accepts: Vec<PaymentRequirements>,
    /// Payer reported by the facilitator, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl PaymentRequirementsResponse {
    /// Create a new payment requirements response
    pub fn new(error: impl Into<String>, accepts: Vec<PaymentRequirements>) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: error.into(),
            accepts,
            payer: None,
        }
    }

    /// Attach the payer address
    pub fn with_payer(mut self, payer: Option<String>) -> Self {
        self.payer = payer;
        self
    }
}
