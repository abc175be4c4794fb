//! Payment gate configuration

use crate::config::{vars, GatewayConfig};
use crate::policy::AccessPolicy;
use crate::types::{networks, schemes, to_atomic_units, PaymentRequirements};
use crate::{GatewayError, Result};
use serde_json::{json, Value};

/// Settings the payment gate reads on every priced request
#[derive(Debug, Clone)]
pub struct PaymentGateConfig {
    /// Receiving wallet address
    pub pay_to: Option<String>,
    /// Treat every request as paid without asking the facilitator
    pub short_circuit: bool,
    /// Maximum timeout offered to the payer, in seconds
    pub max_timeout_seconds: u32,
    /// Public root URL used to build resource URLs (defaults to the request's host)
    pub resource_root_url: Option<String>,
}

impl Default for PaymentGateConfig {
    fn default() -> Self {
        Self {
            pay_to: None,
            short_circuit: false,
            max_timeout_seconds: 60,
            resource_root_url: None,
        }
    }
}

impl PaymentGateConfig {
    /// Create a new payment gate config
    pub fn new(pay_to: Option<String>) -> Self {
        Self {
            pay_to,
            ..Self::default()
        }
    }

    /// Derive the gate settings from the gateway configuration
    pub fn from_gateway_config(config: &GatewayConfig) -> Self {
        Self::new(config.pay_to.clone()).with_short_circuit(config.short_circuit)
    }

    /// Set the short-circuit switch
    pub fn with_short_circuit(mut self, short_circuit: bool) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    /// Set the maximum timeout
    pub fn with_max_timeout_seconds(mut self, max_timeout_seconds: u32) -> Self {
        self.max_timeout_seconds = max_timeout_seconds;
        self
    }

    /// Set the resource root URL
    pub fn with_resource_root_url(mut self, url: impl Into<String>) -> Self {
        self.resource_root_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Receiving address, failing fast when it is not configured
    pub fn require_pay_to(&self) -> Result<&str> {
        self.pay_to
            .as_deref()
            .ok_or(GatewayError::missing_config(vars::ADDRESS))
    }

    /// Create payment requirements for a priced policy
    ///
    /// `resource` is the full URL of the requested resource and `method` the inbound
    /// HTTP method, both advertised in the challenge.
    pub fn create_payment_requirements(
        &self,
        policy: &AccessPolicy,
        resource: &str,
        method: &str,
    ) -> Result<PaymentRequirements> {
        let pay_to = self.require_pay_to()?;

        let asset = networks::get_usdc_address(&policy.network).ok_or_else(|| {
            GatewayError::NetworkNotSupported {
                network: policy.network.clone(),
            }
        })?;

        let mut requirements = PaymentRequirements::new(
            schemes::EXACT,
            policy.network.clone(),
            to_atomic_units(policy.price),
            asset,
            pay_to,
            resource,
            policy.description.clone(),
        );

        requirements.mime_type = Some(
            policy
                .mime_type
                .clone()
                .unwrap_or_else(|| "application/json".to_string()),
        );
        requirements.output_schema = Some(Self::output_schema(policy, method));
        requirements.max_timeout_seconds = self.max_timeout_seconds;
        requirements.set_usdc_info()?;

        Ok(requirements)
    }

    /// Discovery schema: the HTTP input description merged with the policy's schemas
    fn output_schema(policy: &AccessPolicy, method: &str) -> Value {
        let mut input = json!({
            "type": "http",
            "method": method.to_uppercase(),
            "discoverable": true,
        });
        if let (Some(Value::Object(extra)), Value::Object(target)) =
            (policy.input_schema.as_ref(), &mut input)
        {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }

        json!({
            "input": input,
            "output": policy.output_schema.clone().unwrap_or(Value::Null),
        })
    }
}
