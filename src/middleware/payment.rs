//! Payment gate implementation

use super::config::PaymentGateConfig;
use crate::config::vars;
use crate::facilitator::Facilitator;
use crate::policy::{PolicyBuilder, PolicyTable};
use crate::types::{
    headers, PaymentProof, PaymentRequirements, PaymentRequirementsResponse, SettleResponse,
};
use crate::{GatewayError, Result};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Challenge text when no proof was supplied
pub const MISSING_PAYMENT_ERROR: &str = "X-PAYMENT header is required";
/// Challenge text when the proof cannot be decoded
pub const MALFORMED_PAYMENT_ERROR: &str = "Invalid or malformed payment header";

/// Decides whether a request may proceed, asking the facilitator when a policy prices it
#[derive(Clone)]
pub struct PaymentGate {
    pub config: Arc<PaymentGateConfig>,
    pub facilitator: Option<Arc<dyn Facilitator>>,
    pub policies: PolicyBuilder,
}

impl std::fmt::Debug for PaymentGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGate")
            .field("config", &self.config)
            .field("facilitator", &self.facilitator.as_ref().map(|_| "<facilitator>"))
            .field("policies", &self.policies)
            .finish()
    }
}

/// Outcome of gating one request
#[derive(Debug)]
pub enum PaymentResult {
    /// No priced policy applies, or the gate is short-circuited
    Free { response: Response },
    /// Payment verified, handler ran, settlement attempted where applicable
    Paid {
        response: Response,
        settlement: Option<SettleResponse>,
    },
    /// No usable proof was supplied (402)
    PaymentRequired { response: Response },
    /// The facilitator rejected the proof (402)
    VerificationFailed { response: Response },
    /// The facilitator could not settle after the handler succeeded (402)
    SettlementFailed { response: Response },
}

impl PaymentResult {
    pub fn into_response(self) -> Response {
        match self {
            PaymentResult::Free { response }
            | PaymentResult::Paid { response, .. }
            | PaymentResult::PaymentRequired { response }
            | PaymentResult::VerificationFailed { response }
            | PaymentResult::SettlementFailed { response } => response,
        }
    }
}

impl PaymentGate {
    /// Create a new payment gate
    pub fn new(config: PaymentGateConfig, policies: PolicyBuilder) -> Self {
        Self {
            config: Arc::new(config),
            facilitator: None,
            policies,
        }
    }

    /// Set the facilitator
    pub fn with_facilitator(mut self, facilitator: Arc<dyn Facilitator>) -> Self {
        self.facilitator = Some(facilitator);
        self
    }

    /// Get the gate configuration
    pub fn config(&self) -> &PaymentGateConfig {
        &self.config
    }

    fn require_facilitator(&self) -> Result<&Arc<dyn Facilitator>> {
        self.facilitator
            .as_ref()
            .ok_or(GatewayError::missing_config(vars::FACILITATOR_URL))
    }

    /// Gate one request against the policy table built for it
    ///
    /// Verification always completes before `next` runs. Configuration problems are
    /// reported as errors before the proof is even looked at.
    pub async fn evaluate(
        &self,
        table: &PolicyTable,
        request: Request,
        next: Next,
    ) -> Result<PaymentResult> {
        if self.config.short_circuit {
            return Ok(PaymentResult::Free {
                response: next.run(request).await,
            });
        }

        let path = request.uri().path().to_string();
        let policy = match table.priced_policy_for(&path) {
            Some(policy) => Arc::clone(policy),
            None => {
                return Ok(PaymentResult::Free {
                    response: next.run(request).await,
                })
            }
        };

        let facilitator = Arc::clone(self.require_facilitator()?);
        let resource = self.resource_url(&request);
        let requirements = self.config.create_payment_requirements(
            &policy,
            &resource,
            request.method().as_str(),
        )?;

        let proof = request
            .headers()
            .get(headers::X_PAYMENT)
            .and_then(|value| value.to_str().ok())
            .map(PaymentProof::new);

        let proof = match proof {
            Some(proof) => proof,
            None => {
                tracing::debug!(path = %path, "Payment required");
                return Ok(PaymentResult::PaymentRequired {
                    response: payment_required_response(MISSING_PAYMENT_ERROR, &requirements, None),
                });
            }
        };

        let payload = match proof.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Malformed payment header");
                return Ok(PaymentResult::PaymentRequired {
                    response: payment_required_response(
                        MALFORMED_PAYMENT_ERROR,
                        &requirements,
                        None,
                    ),
                });
            }
        };

        let verdict = match facilitator.verify(&payload, &requirements).await {
            Ok(verdict) => verdict,
            Err(e @ GatewayError::Timeout { .. }) => return Err(e),
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Payment verification errored");
                return Ok(PaymentResult::VerificationFailed {
                    response: payment_required_response(&e.to_string(), &requirements, None),
                });
            }
        };

        if !verdict.is_valid {
            let reason = verdict
                .invalid_reason
                .unwrap_or_else(|| "Payment verification failed".to_string());
            tracing::info!(path = %path, reason = %reason, "Payment rejected");
            return Ok(PaymentResult::VerificationFailed {
                response: payment_required_response(&reason, &requirements, verdict.payer),
            });
        }

        tracing::debug!(path = %path, payer = ?verdict.payer, "Payment verified");
        let response = next.run(request).await;

        self.settle(facilitator.as_ref(), &payload, &requirements, response)
            .await
    }

    /// Settle after a successful handler response and attach the receipt
    ///
    /// Responses with a status of 400 or above are returned untouched and unsettled.
    async fn settle(
        &self,
        facilitator: &dyn Facilitator,
        payload: &Value,
        requirements: &PaymentRequirements,
        mut response: Response,
    ) -> Result<PaymentResult> {
        if response.status().as_u16() >= 400 {
            tracing::debug!(
                status = %response.status(),
                resource = %requirements.resource,
                "Skipping settlement for unsuccessful response"
            );
            return Ok(PaymentResult::Paid {
                response,
                settlement: None,
            });
        }

        let settlement = match facilitator.settle(payload, requirements).await {
            Ok(settlement) => settlement,
            Err(e @ GatewayError::Timeout { .. }) => return Err(e),
            Err(e) => {
                tracing::error!(
                    resource = %requirements.resource,
                    error = %e,
                    "Settlement errored"
                );
                return Ok(PaymentResult::SettlementFailed {
                    response: payment_required_response(&e.to_string(), requirements, None),
                });
            }
        };

        if !settlement.success {
            let reason = settlement
                .error_reason
                .clone()
                .unwrap_or_else(|| "Payment settlement failed".to_string());
            tracing::warn!(
                resource = %requirements.resource,
                reason = %reason,
                "Settlement rejected"
            );
            return Ok(PaymentResult::SettlementFailed {
                response: payment_required_response(&reason, requirements, settlement.payer),
            });
        }

        let receipt = settlement.to_base64()?;
        match HeaderValue::from_str(&receipt) {
            Ok(value) => {
                response
                    .headers_mut()
                    .insert(headers::X_PAYMENT_RESPONSE, value);
            }
            Err(e) => {
                return Err(GatewayError::internal(format!(
                    "Failed to encode settlement header: {}",
                    e
                )))
            }
        }

        tracing::info!(
            resource = %requirements.resource,
            transaction = %settlement.transaction,
            "Payment settled"
        );

        Ok(PaymentResult::Paid {
            response,
            settlement: Some(settlement),
        })
    }

    /// Full URL of the requested resource, as advertised in the challenge
    fn resource_url(&self, request: &Request) -> String {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");

        if let Some(root) = &self.config.resource_root_url {
            return format!("{}{}", root, path_and_query);
        }

        let host = request
            .headers()
            .get(axum::http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| request.uri().authority().map(|a| a.as_str()));

        match host {
            Some(host) => {
                let scheme = request
                    .headers()
                    .get("x-forwarded-proto")
                    .and_then(|value| value.to_str().ok())
                    .or_else(|| request.uri().scheme_str())
                    .unwrap_or("http");
                format!("{}://{}{}", scheme, host, path_and_query)
            }
            None => path_and_query.to_string(),
        }
    }
}

/// Build the 402 challenge response
pub fn payment_required_response(
    error: &str,
    requirements: &PaymentRequirements,
    payer: Option<String>,
) -> Response {
    let body =
        PaymentRequirementsResponse::new(error, vec![requirements.clone()]).with_payer(payer);
    (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
}

/// Axum middleware function for the payment gate
///
/// Builds the policy table for the request's path and gates it.
pub async fn payment_gate(
    State(gate): State<PaymentGate>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let table = gate.policies.build(request.uri().path());
    let result = gate.evaluate(&table, request, next).await?;
    Ok(result.into_response())
}
