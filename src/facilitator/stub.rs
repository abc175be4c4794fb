//! In-process facilitator for tests

use super::Facilitator;
use crate::types::{PaymentRequirements, SettleResponse, VerifyResponse};
use crate::{GatewayError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEST_PAYER: &str = "0x857b06519E91e3A54538791bDbb0E22373e36b66";
pub const TEST_TRANSACTION: &str =
    "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

/// Canned verdicts plus call counters
pub struct StubFacilitator {
    verdict: VerifyResponse,
    settle_success: bool,
    timeout: bool,
    pub verify_calls: AtomicUsize,
    pub settle_calls: AtomicUsize,
    pub last_requirements: Mutex<Option<PaymentRequirements>>,
}

impl StubFacilitator {
    pub fn allowing() -> Self {
        Self::with_verdict(VerifyResponse::valid(Some(TEST_PAYER.to_string())))
    }

    pub fn denying(reason: &str) -> Self {
        Self::with_verdict(VerifyResponse::invalid(reason, Some(TEST_PAYER.to_string())))
    }

    pub fn timing_out() -> Self {
        Self {
            timeout: true,
            ..Self::allowing()
        }
    }

    pub fn failing_settlement() -> Self {
        Self {
            settle_success: false,
            ..Self::allowing()
        }
    }

    fn with_verdict(verdict: VerifyResponse) -> Self {
        Self {
            verdict,
            settle_success: true,
            timeout: false,
            verify_calls: AtomicUsize::new(0),
            settle_calls: AtomicUsize::new(0),
            last_requirements: Mutex::new(None),
        }
    }

    pub fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn settle_count(&self) -> usize {
        self.settle_calls.load(Ordering::SeqCst)
    }

    pub fn last_requirements(&self) -> Option<PaymentRequirements> {
        self.last_requirements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Facilitator for StubFacilitator {
    async fn verify(
        &self,
        _payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_requirements.lock().unwrap() = Some(payment_requirements.clone());
        if self.timeout {
            return Err(GatewayError::Timeout {
                target: "facilitator",
            });
        }
        Ok(self.verdict.clone())
    }

    async fn settle(
        &self,
        _payment_payload: &Value,
        payment_requirements: &PaymentRequirements,
    ) -> Result<SettleResponse> {
        self.settle_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SettleResponse {
            success: self.settle_success,
            error_reason: (!self.settle_success).then(|| "settlement_failed".to_string()),
            transaction: if self.settle_success {
                TEST_TRANSACTION.to_string()
            } else {
                String::new()
            },
            network: payment_requirements.network.clone(),
            payer: Some(TEST_PAYER.to_string()),
        })
    }
}

/// A well-formed X-PAYMENT header value
pub fn encoded_payment_header() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let payload = serde_json::json!({
        "x402Version": 1,
        "scheme": "exact",
        "network": "base",
        "payload": {
            "signature": "0x2d6a7588d6acca505cbf0d9a4a227e0c52c6c34008c8e8986a1283259764173608a2ce6496642e377d6da8dbbf5836e9bd15092f9ecab05ded3d6293af148b571c",
            "authorization": {
                "from": TEST_PAYER,
                "to": "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
                "value": "10000000",
                "validAfter": "1745323800",
                "validBefore": "1745323985",
                "nonce": "0xf3746613c2d920b5fdabc0856f2aeb2d4f88ee6037b8cc5d04a71a4462f13480"
            }
        }
    });
    general_purpose::STANDARD.encode(payload.to_string())
}
