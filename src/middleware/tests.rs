//! Tests for the payment gate

use super::config::PaymentGateConfig;
use super::payment::{payment_gate, PaymentGate, MALFORMED_PAYMENT_ERROR, MISSING_PAYMENT_ERROR};
use crate::facilitator::stub::{encoded_payment_header, StubFacilitator, TEST_PAYER};
use crate::policy::{AccessPolicy, PolicyBuilder};
use crate::types::{headers, SettleResponse};
use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;

const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

fn gate(facilitator: Option<Arc<StubFacilitator>>) -> PaymentGate {
    let gate = PaymentGate::new(
        PaymentGateConfig::new(Some(PAY_TO.to_string())),
        PolicyBuilder::default(),
    );
    match facilitator {
        Some(facilitator) => gate.with_facilitator(facilitator),
        None => gate,
    }
}

async fn post(Path(resource): Path<String>) -> (StatusCode, String) {
    if resource == "missing" {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else {
        (StatusCode::OK, format!("post {}", resource))
    }
}

fn app(gate: PaymentGate) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/paid", get(|| async { "paid content" }))
        .route("/gated/{resource}", get(post))
        .route("/gated/{resource}/", get(post))
        .layer(axum::middleware::from_fn_with_state(gate, payment_gate))
}

fn request(uri: &str, payment: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header("host", "gateway.example.com");
    if let Some(payment) = payment {
        builder = builder.header(headers::X_PAYMENT, payment);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_payment_requirements_creation() {
    let config = PaymentGateConfig::new(Some(PAY_TO.to_string()));
    let policy = AccessPolicy::priced(
        "/gated/my-post",
        Decimal::from_str("10.00").unwrap(),
        "base",
        "Gated post",
    );

    let requirements = config
        .create_payment_requirements(&policy, "https://gateway.example.com/gated/my-post", "get")
        .unwrap();

    assert_eq!(requirements.scheme, "exact");
    assert_eq!(requirements.network, "base");
    assert_eq!(requirements.max_amount_required, "10000000");
    assert_eq!(requirements.pay_to, PAY_TO);
    assert_eq!(requirements.description, "Gated post");
    assert_eq!(requirements.max_timeout_seconds, 60);
    assert_eq!(requirements.mime_type.as_deref(), Some("application/json"));
    let schema = requirements.output_schema.unwrap();
    assert_eq!(schema["input"]["method"], "GET");
    assert_eq!(schema["input"]["discoverable"], true);
}

#[test]
fn test_payment_requirements_unsupported_network() {
    let config = PaymentGateConfig::new(Some(PAY_TO.to_string()));
    let policy = AccessPolicy::priced("/paid", Decimal::new(1, 3), "solana", "Static testing");
    let result = config.create_payment_requirements(&policy, "/paid", "GET");
    assert!(matches!(
        result,
        Err(crate::GatewayError::NetworkNotSupported { .. })
    ));
}

#[test]
fn test_payment_requirements_without_pay_to() {
    let config = PaymentGateConfig::default();
    let policy = AccessPolicy::priced("/paid", Decimal::new(1, 3), "base", "Static testing");
    let result = config.create_payment_requirements(&policy, "/paid", "GET");
    assert!(matches!(
        result,
        Err(crate::GatewayError::MissingConfig { name: "ADDRESS" })
    ));
}

#[test]
fn test_gate_config_builder() {
    let config = PaymentGateConfig::new(None)
        .with_short_circuit(true)
        .with_max_timeout_seconds(120)
        .with_resource_root_url("https://gateway.example.com/");

    assert!(config.short_circuit);
    assert_eq!(config.max_timeout_seconds, 120);
    assert_eq!(
        config.resource_root_url.as_deref(),
        Some("https://gateway.example.com")
    );
}

#[tokio::test]
async fn test_free_path_skips_facilitator() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(facilitator.verify_count(), 0);
}

#[tokio::test]
async fn test_missing_payment_header() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/gated/my-post", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["x402Version"], 1);
    assert_eq!(body["error"], MISSING_PAYMENT_ERROR);
    assert_eq!(body["accepts"][0]["maxAmountRequired"], "10000000");
    assert_eq!(
        body["accepts"][0]["resource"],
        "http://gateway.example.com/gated/my-post"
    );
    assert_eq!(facilitator.verify_count(), 0);
}

#[tokio::test]
async fn test_malformed_payment_header() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/paid", Some("not-base64!!")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["error"], MALFORMED_PAYMENT_ERROR);
    assert_eq!(body["accepts"][0]["maxAmountRequired"], "1000");
    assert_eq!(facilitator.verify_count(), 0);
}

#[tokio::test]
async fn test_denied_payment_does_not_reach_handler() {
    let facilitator = Arc::new(StubFacilitator::denying("insufficient_funds"));
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/gated/my-post", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "insufficient_funds");
    assert_eq!(body["payer"], TEST_PAYER);
    assert_eq!(facilitator.verify_count(), 1);
    assert_eq!(facilitator.settle_count(), 0);
}

#[tokio::test]
async fn test_allowed_payment_is_settled() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/gated/my-post", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let receipt = response
        .headers()
        .get(headers::X_PAYMENT_RESPONSE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let decoded = {
        use base64::{engine::general_purpose, Engine as _};
        general_purpose::STANDARD.decode(receipt).unwrap()
    };
    let settlement: SettleResponse = serde_json::from_slice(&decoded).unwrap();
    assert!(settlement.success);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"post my-post");
    assert_eq!(facilitator.verify_count(), 1);
    assert_eq!(facilitator.settle_count(), 1);

    let requirements = facilitator.last_requirements().unwrap();
    assert_eq!(requirements.description, "Gated post");
}

#[tokio::test]
async fn test_trailing_slash_shares_gated_price() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/gated/my-post/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["accepts"][0]["maxAmountRequired"], "10000000");
}

#[tokio::test]
async fn test_unsuccessful_response_is_not_settled() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/gated/missing", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(headers::X_PAYMENT_RESPONSE).is_none());
    assert_eq!(facilitator.verify_count(), 1);
    assert_eq!(facilitator.settle_count(), 0);
}

#[tokio::test]
async fn test_settlement_failure_returns_challenge() {
    let facilitator = Arc::new(StubFacilitator::failing_settlement());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/paid", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "settlement_failed");
    assert_eq!(facilitator.settle_count(), 1);
}

#[tokio::test]
async fn test_short_circuit_bypasses_facilitator() {
    let facilitator = Arc::new(StubFacilitator::denying("insufficient_funds"));
    let gate = PaymentGate::new(
        PaymentGateConfig::new(None).with_short_circuit(true),
        PolicyBuilder::default(),
    )
    .with_facilitator(facilitator.clone());

    let response = app(gate)
        .oneshot(request("/gated/my-post", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(facilitator.verify_count(), 0);
}

#[tokio::test]
async fn test_missing_facilitator_fails_fast() {
    let response = app(gate(None))
        .oneshot(request("/gated/my-post", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "configuration_error");
}

#[tokio::test]
async fn test_missing_pay_to_fails_fast() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let gate = PaymentGate::new(PaymentGateConfig::new(None), PolicyBuilder::default())
        .with_facilitator(facilitator.clone());

    let response = app(gate)
        .oneshot(request("/paid", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(facilitator.verify_count(), 0);
}

#[tokio::test]
async fn test_facilitator_timeout_maps_to_gateway_timeout() {
    let facilitator = Arc::new(StubFacilitator::timing_out());
    let response = app(gate(Some(facilitator.clone())))
        .oneshot(request("/paid", Some(&encoded_payment_header())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(facilitator.settle_count(), 0);
}

#[tokio::test]
async fn test_resource_root_url_overrides_host() {
    let facilitator = Arc::new(StubFacilitator::allowing());
    let gate = PaymentGate::new(
        PaymentGateConfig::new(Some(PAY_TO.to_string()))
            .with_resource_root_url("https://public.example.com"),
        PolicyBuilder::default(),
    )
    .with_facilitator(facilitator);

    let response = app(gate)
        .oneshot(request("/paid?ref=1", None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(
        body["accepts"][0]["resource"],
        "https://public.example.com/paid?ref=1"
    );
}
