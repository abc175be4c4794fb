//! Error types for the gateway
//!
//! Only configuration problems and unexpected internal faults are fatal for a request.
//! Payment denials and upstream non-success statuses are ordinary responses and never
//! travel through this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors raised while routing, gating or proxying a request
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required setting was not provided for this deployment
    #[error("Configuration error: {name} is not set")]
    MissingConfig { name: &'static str },

    /// A setting was provided but is unusable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The policy names a network without a known settlement asset
    #[error("Network not supported: {network}")]
    NetworkNotSupported { network: String },

    /// The facilitator answered with something other than a verdict
    #[error("Facilitator error: {message}")]
    FacilitatorError { message: String },

    /// Facilitator or origin did not answer in time
    #[error("Timeout waiting for {target}")]
    Timeout { target: &'static str },

    /// The inbound request carries parameters the gateway cannot use
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Transport-level failure talking to the facilitator or origin
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing-setting error
    pub fn missing_config(name: &'static str) -> Self {
        Self::MissingConfig { name }
    }

    /// Create a facilitator error
    pub fn facilitator_error(message: impl Into<String>) -> Self {
        Self::FacilitatorError {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Map a reqwest failure, keeping timeouts distinguishable
    pub fn from_transport(err: reqwest::Error, target: &'static str) -> Self {
        if err.is_timeout() {
            Self::Timeout { target }
        } else {
            Self::Http(err)
        }
    }

    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Http(_) | GatewayError::FacilitatorError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MissingConfig { .. }
            | GatewayError::Config { .. }
            | GatewayError::NetworkNotSupported { .. }
            | GatewayError::Json(_)
            | GatewayError::Base64(_)
            | GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::MissingConfig { .. } | GatewayError::Config { .. } => {
                "configuration_error"
            }
            GatewayError::NetworkNotSupported { .. } => "network_not_supported",
            GatewayError::FacilitatorError { .. } => "facilitator_error",
            GatewayError::Timeout { .. } => "gateway_timeout",
            GatewayError::Validation { .. } => "validation_error",
            GatewayError::Http(_) => "upstream_unreachable",
            GatewayError::Json(_) | GatewayError::Base64(_) | GatewayError::Internal { .. } => {
                "internal_error"
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "request rejected");
        }

        // Validation messages are safe to echo; everything else stays in the logs.
        let message = match &self {
            GatewayError::Validation { message } => message.clone(),
            GatewayError::Timeout { .. } => self.to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string(),
        };

        (
            status,
            Json(serde_json::json!({
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response()
    }
}
