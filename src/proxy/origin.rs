//! Buffered forwarding of gated resources

use super::{strip_hop_by_hop, OriginProxy};
use crate::config::BasicCredentials;
use crate::policy::gated_resource_id;
use crate::{GatewayError, Result};
use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode};

/// Upstream path the gated resources live under on the origin
const ORIGIN_PAID_PATH: &str = "/paid";

/// Upstream response, fully read into memory
#[derive(Debug, Clone)]
pub struct ProxiedResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ProxiedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// `Basic` authorization header value for the origin
pub fn basic_auth_header(credentials: &BasicCredentials) -> Result<HeaderValue> {
    let token = general_purpose::STANDARD.encode(format!(
        "{}:{}",
        credentials.username, credentials.password
    ));
    let mut value = HeaderValue::from_str(&format!("Basic {}", token))
        .map_err(|e| GatewayError::config(format!("Invalid origin credentials: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

impl OriginProxy {
    /// Forward a gated request to the origin's protected copy of the resource
    ///
    /// Only the method and headers of `parts` are used; no body is sent. The inbound
    /// `Authorization` header, if any, is replaced.
    pub async fn forward_gated(
        &self,
        request_path: &str,
        parts: &Parts,
        credentials: &BasicCredentials,
    ) -> Result<ProxiedResponse> {
        let resource_id = gated_resource_id(&self.gated_prefix, request_path).ok_or_else(|| {
            GatewayError::validation(format!("No resource id in path: {}", request_path))
        })?;

        let mut headers = strip_hop_by_hop(&parts.headers);
        headers.remove(header::CONTENT_LENGTH);
        headers.insert(header::AUTHORIZATION, basic_auth_header(credentials)?);

        let url = format!("{}{}/{}", self.base_url, ORIGIN_PAID_PATH, resource_id);
        tracing::debug!(url = %url, method = %parts.method, "Forwarding gated request");

        let upstream = self
            .client
            .request(parts.method.clone(), &url)
            .headers(headers)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(e, "origin"))?;

        let status = upstream.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                status_text = %status_text,
                resource = %resource_id,
                "Origin returned non-success status"
            );
        }

        let mut headers = strip_hop_by_hop(upstream.headers());
        // The buffered body gets its own length.
        headers.remove(header::CONTENT_LENGTH);

        let body = upstream
            .bytes()
            .await
            .map_err(|e| GatewayError::from_transport(e, "origin"))?;

        Ok(ProxiedResponse {
            status,
            status_text,
            headers,
            body,
        })
    }
}
