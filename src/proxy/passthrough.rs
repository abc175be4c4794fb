//! Streaming forward of unmatched requests

use super::{strip_hop_by_hop, OriginProxy};
use crate::{GatewayError, Result};
use axum::{body::Body, extract::Request, response::Response};
use futures_util::TryStreamExt;
use http::header;

impl OriginProxy {
    /// Forward any request to the same path and query on the origin
    ///
    /// The request body is streamed upstream only when the inbound request declares one,
    /// and the upstream body is streamed back without buffering.
    pub async fn forward_any(&self, request: Request) -> Result<Response> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.base_url, path_and_query);

        let has_body = parts.headers.contains_key(header::CONTENT_LENGTH)
            || parts.headers.contains_key(header::TRANSFER_ENCODING);

        tracing::debug!(url = %url, method = %parts.method, "Proxying request to origin");

        let mut outbound = self
            .client
            .request(parts.method.clone(), &url)
            .headers(strip_hop_by_hop(&parts.headers));
        if has_body {
            outbound = outbound.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = tokio::time::timeout(self.timeout, outbound.send())
            .await
            .map_err(|_| GatewayError::Timeout { target: "origin" })?
            .map_err(|e| GatewayError::from_transport(e, "origin"))?;

        let status = upstream.status();
        let headers = strip_hop_by_hop(upstream.headers());

        let stream = upstream.bytes_stream().inspect_err(|e| {
            tracing::warn!(error = %e, "Origin response stream interrupted");
        });

        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
