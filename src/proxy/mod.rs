//! Forwarding to the origin server
//!
//! Two paths share one [`OriginProxy`]:
//!
//! - [`origin`] - gated resources, Basic auth injected, response fully buffered
//! - [`passthrough`] - everything else, request and response streamed unchanged

use crate::config::GatewayConfig;
use crate::{GatewayError, Result};
use http::{header, HeaderMap, HeaderName};
use reqwest::Client;
use std::time::Duration;

pub mod origin;
pub mod passthrough;


pub use origin::ProxiedResponse;

/// Connection-scoped headers that never cross the proxy
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
];

/// Non-standard hop-by-hop headers still sent by some clients
const LEGACY_HOP_BY_HOP_HEADERS: &[&str] = &["keep-alive", "proxy-connection"];

/// Copy `headers` without hop-by-hop entries
pub(crate) fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in HOP_BY_HOP_HEADERS {
        forwarded.remove(name);
    }
    for name in LEGACY_HOP_BY_HOP_HEADERS {
        forwarded.remove(*name);
    }
    forwarded
}

/// HTTP client bound to the origin server
#[derive(Debug, Clone)]
pub struct OriginProxy {
    client: Client,
    base_url: String,
    gated_prefix: String,
    timeout: Duration,
}

impl OriginProxy {
    /// Create a proxy for `base_url`
    ///
    /// `timeout` bounds the whole exchange for gated resources. Passthrough requests
    /// are only bounded until the response headers arrive, so long bodies keep streaming.
    pub fn new(
        base_url: impl Into<String>,
        gated_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            gated_prefix: gated_prefix.into(),
            timeout,
        })
    }

    /// Build the proxy from the gateway configuration
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        Self::new(
            config.origin_base_url.clone(),
            config.policies.gated_prefix.clone(),
            config.upstream_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
