//! Per-request policy table construction

use super::{normalize_path, AccessPolicy, PolicyTable};
use crate::types::networks;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

/// Price, network and description for one priced route
#[derive(Debug, Clone, PartialEq)]
pub struct PricedRoute {
    pub price: Decimal,
    pub network: String,
    pub description: String,
}

/// Static inputs to the policy builder, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySettings {
    /// Paths that are always free
    pub free_paths: Vec<String>,
    /// The single canonical priced endpoint
    pub paid_path: String,
    pub paid: PricedRoute,
    /// Prefix under which every path is gated; ends with `/`
    pub gated_prefix: String,
    pub gated: PricedRoute,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            free_paths: vec!["/health".to_string(), "/ready".to_string()],
            paid_path: "/paid".to_string(),
            paid: PricedRoute {
                price: Decimal::new(1, 3),
                network: networks::BASE_MAINNET.to_string(),
                description: "Static testing".to_string(),
            },
            gated_prefix: "/gated/".to_string(),
            gated: PricedRoute {
                price: Decimal::new(1000, 2),
                network: networks::BASE_MAINNET.to_string(),
                description: "Gated post".to_string(),
            },
        }
    }
}

/// Builds a [`PolicyTable`] for each incoming request path
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    settings: Arc<PolicySettings>,
}

impl PolicyBuilder {
    pub fn new(settings: PolicySettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Whether `path` falls under the gated prefix
    pub fn is_gated(&self, path: &str) -> bool {
        path.starts_with(&self.settings.gated_prefix)
    }

    /// Build the table for one request path
    ///
    /// Static entries come first (free paths, then the priced endpoint), followed by the
    /// synthesized gated entries when `request_path` is under the gated prefix.
    pub fn build(&self, request_path: &str) -> PolicyTable {
        let settings = &self.settings;
        let mut table = PolicyTable::new();

        for path in &settings.free_paths {
            table.insert(path.clone(), Arc::new(AccessPolicy::free(path.clone())));
        }

        table.insert(settings.paid_path.clone(), Arc::new(self.paid_policy()));

        if self.is_gated(request_path) {
            // The bare prefix is its own canonical form.
            let normalized = if request_path == settings.gated_prefix {
                request_path
            } else {
                normalize_path(request_path)
            };

            let policy = Arc::new(AccessPolicy::priced(
                normalized,
                settings.gated.price,
                settings.gated.network.clone(),
                settings.gated.description.clone(),
            ));

            table.insert(request_path, Arc::clone(&policy));
            table.insert(normalized, policy);
        }

        table
    }

    fn paid_policy(&self) -> AccessPolicy {
        let settings = &self.settings;
        AccessPolicy::priced(
            settings.paid_path.clone(),
            settings.paid.price,
            settings.paid.network.clone(),
            settings.paid.description.clone(),
        )
        .with_input_schema(json!({}))
        .with_output_schema(json!({
            "type": "text/plain",
            "properties": {
                "message": {
                    "type": "string",
                    "example": "****"
                }
            }
        }))
    }
}

/// Build the policy table for `request_path` with default settings
pub fn build_policies(request_path: &str) -> PolicyTable {
    PolicyBuilder::default().build(request_path)
}
