//! Access policies: which paths cost what
//!
//! A [`PolicyTable`] is built fresh for every request from that request's own path.
//! Building is pure: no I/O, no clock, no shared mutable state. The payment gate consults
//! the table it was handed and nothing else.
//!
//! # Examples
//!
//! ```
//! use x402_edge_gateway::policy::build_policies;
//! use std::sync::Arc;
//!
//! let table = build_policies("/gated/my-post/");
//! let raw = table.policy_for("/gated/my-post/").unwrap();
//! let normalized = table.policy_for("/gated/my-post").unwrap();
//! assert!(Arc::ptr_eq(raw, normalized));
//! ```

mod builder;
mod path;

pub use builder::{build_policies, PolicyBuilder, PolicySettings, PricedRoute};
pub use path::{gated_resource_id, normalize_path};

use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;

/// Price, network and schema rule for one path pattern
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPolicy {
    /// Path the policy is keyed by
    pub path_pattern: String,
    /// Price in USD; zero means free
    pub price: Decimal,
    /// Settlement network identifier
    pub network: String,
    /// Human-readable description shown in the payment challenge
    pub description: String,
    /// Request schema advertised to clients
    pub input_schema: Option<Value>,
    /// Response schema advertised to clients
    pub output_schema: Option<Value>,
    /// MIME type of the paid response
    pub mime_type: Option<String>,
}

impl AccessPolicy {
    /// A policy that never asks for payment
    pub fn free(path_pattern: impl Into<String>) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            price: Decimal::ZERO,
            network: String::new(),
            description: String::new(),
            input_schema: None,
            output_schema: None,
            mime_type: None,
        }
    }

    /// A priced policy
    pub fn priced(
        path_pattern: impl Into<String>,
        price: Decimal,
        network: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            price,
            network: network.into(),
            description: description.into(),
            input_schema: None,
            output_schema: None,
            mime_type: None,
        }
    }

    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Whether a request under this policy must carry a payment proof
    pub fn requires_payment(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// Ordered mapping from path pattern to policy
///
/// Insertion order is evaluation order. Two keys may share one `Arc` (a raw path and its
/// normalized form); they are never separate copies.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    entries: Vec<(String, Arc<AccessPolicy>)>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the policy for `pattern`, keeping its original position
    pub fn insert(&mut self, pattern: impl Into<String>, policy: Arc<AccessPolicy>) {
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(key, _)| *key == pattern) {
            Some(entry) => entry.1 = policy,
            None => self.entries.push((pattern, policy)),
        }
    }

    /// Exact-key lookup
    pub fn get(&self, pattern: &str) -> Option<&Arc<AccessPolicy>> {
        self.entries
            .iter()
            .find(|(key, _)| key == pattern)
            .map(|(_, policy)| policy)
    }

    /// Policy for a request path: the exact path first, then its normalized form
    pub fn policy_for(&self, path: &str) -> Option<&Arc<AccessPolicy>> {
        self.get(path).or_else(|| self.get(normalize_path(path)))
    }

    /// Priced policy for a request path, if any
    pub fn priced_policy_for(&self, path: &str) -> Option<&Arc<AccessPolicy>> {
        self.policy_for(path)
            .filter(|policy| policy.requires_payment())
    }

    /// Patterns in evaluation order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
