//! Gateway configuration
//!
//! Every setting the gateway consults is read exactly once, at startup, into a
//! [`GatewayConfig`]. Handlers never look at the environment themselves; settings that
//! only matter for paid paths are optional here and are demanded through the `require_*`
//! accessors at the moment a request needs them.

use crate::facilitator::coinbase;
use crate::policy::PolicySettings;
use crate::types::FacilitatorConfig;
use crate::{GatewayError, Result};
use std::time::Duration;
use url::Url;

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8787";
/// Default origin the gateway fronts
pub const DEFAULT_ORIGIN_BASE_URL: &str = "https://artlu.xyz";
/// Default facilitator timeout in seconds
pub const DEFAULT_FACILITATOR_TIMEOUT_SECS: u64 = 10;
/// Default origin timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Names of the environment variables the gateway reads
pub mod vars {
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const ORIGIN_BASE_URL: &str = "ORIGIN_BASE_URL";
    pub const FACILITATOR_URL: &str = "FACILITATOR_URL";
    pub const ADDRESS: &str = "ADDRESS";
    pub const BASIC_AUTH_USER: &str = "BASIC_AUTH_USER";
    pub const BASIC_AUTH_PASSWORD: &str = "BASIC_AUTH_PASSWORD";
    pub const CDP_API_KEY_ID: &str = "CDP_API_KEY_ID";
    pub const CDP_API_KEY_SECRET: &str = "CDP_API_KEY_SECRET";
    pub const SHORT_CIRCUIT: &str = "SHORT_CIRCUIT";
    pub const FACILITATOR_TIMEOUT_SECS: &str = "FACILITATOR_TIMEOUT_SECS";
    pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
}

/// Credentials the gateway presents to the origin for gated resources
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// API key pair for a managed (Coinbase CDP) facilitator
#[derive(Clone)]
pub struct ApiKeyPair {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for ApiKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyPair")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Process-wide, read-only gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address
    pub bind_address: String,
    /// Origin base URL, without trailing slash
    pub origin_base_url: String,
    /// Facilitator base URL
    pub facilitator_url: Option<String>,
    /// Receiving settlement address
    pub pay_to: Option<String>,
    /// Origin basic-auth username for gated forwarding
    pub basic_auth_user: Option<String>,
    /// Origin basic-auth password for gated forwarding
    pub basic_auth_password: Option<String>,
    /// Managed facilitator API keys
    pub cdp_api_key: Option<ApiKeyPair>,
    /// Bypass the payment gate entirely (local development)
    pub short_circuit: bool,
    /// Bound on each facilitator call
    pub facilitator_timeout: Duration,
    /// Bound on each origin fetch
    pub upstream_timeout: Duration,
    /// Prices, networks and the gated prefix
    pub policies: PolicySettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            origin_base_url: DEFAULT_ORIGIN_BASE_URL.to_string(),
            facilitator_url: None,
            pay_to: None,
            basic_auth_user: None,
            basic_auth_password: None,
            cdp_api_key: None,
            short_circuit: false,
            facilitator_timeout: Duration::from_secs(DEFAULT_FACILITATOR_TIMEOUT_SECS),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            policies: PolicySettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let origin_base_url = get(vars::ORIGIN_BASE_URL)
            .unwrap_or_else(|| DEFAULT_ORIGIN_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Url::parse(&origin_base_url).map_err(|e| {
            GatewayError::config(format!("{} is not a valid URL: {}", vars::ORIGIN_BASE_URL, e))
        })?;

        let cdp_api_key = match (get(vars::CDP_API_KEY_ID), get(vars::CDP_API_KEY_SECRET)) {
            (Some(id), Some(secret)) => Some(ApiKeyPair { id, secret }),
            _ => None,
        };

        let short_circuit = match get(vars::SHORT_CIRCUIT) {
            Some(value) => parse_bool(vars::SHORT_CIRCUIT, &value)?,
            None => false,
        };

        Ok(Self {
            bind_address: get(vars::BIND_ADDRESS)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            origin_base_url,
            facilitator_url: get(vars::FACILITATOR_URL)
                .map(|url| url.trim_end_matches('/').to_string()),
            pay_to: get(vars::ADDRESS),
            basic_auth_user: get(vars::BASIC_AUTH_USER),
            basic_auth_password: get(vars::BASIC_AUTH_PASSWORD),
            cdp_api_key,
            short_circuit,
            facilitator_timeout: parse_secs(
                vars::FACILITATOR_TIMEOUT_SECS,
                get(vars::FACILITATOR_TIMEOUT_SECS),
                DEFAULT_FACILITATOR_TIMEOUT_SECS,
            )?,
            upstream_timeout: parse_secs(
                vars::UPSTREAM_TIMEOUT_SECS,
                get(vars::UPSTREAM_TIMEOUT_SECS),
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            policies: PolicySettings::default(),
        })
    }

    /// Names of settings that paid or gated paths will need but are absent
    ///
    /// Absence is not fatal at startup; the gateway still serves free paths.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.facilitator_url.is_none() && self.cdp_api_key.is_none() {
            missing.push(vars::FACILITATOR_URL);
        }
        if self.pay_to.is_none() {
            missing.push(vars::ADDRESS);
        }
        if self.basic_auth_user.is_none() {
            missing.push(vars::BASIC_AUTH_USER);
        }
        if self.basic_auth_password.is_none() {
            missing.push(vars::BASIC_AUTH_PASSWORD);
        }
        missing
    }

    /// Receiving address, required once a priced path is hit
    pub fn require_pay_to(&self) -> Result<&str> {
        self.pay_to
            .as_deref()
            .ok_or(GatewayError::missing_config(vars::ADDRESS))
    }

    /// Origin credentials, required once a gated resource is forwarded
    pub fn require_origin_credentials(&self) -> Result<BasicCredentials> {
        let username = self
            .basic_auth_user
            .clone()
            .ok_or(GatewayError::missing_config(vars::BASIC_AUTH_USER))?;
        let password = self
            .basic_auth_password
            .clone()
            .ok_or(GatewayError::missing_config(vars::BASIC_AUTH_PASSWORD))?;
        Ok(BasicCredentials { username, password })
    }

    /// Facilitator client configuration, if one can be built
    ///
    /// An explicit `FACILITATOR_URL` wins and is called without credentials; otherwise a
    /// CDP key pair selects the managed facilitator. CDP tokens are only ever sent to
    /// the managed facilitator.
    pub fn facilitator_config(&self) -> Option<FacilitatorConfig> {
        let config = match (&self.facilitator_url, &self.cdp_api_key) {
            (Some(url), _) => FacilitatorConfig::new(url.clone()),
            (None, Some(keys)) => coinbase::create_facilitator_config(&keys.id, &keys.secret),
            (None, None) => return None,
        };
        Some(config.with_timeout(self.facilitator_timeout))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_secs(name: &str, value: Option<String>, default: u64) -> Result<Duration> {
    match value {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| GatewayError::config(format!("{} must be whole seconds", name))),
        None => Ok(Duration::from_secs(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.origin_base_url, DEFAULT_ORIGIN_BASE_URL);
        assert!(!config.short_circuit);
        assert!(config.facilitator_config().is_none());
        assert_eq!(
            config.missing_settings(),
            vec![
                vars::FACILITATOR_URL,
                vars::ADDRESS,
                vars::BASIC_AUTH_USER,
                vars::BASIC_AUTH_PASSWORD
            ]
        );
    }

    #[test]
    fn test_full_environment() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (vars::ORIGIN_BASE_URL, "https://origin.example.com/"),
            (vars::FACILITATOR_URL, "https://facilitator.example.com/"),
            (vars::ADDRESS, "0x209693Bc6afc0C5328bA36FaF03C514EF312287C"),
            (vars::BASIC_AUTH_USER, "gateway"),
            (vars::BASIC_AUTH_PASSWORD, "hunter2"),
            (vars::SHORT_CIRCUIT, "true"),
            (vars::UPSTREAM_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.origin_base_url, "https://origin.example.com");
        assert_eq!(
            config.facilitator_url.as_deref(),
            Some("https://facilitator.example.com")
        );
        assert!(config.short_circuit);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert!(config.missing_settings().is_empty());
        assert_eq!(config.require_origin_credentials().unwrap().username, "gateway");
        assert_eq!(
            config.facilitator_config().unwrap().url,
            "https://facilitator.example.com"
        );
    }

    #[test]
    fn test_require_accessors_name_the_missing_setting() {
        let config = GatewayConfig::default();
        let err = config.require_pay_to().unwrap_err();
        assert!(err.to_string().contains("ADDRESS"));
        let err = config.require_origin_credentials().unwrap_err();
        assert!(err.to_string().contains("BASIC_AUTH_USER"));

        let config = GatewayConfig {
            basic_auth_user: Some("gateway".to_string()),
            ..GatewayConfig::default()
        };
        let err = config.require_origin_credentials().unwrap_err();
        assert!(err.to_string().contains("BASIC_AUTH_PASSWORD"));
    }

    #[test]
    fn test_cdp_keys_select_managed_facilitator() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (vars::CDP_API_KEY_ID, "key-id"),
            (vars::CDP_API_KEY_SECRET, "key-secret"),
        ]))
        .unwrap();
        let facilitator = config.facilitator_config().unwrap();
        assert!(facilitator.url.starts_with(coinbase::COINBASE_FACILITATOR_BASE_URL));
        assert!(facilitator.create_auth_headers.is_some());
    }

    #[test]
    fn test_explicit_facilitator_url_never_gets_cdp_tokens() {
        let config = GatewayConfig::from_lookup(lookup(&[
            (vars::FACILITATOR_URL, "https://facilitator.example.com"),
            (vars::CDP_API_KEY_ID, "key-id"),
            (vars::CDP_API_KEY_SECRET, "key-secret"),
        ]))
        .unwrap();
        let facilitator = config.facilitator_config().unwrap();
        assert_eq!(facilitator.url, "https://facilitator.example.com");
        assert!(facilitator.create_auth_headers.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(GatewayConfig::from_lookup(lookup(&[(vars::SHORT_CIRCUIT, "maybe")])).is_err());
        assert!(
            GatewayConfig::from_lookup(lookup(&[(vars::UPSTREAM_TIMEOUT_SECS, "soon")])).is_err()
        );
        assert!(
            GatewayConfig::from_lookup(lookup(&[(vars::ORIGIN_BASE_URL, "not a url")])).is_err()
        );
    }
}
