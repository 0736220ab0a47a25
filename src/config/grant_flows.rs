// ABOUTME: Process-wide grant flow configuration with environment loading and value overrides
// ABOUTME: Exposes enabled flows, scope defaults and ceilings, token lifetimes, and policy hooks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::collections::HashMap;
use std::env;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use super::hooks::{
    AccessTokenExpiry, ExpiryContext, GrantFlowAuthorizer, ResourceOwnerAuthorizer,
};
use crate::constants::oauth::{
    DEFAULT_ACCESS_TOKEN_EXPIRES_IN_SECS, DEFAULT_AUTHORIZATION_CODE_EXPIRES_IN_SECS,
    MAX_EXPIRES_IN_SECS,
};
use crate::errors::ConfigError;
use crate::models::{GrantFlow, ScopeSet};
use crate::oauth2_server::client::{Client, ResourceOwner};

/// Comma separated list of enabled grant flows
pub const ENV_GRANT_FLOWS: &str = "GRANTKEEPER_GRANT_FLOWS";
/// Scopes substituted when a request names none
pub const ENV_DEFAULT_SCOPES: &str = "GRANTKEEPER_DEFAULT_SCOPES";
/// Additional scopes a client may request
pub const ENV_OPTIONAL_SCOPES: &str = "GRANTKEEPER_OPTIONAL_SCOPES";
/// Per grant type scope ceilings: `flow=scope scope;flow=scope`
pub const ENV_SCOPES_BY_GRANT_TYPE: &str = "GRANTKEEPER_SCOPES_BY_GRANT_TYPE";
/// Access token lifetime in seconds, `0` for non-expiring tokens
pub const ENV_ACCESS_TOKEN_EXPIRES_IN: &str = "GRANTKEEPER_ACCESS_TOKEN_EXPIRES_IN";
/// Authorization code lifetime in seconds
pub const ENV_AUTHORIZATION_CODE_EXPIRES_IN: &str = "GRANTKEEPER_AUTHORIZATION_CODE_EXPIRES_IN";
/// Issue refresh tokens alongside access tokens
pub const ENV_USE_REFRESH_TOKEN: &str = "GRANTKEEPER_USE_REFRESH_TOKEN";
/// Return an existing unexpired token instead of minting a new one
pub const ENV_REUSE_ACCESS_TOKEN: &str = "GRANTKEEPER_REUSE_ACCESS_TOKEN";
/// Require https redirect URIs except for loopback hosts
pub const ENV_FORCE_SSL_IN_REDIRECT_URI: &str = "GRANTKEEPER_FORCE_SSL_IN_REDIRECT_URI";
/// Require a PKCE code challenge on every authorization code request
pub const ENV_PKCE_REQUIRED: &str = "GRANTKEEPER_PKCE_REQUIRED";

/// Grant flow and scope policy configuration
///
/// Read-only once built. Every component receives it by reference.
#[derive(Clone)]
pub struct GrantFlowConfig {
    /// Enabled grant flows, in configuration order
    pub grant_flows: Vec<GrantFlow>,
    /// Scopes substituted when a request names none
    pub default_scopes: ScopeSet,
    /// Additional scopes clients may request beyond the defaults
    pub optional_scopes: ScopeSet,
    /// Scope ceilings per grant type; a missing entry means unrestricted
    pub scopes_by_grant_type: HashMap<GrantFlow, ScopeSet>,
    /// Default access token lifetime; `None` issues non-expiring tokens
    pub access_token_expires_in: Option<Duration>,
    /// Authorization code lifetime
    pub authorization_code_expires_in: Duration,
    /// Issue refresh tokens for flows that support them
    pub use_refresh_token: bool,
    /// Reuse an unexpired access token for the same client, owner, and scopes
    pub reuse_access_token: bool,
    /// Require https redirect URIs (loopback hosts excepted)
    pub force_ssl_in_redirect_uri: bool,
    /// Require PKCE for the authorization code flow
    pub pkce_required: bool,
    /// Resource-owner authorization hook; absent allows every owner
    pub resource_owner_authorizer: Option<ResourceOwnerAuthorizer>,
    /// Per-client grant flow hook; absent allows every enabled flow
    pub grant_flow_authorizer: Option<GrantFlowAuthorizer>,
    /// Custom access token lifetime hook
    pub access_token_expiry: Option<AccessTokenExpiry>,
}

impl Default for GrantFlowConfig {
    fn default() -> Self {
        Self {
            grant_flows: vec![GrantFlow::AuthorizationCode, GrantFlow::ClientCredentials],
            default_scopes: ScopeSet::new(),
            optional_scopes: ScopeSet::new(),
            scopes_by_grant_type: HashMap::new(),
            access_token_expires_in: Some(Duration::seconds(
                DEFAULT_ACCESS_TOKEN_EXPIRES_IN_SECS,
            )),
            authorization_code_expires_in: Duration::seconds(
                DEFAULT_AUTHORIZATION_CODE_EXPIRES_IN_SECS,
            ),
            use_refresh_token: false,
            reuse_access_token: false,
            force_ssl_in_redirect_uri: true,
            pkce_required: false,
            resource_owner_authorizer: None,
            grant_flow_authorizer: None,
            access_token_expiry: None,
        }
    }
}

impl Debug for GrantFlowConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantFlowConfig")
            .field("grant_flows", &self.grant_flows)
            .field("default_scopes", &self.default_scopes)
            .field("optional_scopes", &self.optional_scopes)
            .field("scopes_by_grant_type", &self.scopes_by_grant_type)
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field(
                "authorization_code_expires_in",
                &self.authorization_code_expires_in,
            )
            .field("use_refresh_token", &self.use_refresh_token)
            .field("reuse_access_token", &self.reuse_access_token)
            .field("force_ssl_in_redirect_uri", &self.force_ssl_in_redirect_uri)
            .field("pkce_required", &self.pkce_required)
            .field(
                "resource_owner_authorizer",
                &self.resource_owner_authorizer.is_some(),
            )
            .field("grant_flow_authorizer", &self.grant_flow_authorizer.is_some())
            .field("access_token_expiry", &self.access_token_expiry.is_some())
            .finish()
    }
}

impl GrantFlowConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but malformed: unknown
    /// flow names, non-numeric lifetimes, unparseable booleans, or bad
    /// `flow=scopes` entries.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var(ENV_GRANT_FLOWS) {
            config.grant_flows = parse_grant_flows(ENV_GRANT_FLOWS, &value)?;
        }
        if let Ok(value) = env::var(ENV_DEFAULT_SCOPES) {
            config.default_scopes = ScopeSet::from_string(&value);
        }
        if let Ok(value) = env::var(ENV_OPTIONAL_SCOPES) {
            config.optional_scopes = ScopeSet::from_string(&value);
        }
        if let Ok(value) = env::var(ENV_SCOPES_BY_GRANT_TYPE) {
            config.scopes_by_grant_type = parse_scope_mapping(ENV_SCOPES_BY_GRANT_TYPE, &value)?;
        }
        if let Ok(value) = env::var(ENV_ACCESS_TOKEN_EXPIRES_IN) {
            let lifetime = parse_lifetime(ENV_ACCESS_TOKEN_EXPIRES_IN, &value)?;
            config.access_token_expires_in = (!lifetime.is_zero()).then_some(lifetime);
        }
        if let Ok(value) = env::var(ENV_AUTHORIZATION_CODE_EXPIRES_IN) {
            config.authorization_code_expires_in =
                parse_lifetime(ENV_AUTHORIZATION_CODE_EXPIRES_IN, &value)?;
        }
        if let Ok(value) = env::var(ENV_USE_REFRESH_TOKEN) {
            config.use_refresh_token = parse_bool(ENV_USE_REFRESH_TOKEN, &value)?;
        }
        if let Ok(value) = env::var(ENV_REUSE_ACCESS_TOKEN) {
            config.reuse_access_token = parse_bool(ENV_REUSE_ACCESS_TOKEN, &value)?;
        }
        if let Ok(value) = env::var(ENV_FORCE_SSL_IN_REDIRECT_URI) {
            config.force_ssl_in_redirect_uri = parse_bool(ENV_FORCE_SSL_IN_REDIRECT_URI, &value)?;
        }
        if let Ok(value) = env::var(ENV_PKCE_REQUIRED) {
            config.pkce_required = parse_bool(ENV_PKCE_REQUIRED, &value)?;
        }

        config.log_summary();
        Ok(config)
    }

    fn log_summary(&self) {
        let flows: Vec<&str> = self.grant_flows.iter().map(GrantFlow::as_str).collect();
        info!(
            grant_flows = %flows.join(","),
            default_scopes = %self.default_scopes,
            optional_scopes = %self.optional_scopes,
            use_refresh_token = self.use_refresh_token,
            pkce_required = self.pkce_required,
            "Grant flow configuration loaded"
        );
        for (flow, scopes) in &self.scopes_by_grant_type {
            debug!(grant_flow = %flow, scopes = %scopes, "Grant type scope ceiling");
        }
    }

    /// Replace the enabled grant flows
    #[must_use]
    pub fn with_grant_flows(mut self, flows: impl IntoIterator<Item = GrantFlow>) -> Self {
        self.grant_flows = flows.into_iter().collect();
        self
    }

    /// Replace the default scopes
    #[must_use]
    pub fn with_default_scopes(mut self, scopes: &str) -> Self {
        self.default_scopes = ScopeSet::from_string(scopes);
        self
    }

    /// Replace the optional scopes
    #[must_use]
    pub fn with_optional_scopes(mut self, scopes: &str) -> Self {
        self.optional_scopes = ScopeSet::from_string(scopes);
        self
    }

    /// Restrict the scopes available to one grant type
    #[must_use]
    pub fn with_scopes_for_grant_type(mut self, flow: GrantFlow, scopes: &str) -> Self {
        self.scopes_by_grant_type
            .insert(flow, ScopeSet::from_string(scopes));
        self
    }

    /// Replace the default access token lifetime
    #[must_use]
    pub fn with_access_token_expires_in(mut self, expires_in: Option<Duration>) -> Self {
        self.access_token_expires_in = expires_in;
        self
    }

    /// Enable or disable refresh tokens
    #[must_use]
    pub fn with_refresh_token(mut self, enabled: bool) -> Self {
        self.use_refresh_token = enabled;
        self
    }

    /// Enable or disable access token reuse
    #[must_use]
    pub fn with_reuse_access_token(mut self, enabled: bool) -> Self {
        self.reuse_access_token = enabled;
        self
    }

    /// Enable or disable the https requirement for redirect URIs
    #[must_use]
    pub fn with_force_ssl_in_redirect_uri(mut self, enabled: bool) -> Self {
        self.force_ssl_in_redirect_uri = enabled;
        self
    }

    /// Require or relax PKCE for the authorization code flow
    #[must_use]
    pub fn with_pkce_required(mut self, required: bool) -> Self {
        self.pkce_required = required;
        self
    }

    /// Install the resource-owner authorization hook
    #[must_use]
    pub fn with_resource_owner_authorizer<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&dyn ResourceOwner>, &dyn Client) -> bool + Send + Sync + 'static,
    {
        self.resource_owner_authorizer = Some(Arc::new(hook));
        self
    }

    /// Install the per-client grant flow hook
    #[must_use]
    pub fn with_grant_flow_authorizer<F>(mut self, hook: F) -> Self
    where
        F: Fn(GrantFlow, &dyn Client) -> bool + Send + Sync + 'static,
    {
        self.grant_flow_authorizer = Some(Arc::new(hook));
        self
    }

    /// Install the custom access token lifetime hook
    #[must_use]
    pub fn with_access_token_expiry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExpiryContext<'_>) -> Option<Duration> + Send + Sync + 'static,
    {
        self.access_token_expiry = Some(Arc::new(hook));
        self
    }

    /// Server-wide allowed scopes: defaults plus optional scopes
    ///
    /// An empty result means the server does not restrict scopes.
    #[must_use]
    pub fn server_scopes(&self) -> ScopeSet {
        self.default_scopes.union(&self.optional_scopes)
    }

    /// Whether a flow is enabled server-wide
    #[must_use]
    pub fn is_flow_enabled(&self, flow: GrantFlow) -> bool {
        self.grant_flows.contains(&flow)
    }

    /// Scope ceiling configured for a grant type, if any
    #[must_use]
    pub fn scopes_for_grant_type(&self, flow: GrantFlow) -> Option<&ScopeSet> {
        self.scopes_by_grant_type.get(&flow)
    }

    /// Run the resource-owner authorization hook
    #[must_use]
    pub fn authorize_resource_owner_for_client(
        &self,
        resource_owner: Option<&dyn ResourceOwner>,
        client: &dyn Client,
    ) -> bool {
        self.resource_owner_authorizer
            .as_ref()
            .is_none_or(|hook| hook(resource_owner, client))
    }

    /// Run the per-client grant flow hook
    #[must_use]
    pub fn allow_grant_flow_for_client(&self, flow: GrantFlow, client: &dyn Client) -> bool {
        self.grant_flow_authorizer
            .as_ref()
            .is_none_or(|hook| hook(flow, client))
    }

    /// Access token lifetime for a specific issuance
    ///
    /// The custom hook wins when it returns a value.
    #[must_use]
    pub fn custom_access_token_expires_in(&self, context: &ExpiryContext<'_>) -> Option<Duration> {
        self.access_token_expiry
            .as_ref()
            .and_then(|hook| hook(context))
            .or(self.access_token_expires_in)
    }
}

fn parse_grant_flows(key: &'static str, value: &str) -> Result<Vec<GrantFlow>, ConfigError> {
    let mut flows = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let flow = name
            .parse::<GrantFlow>()
            .map_err(|e| ConfigError::UnknownGrantFlow { key, value: e.0 })?;
        if !flows.contains(&flow) {
            flows.push(flow);
        }
    }
    Ok(flows)
}

fn parse_scope_mapping(
    key: &'static str,
    value: &str,
) -> Result<HashMap<GrantFlow, ScopeSet>, ConfigError> {
    let mut mapping = HashMap::new();
    for entry in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((flow, scopes)) = entry.split_once('=') else {
            return Err(ConfigError::MalformedMapping {
                key,
                entry: entry.to_owned(),
            });
        };
        let flow = flow
            .trim()
            .parse::<GrantFlow>()
            .map_err(|e| ConfigError::UnknownGrantFlow { key, value: e.0 })?;
        mapping.insert(flow, ScopeSet::from_string(scopes));
    }
    Ok(mapping)
}

/// Parse a lifetime in seconds, bounded by `MAX_EXPIRES_IN_SECS`
fn parse_lifetime(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|seconds| (0..=MAX_EXPIRES_IN_SECS).contains(seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: value.to_owned(),
        })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_owned(),
        }),
    }
}
