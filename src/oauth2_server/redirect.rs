// ABOUTME: Redirect URI matching against client registrations and registration-time format checks
// ABOUTME: Exact string matching only; flows without a browser redirect may omit the URI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use tracing::debug;
use url::Url;

use super::client::Client;
use crate::constants::oauth::NATIVE_REDIRECT_URI;
use crate::errors::{OAuthError, OAuthErrorKind, OAuthResult};
use crate::models::GrantFlow;

/// Whether a request must carry a redirect URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectRequirement {
    /// A redirect URI must be supplied and must match a registered one
    Required,
    /// A missing URI is accepted when the client registered none
    Relaxed,
}

impl RedirectRequirement {
    /// Requirement for a flow, given whether the client may use it
    ///
    /// Only a flow that does not redirect a browser, and that the client is
    /// allowed to use, relaxes the requirement.
    #[must_use]
    pub const fn for_flow(flow: GrantFlow, allowed_for_client: bool) -> Self {
        if !flow.requires_redirect_uri() && allowed_for_client {
            Self::Relaxed
        } else {
            Self::Required
        }
    }
}

/// Validate a requested redirect URI against the client's registration
///
/// Matching is exact: no prefix, subdomain, or query-parameter tolerance.
///
/// # Errors
///
/// - `invalid_request` when the URI is missing and required, or missing
///   while the client has registered URIs
/// - `invalid_redirect_uri` when the URI matches no registered entry, or
///   the client registered none
pub fn validate_redirect_uri(
    client: &dyn Client,
    requested: Option<&str>,
    requirement: RedirectRequirement,
) -> OAuthResult<()> {
    let registered = client.redirect_uris();

    let Some(requested) = requested.filter(|uri| !uri.is_empty()) else {
        return if requirement == RedirectRequirement::Relaxed && registered.is_empty() {
            Ok(())
        } else {
            Err(OAuthError::missing_param("redirect_uri"))
        };
    };

    if registered.contains(&requested) {
        return Ok(());
    }

    debug!(
        client_id = %client.uid(),
        redirect_uri = %requested,
        registered = registered.len(),
        "Redirect URI does not match registration"
    );
    Err(OAuthErrorKind::InvalidRedirectUri.into())
}

/// Whether the URI is the out-of-band URI used by native applications
#[must_use]
pub fn is_native_redirect_uri(uri: &str) -> bool {
    uri == NATIVE_REDIRECT_URI
}

/// Registration-time format check for a single redirect URI
///
/// Rules: absolute URI, no fragment, no wildcard, and with `force_ssl`
/// https unless the host is loopback. The native out-of-band URI is
/// always accepted.
///
/// # Errors
///
/// Returns a short reason string when the URI is rejected.
pub fn validate_redirect_uri_format(uri: &str, force_ssl: bool) -> Result<(), &'static str> {
    if uri.trim().is_empty() {
        return Err("must not be blank");
    }
    if is_native_redirect_uri(uri) {
        return Ok(());
    }
    if uri.contains('*') {
        return Err("must not contain wildcards");
    }

    let parsed = Url::parse(uri).map_err(|_| "must be an absolute URI")?;
    if parsed.fragment().is_some() {
        return Err("must not contain a fragment");
    }
    if parsed.cannot_be_a_base() {
        return Err("must be an absolute URI");
    }

    if force_ssl && parsed.scheme() != "https" {
        let loopback = matches!(
            parsed.host_str(),
            Some("localhost" | "127.0.0.1" | "[::1]")
        );
        if !(parsed.scheme() == "http" && loopback) {
            return Err("must use https");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rules() {
        assert!(validate_redirect_uri_format("https://app.com/callback", true).is_ok());
        assert!(validate_redirect_uri_format("http://localhost:3000/cb", true).is_ok());
        assert!(validate_redirect_uri_format("http://app.com/callback", false).is_ok());
        assert!(validate_redirect_uri_format(NATIVE_REDIRECT_URI, true).is_ok());

        assert_eq!(
            validate_redirect_uri_format("http://app.com/callback", true),
            Err("must use https")
        );
        assert_eq!(
            validate_redirect_uri_format("https://app.com/cb#frag", true),
            Err("must not contain a fragment")
        );
        assert_eq!(
            validate_redirect_uri_format("https://*.app.com/cb", true),
            Err("must not contain wildcards")
        );
        assert_eq!(
            validate_redirect_uri_format("/callback", true),
            Err("must be an absolute URI")
        );
    }
}
