// ABOUTME: Token issuer contract the engine delegates credential minting to
// ABOUTME: Defines issuance parameters and issued access token / authorization code values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::client::{Client, ResourceOwner};
use super::pkce::CodeChallenge;
use crate::errors::OAuthErrorKind;
use crate::models::{GrantFlow, ScopeSet};

/// Parameters accompanying an access token issuance
#[derive(Clone, Copy)]
pub struct IssueParams<'a> {
    /// Flow through which the token is issued
    pub grant_flow: GrantFlow,
    /// Resource owner, absent for client credentials
    pub resource_owner: Option<&'a dyn ResourceOwner>,
    /// Token lifetime; `None` issues a non-expiring token
    pub expires_in: Option<Duration>,
    /// Whether a refresh token should accompany the access token
    pub use_refresh_token: bool,
    /// Whether an existing unexpired token may be returned instead
    pub reuse_access_token: bool,
    /// Refresh token being exchanged, to be revoked by the issuer
    pub previous_refresh_token: Option<&'a str>,
}

/// Parameters accompanying an authorization code issuance
#[derive(Clone, Copy)]
pub struct CodeParams<'a> {
    /// Resource owner who consented
    pub resource_owner: &'a dyn ResourceOwner,
    /// Redirect URI the code is bound to
    pub redirect_uri: &'a str,
    /// Code lifetime
    pub expires_in: Duration,
    /// PKCE challenge the code is bound to
    pub code_challenge: Option<&'a CodeChallenge>,
}

/// An issued (or reused) access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// Access token value
    pub token: String,
    /// Token type, normally `Bearer`
    pub token_type: String,
    /// Remaining lifetime in seconds; `None` for non-expiring tokens
    pub expires_in: Option<i64>,
    /// Scopes granted to the token
    pub scopes: ScopeSet,
    /// Refresh token, when issued
    pub refresh_token: Option<String>,
    /// When the token was created
    pub created_at: DateTime<Utc>,
}

/// An issued authorization code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    /// Authorization code value
    pub code: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Mints or reuses credentials on behalf of the engine
///
/// Implementations own persistence and randomness. One call creates or
/// reuses at most one credential; concurrent calls for the same client and
/// scopes must not corrupt shared state. Failures are reported as an
/// `OAuthErrorKind`, which the engine passes through unchanged.
pub trait TokenIssuer: Send + Sync {
    /// Create or reuse an access token
    ///
    /// # Errors
    ///
    /// Returns the error kind to report to the client.
    fn create(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &IssueParams<'_>,
    ) -> Result<IssuedToken, OAuthErrorKind>;

    /// Create an authorization code
    ///
    /// # Errors
    ///
    /// Returns the error kind to report to the client.
    fn create_authorization_code(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &CodeParams<'_>,
    ) -> Result<IssuedCode, OAuthErrorKind>;
}
