// ABOUTME: Token endpoint issuance: a shared template over grant-specific preconditions
// ABOUTME: Client credentials, password, refresh token and authorization code exchange grants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use chrono::Utc;
use tracing::{debug, info, warn};

use super::client::{Client, ResourceOwner};
use super::flows::GrantFlowPolicy;
use super::grants::{StoredAuthorizationCode, StoredRefreshToken};
use super::issuer::{IssueParams, TokenIssuer};
use super::responses::{ErrorResponse, TokenResponse};
use super::scopes::ScopeResolver;
use crate::config::{ExpiryContext, GrantFlowConfig};
use crate::errors::{OAuthError, OAuthResult};
use crate::models::{GrantFlow, ScopeSet};

/// Grant-specific part of a token request
pub trait Grant {
    /// Flow the grant belongs to
    fn flow(&self) -> GrantFlow;

    /// Authenticated client, if any
    fn client(&self) -> Option<&dyn Client>;

    /// Resource owner the token will act for
    fn resource_owner(&self) -> Option<&dyn ResourceOwner> {
        None
    }

    /// Grant-specific preconditions, run after flow gating
    ///
    /// # Errors
    ///
    /// Returns the OAuth error to report.
    fn validate(&self, _client: &dyn Client) -> OAuthResult<()> {
        Ok(())
    }

    /// Scopes the token will carry
    ///
    /// # Errors
    ///
    /// Returns `invalid_scope` when the scopes cannot be granted.
    fn scopes(&self, client: &dyn Client, config: &GrantFlowConfig) -> OAuthResult<ScopeSet>;

    /// Refresh token consumed by this grant
    fn previous_refresh_token(&self) -> Option<&str> {
        None
    }
}

/// Client credentials grant (RFC 6749 §4.4)
pub struct ClientCredentialsGrant<'a> {
    /// Authenticated client
    pub client: Option<&'a dyn Client>,
    /// Requested scope string
    pub scope: Option<String>,
}

impl Grant for ClientCredentialsGrant<'_> {
    fn flow(&self) -> GrantFlow {
        GrantFlow::ClientCredentials
    }

    fn client(&self) -> Option<&dyn Client> {
        self.client
    }

    fn scopes(&self, client: &dyn Client, config: &GrantFlowConfig) -> OAuthResult<ScopeSet> {
        Ok(ScopeResolver::new(config).resolve_allowing_empty(
            self.scope.as_deref(),
            client,
            self.flow(),
        )?)
    }
}

/// Resource owner password credentials grant (RFC 6749 §4.3)
///
/// The caller verifies the credentials and passes the authenticated owner;
/// `None` means verification failed.
pub struct PasswordGrant<'a> {
    /// Authenticated client
    pub client: Option<&'a dyn Client>,
    /// Resource owner whose credentials verified
    pub resource_owner: Option<&'a dyn ResourceOwner>,
    /// Requested scope string
    pub scope: Option<String>,
}

impl Grant for PasswordGrant<'_> {
    fn flow(&self) -> GrantFlow {
        GrantFlow::Password
    }

    fn client(&self) -> Option<&dyn Client> {
        self.client
    }

    fn resource_owner(&self) -> Option<&dyn ResourceOwner> {
        self.resource_owner
    }

    fn validate(&self, _client: &dyn Client) -> OAuthResult<()> {
        if self.resource_owner.is_none() {
            return Err(OAuthError::invalid_grant("Invalid resource owner credentials."));
        }
        Ok(())
    }

    fn scopes(&self, client: &dyn Client, config: &GrantFlowConfig) -> OAuthResult<ScopeSet> {
        Ok(ScopeResolver::new(config).resolve_allowing_empty(
            self.scope.as_deref(),
            client,
            self.flow(),
        )?)
    }
}

/// Refresh token grant (RFC 6749 §6)
pub struct RefreshTokenGrant<'a> {
    /// Authenticated client
    pub client: Option<&'a dyn Client>,
    /// Stored record for the presented refresh token
    pub refresh_token: Option<&'a StoredRefreshToken>,
    /// Requested scope string, narrowing the original grant
    pub scope: Option<String>,
}

impl Grant for RefreshTokenGrant<'_> {
    fn flow(&self) -> GrantFlow {
        GrantFlow::RefreshToken
    }

    fn client(&self) -> Option<&dyn Client> {
        self.client
    }

    fn resource_owner(&self) -> Option<&dyn ResourceOwner> {
        self.refresh_token
            .and_then(|stored| stored.resource_owner_id.as_ref())
            .map(|id| id as &dyn ResourceOwner)
    }

    fn validate(&self, client: &dyn Client) -> OAuthResult<()> {
        let stored = self
            .refresh_token
            .ok_or_else(|| OAuthError::invalid_grant("Refresh token not found."))?;
        if !stored.is_usable(Utc::now()) {
            return Err(OAuthError::invalid_grant("Refresh token is expired or revoked."));
        }
        if stored
            .client_uid
            .as_deref()
            .is_some_and(|uid| uid != client.uid())
        {
            return Err(OAuthError::invalid_grant(
                "Refresh token was issued to another client.",
            ));
        }
        Ok(())
    }

    fn scopes(&self, _client: &dyn Client, _config: &GrantFlowConfig) -> OAuthResult<ScopeSet> {
        let original = self
            .refresh_token
            .map(|stored| stored.scopes.clone())
            .unwrap_or_default();
        let requested = self
            .scope
            .as_deref()
            .map(ScopeSet::from_string)
            .unwrap_or_default();

        if requested.is_empty() {
            return Ok(original);
        }
        if !requested.is_subset_of(&original) {
            return Err(OAuthError::invalid_scope(
                "The requested scope exceeds the scope granted by the resource owner.",
            ));
        }
        Ok(requested)
    }

    fn previous_refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .map(|stored| stored.refresh_token.as_str())
    }
}

/// Authorization code exchange (RFC 6749 §4.1.3)
pub struct AuthorizationCodeGrant<'a> {
    /// Authenticated client
    pub client: Option<&'a dyn Client>,
    /// Stored record for the presented code
    pub code: Option<&'a StoredAuthorizationCode>,
    /// Redirect URI sent with the exchange
    pub redirect_uri: Option<String>,
    /// PKCE code verifier
    pub code_verifier: Option<String>,
}

impl Grant for AuthorizationCodeGrant<'_> {
    fn flow(&self) -> GrantFlow {
        GrantFlow::AuthorizationCode
    }

    fn client(&self) -> Option<&dyn Client> {
        self.client
    }

    fn resource_owner(&self) -> Option<&dyn ResourceOwner> {
        self.code
            .map(|stored| &stored.resource_owner_id as &dyn ResourceOwner)
    }

    fn validate(&self, client: &dyn Client) -> OAuthResult<()> {
        let stored = self
            .code
            .ok_or_else(|| OAuthError::invalid_grant("Authorization code not found."))?;
        if !stored.is_usable(Utc::now()) {
            return Err(OAuthError::invalid_grant(
                "Authorization code is expired or revoked.",
            ));
        }
        if stored.client_uid != client.uid() {
            return Err(OAuthError::invalid_grant(
                "Authorization code was issued to another client.",
            ));
        }

        let redirect_uri = self
            .redirect_uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| OAuthError::missing_param("redirect_uri"))?;
        if redirect_uri != stored.redirect_uri {
            return Err(OAuthError::invalid_grant(
                "Redirect URI does not match the authorization request.",
            ));
        }

        match (&stored.code_challenge, self.code_verifier.as_deref()) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(OAuthError::invalid_grant(
                "code_verifier provided but no code_challenge was used.",
            )),
            (Some(_), None) => Err(OAuthError::invalid_grant("Missing code_verifier.")),
            (Some(challenge), Some(verifier)) => {
                if challenge.verify(verifier) {
                    Ok(())
                } else {
                    Err(OAuthError::invalid_grant("Invalid code_verifier."))
                }
            }
        }
    }

    fn scopes(&self, _client: &dyn Client, _config: &GrantFlowConfig) -> OAuthResult<ScopeSet> {
        Ok(self
            .code
            .map(|stored| stored.scopes.clone())
            .unwrap_or_default())
    }
}

/// Single-use token issuance request
///
/// `authorize` runs the template once and caches the response; later calls
/// return the cached value.
pub struct TokenIssuanceRequest<'a, G: Grant> {
    config: &'a GrantFlowConfig,
    issuer: &'a dyn TokenIssuer,
    grant: G,
    response: Option<TokenResponse>,
}

impl<'a, G: Grant> TokenIssuanceRequest<'a, G> {
    /// Create a request for a grant
    pub const fn new(config: &'a GrantFlowConfig, issuer: &'a dyn TokenIssuer, grant: G) -> Self {
        Self {
            config,
            issuer,
            grant,
            response: None,
        }
    }

    /// Run the request, or return the cached response
    pub fn authorize(&mut self) -> &TokenResponse {
        let response = match self.response.take() {
            Some(response) => response,
            None => self.issue(),
        };
        self.response.insert(response)
    }

    /// Cached response, if `authorize` has run
    #[must_use]
    pub const fn response(&self) -> Option<&TokenResponse> {
        self.response.as_ref()
    }

    /// Grant this request was built from
    #[must_use]
    pub const fn grant(&self) -> &G {
        &self.grant
    }

    fn issue(&self) -> TokenResponse {
        match self.try_issue() {
            Ok(response) => response,
            Err(error) => {
                debug!(
                    grant_flow = %self.grant.flow(),
                    error = %error,
                    "Token request rejected"
                );
                TokenResponse::Failed(error.into())
            }
        }
    }

    fn try_issue(&self) -> OAuthResult<TokenResponse> {
        let flow = self.grant.flow();
        let client = self.grant.client().ok_or_else(OAuthError::invalid_client)?;

        GrantFlowPolicy::new(self.config).check_grant_flow(flow, client)?;
        self.grant.validate(client)?;
        let scopes = self.grant.scopes(client, self.config)?;

        let resource_owner = self.grant.resource_owner();
        let expires_in = self.config.custom_access_token_expires_in(&ExpiryContext {
            client,
            grant_flow: flow,
            scopes: &scopes,
            resource_owner,
        });
        let params = IssueParams {
            grant_flow: flow,
            resource_owner,
            expires_in,
            use_refresh_token: self.config.use_refresh_token && flow.supports_refresh_token(),
            reuse_access_token: self.config.reuse_access_token,
            previous_refresh_token: self.grant.previous_refresh_token(),
        };

        match self.issuer.create(client, &scopes, &params) {
            Ok(token) => {
                info!(
                    client_id = %client.uid(),
                    grant_flow = %flow,
                    scopes = %scopes,
                    refresh_token = token.refresh_token.is_some(),
                    "Access token issued"
                );
                Ok(TokenResponse::Issued(token.into()))
            }
            Err(kind) => {
                warn!(client_id = %client.uid(), grant_flow = %flow, error = %kind, "Token issuer failed");
                Ok(TokenResponse::Failed(ErrorResponse::new(
                    &OAuthError::from(kind),
                    None,
                )))
            }
        }
    }
}
