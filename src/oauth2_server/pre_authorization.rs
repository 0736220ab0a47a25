// ABOUTME: Authorization endpoint decision: validates a request before the user is asked to consent
// ABOUTME: Evaluated once into Authorizable or Rejected and serialized into a status document
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::client::{Client, ResourceOwner};
use super::flows::GrantFlowPolicy;
use super::messages::Messages;
use super::pkce::CodeChallenge;
use super::redirect::{validate_redirect_uri, RedirectRequirement};
use super::responses::ErrorResponse;
use super::scopes::ScopeResolver;
use crate::config::GrantFlowConfig;
use crate::errors::{OAuthError, OAuthErrorKind, OAuthResult};
use crate::models::{ResponseType, ScopeSet};

/// Raw authorization endpoint parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationParams {
    /// Client identifier
    pub client_id: Option<String>,
    /// `code` or `token`
    pub response_type: Option<String>,
    /// Redirect URI requested by the client
    pub redirect_uri: Option<String>,
    /// Space-separated requested scopes
    pub scope: Option<String>,
    /// Opaque client state, echoed verbatim
    pub state: Option<String>,
    /// PKCE code challenge
    pub code_challenge: Option<String>,
    /// PKCE challenge method
    pub code_challenge_method: Option<String>,
}

/// Values resolved by a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAuthorization {
    /// Accepted response type
    pub response_type: ResponseType,
    /// Granted scopes
    pub scopes: ScopeSet,
    /// PKCE challenge to bind to the code
    pub code_challenge: Option<CodeChallenge>,
}

/// Decision state of a pre-authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationState {
    /// Not evaluated yet
    Pending,
    /// Every check passed
    Authorizable(ResolvedAuthorization),
    /// The first failing check
    Rejected(OAuthError),
}

/// Pre-authorization of an authorization endpoint request
pub struct PreAuthorization<'a> {
    config: &'a GrantFlowConfig,
    client: Option<&'a dyn Client>,
    resource_owner: Option<&'a dyn ResourceOwner>,
    params: AuthorizationParams,
    state: AuthorizationState,
    redirect_verified: bool,
}

impl<'a> PreAuthorization<'a> {
    /// Build a pending pre-authorization
    ///
    /// `client` is the caller's lookup result for `params.client_id`.
    #[must_use]
    pub const fn new(
        config: &'a GrantFlowConfig,
        client: Option<&'a dyn Client>,
        params: AuthorizationParams,
    ) -> Self {
        Self {
            config,
            client,
            resource_owner: None,
            params,
            state: AuthorizationState::Pending,
            redirect_verified: false,
        }
    }

    /// Attach the authenticated resource owner, if any
    #[must_use]
    pub fn with_resource_owner(mut self, owner: &'a dyn ResourceOwner) -> Self {
        self.resource_owner = Some(owner);
        self
    }

    /// Evaluate the request once and report whether it is authorizable
    ///
    /// Later calls return the cached decision.
    pub fn authorizable(&mut self) -> bool {
        if matches!(self.state, AuthorizationState::Pending) {
            self.state = match self.evaluate() {
                Ok(resolved) => AuthorizationState::Authorizable(resolved),
                Err(error) => {
                    debug!(
                        client_id = ?self.params.client_id,
                        error = %error,
                        "Pre-authorization rejected"
                    );
                    AuthorizationState::Rejected(error)
                }
            };
        }
        matches!(self.state, AuthorizationState::Authorizable(_))
    }

    fn evaluate(&mut self) -> OAuthResult<ResolvedAuthorization> {
        if self.params.client_id.as_deref().is_none_or(str::is_empty) {
            return Err(OAuthError::missing_param("client_id"));
        }
        let client = self.client.ok_or_else(OAuthError::invalid_client)?;

        let policy = GrantFlowPolicy::new(self.config);
        let response_type = policy.check_response_type(self.params.response_type.as_deref(), client)?;
        let flow = response_type.grant_flow();

        let requirement = RedirectRequirement::for_flow(flow, policy.allows_for_client(flow, client));
        validate_redirect_uri(client, self.params.redirect_uri.as_deref(), requirement)?;
        self.redirect_verified = true;

        if !self
            .config
            .authorize_resource_owner_for_client(self.resource_owner, client)
        {
            return Err(OAuthErrorKind::AccessDenied.into());
        }

        let scopes = ScopeResolver::new(self.config).resolve(self.params.scope.as_deref(), client, flow)?;

        let code_challenge = match response_type {
            ResponseType::Code => CodeChallenge::from_request(
                self.params.code_challenge.as_deref(),
                self.params.code_challenge_method.as_deref(),
                self.config.pkce_required,
            )?,
            ResponseType::Token => None,
        };

        Ok(ResolvedAuthorization {
            response_type,
            scopes,
            code_challenge,
        })
    }

    /// Current decision state
    #[must_use]
    pub const fn decision(&self) -> &AuthorizationState {
        &self.state
    }

    /// Values resolved by a successful evaluation
    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedAuthorization> {
        match &self.state {
            AuthorizationState::Authorizable(resolved) => Some(resolved),
            _ => None,
        }
    }

    /// Rejection reason, if evaluation failed
    #[must_use]
    pub const fn error(&self) -> Option<&OAuthError> {
        match &self.state {
            AuthorizationState::Rejected(error) => Some(error),
            _ => None,
        }
    }

    /// Whether an error may be delivered to the redirect URI
    #[must_use]
    pub fn can_redirect_error(&self) -> bool {
        self.redirect_verified
            && self
                .error()
                .is_none_or(|error| error.kind.is_redirectable())
    }

    /// Error body for the rejection, with state echoed
    #[must_use]
    pub fn error_response(&self) -> Option<ErrorResponse> {
        self.error()
            .map(|error| ErrorResponse::new(error, self.state()))
    }

    /// Resolved scopes
    #[must_use]
    pub fn scopes(&self) -> Option<&ScopeSet> {
        self.resolved().map(|resolved| &resolved.scopes)
    }

    /// Resolved scope string, or the requested one before resolution
    #[must_use]
    pub fn scope(&self) -> String {
        self.scopes().map_or_else(
            || self.params.scope.clone().unwrap_or_default(),
            ToString::to_string,
        )
    }

    /// Opaque state from the request
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.params.state.as_deref()
    }

    /// Requested redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        self.params.redirect_uri.as_deref()
    }

    /// Accepted response type
    #[must_use]
    pub fn response_type(&self) -> Option<ResponseType> {
        self.resolved().map(|resolved| resolved.response_type)
    }

    /// Response type named by the request, whether or not it was accepted
    #[must_use]
    pub fn requested_response_type(&self) -> Option<ResponseType> {
        self.params
            .response_type
            .as_deref()
            .and_then(ResponseType::from_param)
    }

    /// Resolved client
    #[must_use]
    pub const fn client(&self) -> Option<&'a dyn Client> {
        self.client
    }

    /// Resource owner attached to the request
    #[must_use]
    pub const fn resource_owner(&self) -> Option<&'a dyn ResourceOwner> {
        self.resource_owner
    }

    /// Configuration the request is evaluated against
    #[must_use]
    pub const fn config(&self) -> &'a GrantFlowConfig {
        self.config
    }

    /// Status document for display or API consumption
    ///
    /// Fields in `extra` are merged at the top level and win on collision.
    #[must_use]
    pub fn as_json(&self, messages: &dyn Messages, extra: Map<String, Value>) -> Value {
        let mut document = json!({
            "client_id": self.client.map_or_else(
                || self.params.client_id.clone(),
                |client| Some(client.uid().to_owned()),
            ),
            "redirect_uri": self.params.redirect_uri,
            "state": self.params.state,
            "response_type": self.params.response_type,
            "scope": self.scope(),
            "client_name": self.client.map(|client| client.name()),
            "status": messages.pre_authorization_status(),
        });
        if let Value::Object(fields) = &mut document {
            fields.extend(extra);
        }
        document
    }
}
