// ABOUTME: Consent step of the authorization endpoint: issues a code or implicit token, or denies
// ABOUTME: Renders redirect locations with query parameters for codes and fragments for tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use tracing::{info, warn};
use url::form_urlencoded::Serializer;
use url::Url;

use super::issuer::{CodeParams, IssueParams, IssuedCode, IssuedToken, TokenIssuer};
use super::messages::{EnglishMessages, Messages};
use super::pre_authorization::PreAuthorization;
use super::redirect::is_native_redirect_uri;
use super::responses::ErrorResponse;
use crate::config::ExpiryContext;
use crate::errors::{OAuthError, OAuthErrorKind};
use crate::models::{GrantFlow, ResponseType};

/// Outcome of the consent step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResponse {
    /// Authorization code issued
    Code {
        /// Redirect target
        redirect_uri: String,
        /// The issued code
        code: IssuedCode,
        /// Echoed client state
        state: Option<String>,
    },
    /// Access token issued through the implicit flow
    Token {
        /// Redirect target
        redirect_uri: String,
        /// The issued token
        token: IssuedToken,
        /// Echoed client state
        state: Option<String>,
    },
    /// Request denied or rejected
    Error {
        /// Redirect target, present only when the URI was validated
        redirect_uri: Option<String>,
        /// Whether parameters travel in the URI fragment
        in_fragment: bool,
        /// Error body
        error: ErrorResponse,
    },
}

impl AuthorizationResponse {
    /// Whether a credential was issued
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Whether the response should be shown to the user instead of redirected
    #[must_use]
    pub fn is_native(&self) -> bool {
        match self {
            Self::Code { redirect_uri, .. } | Self::Token { redirect_uri, .. } => {
                is_native_redirect_uri(redirect_uri)
            }
            Self::Error { redirect_uri, .. } => {
                redirect_uri.as_deref().is_none_or(is_native_redirect_uri)
            }
        }
    }

    /// Location the user agent should be redirected to
    ///
    /// `None` for the native out-of-band URI, for errors that cannot be
    /// redirected, and for redirect URIs that fail to parse.
    #[must_use]
    pub fn redirect_location(&self) -> Option<String> {
        if self.is_native() {
            return None;
        }
        match self {
            Self::Code {
                redirect_uri,
                code,
                state,
            } => {
                let mut pairs = vec![("code", code.code.clone())];
                pairs.extend(state.clone().map(|state| ("state", state)));
                with_query(redirect_uri, &pairs)
            }
            Self::Token {
                redirect_uri,
                token,
                state,
            } => {
                let mut pairs = vec![
                    ("access_token", token.token.clone()),
                    ("token_type", token.token_type.clone()),
                ];
                pairs.extend(
                    token
                        .expires_in
                        .map(|expires_in| ("expires_in", expires_in.to_string())),
                );
                if !token.scopes.is_empty() {
                    pairs.push(("scope", token.scopes.to_string()));
                }
                pairs.extend(state.clone().map(|state| ("state", state)));
                with_fragment(redirect_uri, &pairs)
            }
            Self::Error {
                redirect_uri,
                in_fragment,
                error,
            } => {
                let redirect_uri = redirect_uri.as_deref()?;
                let mut pairs = vec![
                    ("error", error.error.as_str().to_owned()),
                    ("error_description", error.error_description.clone()),
                ];
                pairs.extend(error.state.clone().map(|state| ("state", state)));
                if *in_fragment {
                    with_fragment(redirect_uri, &pairs)
                } else {
                    with_query(redirect_uri, &pairs)
                }
            }
        }
    }
}

fn with_query(redirect_uri: &str, pairs: &[(&str, String)]) -> Option<String> {
    let mut url = Url::parse(redirect_uri).ok()?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    Some(url.into())
}

fn with_fragment(redirect_uri: &str, pairs: &[(&str, String)]) -> Option<String> {
    let mut url = Url::parse(redirect_uri).ok()?;
    let mut fragment = Serializer::new(String::new());
    for (key, value) in pairs {
        fragment.append_pair(key, value);
    }
    url.set_fragment(Some(&fragment.finish()));
    Some(url.into())
}

/// Consent decision over an evaluated pre-authorization
pub struct AuthorizationRequest<'a, 'p> {
    pre_auth: &'p mut PreAuthorization<'a>,
    messages: &'p dyn Messages,
}

impl<'a, 'p> AuthorizationRequest<'a, 'p> {
    /// Wrap a pre-authorization
    ///
    /// The consenting resource owner is the one attached to the
    /// pre-authorization, so the owner checked by the authorization
    /// predicate is the owner credentials are issued for.
    pub fn new(pre_auth: &'p mut PreAuthorization<'a>) -> Self {
        Self {
            pre_auth,
            messages: &EnglishMessages,
        }
    }

    /// Use localized error descriptions
    #[must_use]
    pub fn with_messages(mut self, messages: &'p dyn Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Issue the credential for the accepted response type
    ///
    /// A rejected pre-authorization yields its error response and a
    /// pre-authorization without a resource owner is denied.
    pub fn authorize(&mut self, issuer: &dyn TokenIssuer) -> AuthorizationResponse {
        if !self.pre_auth.authorizable() {
            return self.rejection();
        }
        let Some(resource_owner) = self.pre_auth.resource_owner() else {
            warn!("Authorization attempted without a resource owner");
            return self.access_denied();
        };
        let (Some(client), Some(resolved), Some(redirect_uri)) = (
            self.pre_auth.client(),
            self.pre_auth.resolved(),
            self.pre_auth.redirect_uri(),
        ) else {
            return self.rejection();
        };
        let redirect_uri = redirect_uri.to_owned();
        let state = self.pre_auth.state().map(str::to_owned);
        let config = self.pre_auth.config();

        match resolved.response_type {
            ResponseType::Code => {
                let params = CodeParams {
                    resource_owner,
                    redirect_uri: &redirect_uri,
                    expires_in: config.authorization_code_expires_in,
                    code_challenge: resolved.code_challenge.as_ref(),
                };
                match issuer.create_authorization_code(client, &resolved.scopes, &params) {
                    Ok(code) => {
                        info!(
                            client_id = %client.uid(),
                            scopes = %resolved.scopes,
                            "Authorization code issued"
                        );
                        AuthorizationResponse::Code {
                            redirect_uri,
                            code,
                            state,
                        }
                    }
                    Err(kind) => self.issuer_failure(kind, redirect_uri, false),
                }
            }
            ResponseType::Token => {
                let expires_in = config.custom_access_token_expires_in(&ExpiryContext {
                    client,
                    grant_flow: GrantFlow::Implicit,
                    scopes: &resolved.scopes,
                    resource_owner: Some(resource_owner),
                });
                let params = IssueParams {
                    grant_flow: GrantFlow::Implicit,
                    resource_owner: Some(resource_owner),
                    expires_in,
                    use_refresh_token: false,
                    reuse_access_token: config.reuse_access_token,
                    previous_refresh_token: None,
                };
                match issuer.create(client, &resolved.scopes, &params) {
                    Ok(token) => {
                        info!(
                            client_id = %client.uid(),
                            scopes = %resolved.scopes,
                            "Implicit access token issued"
                        );
                        AuthorizationResponse::Token {
                            redirect_uri,
                            token,
                            state,
                        }
                    }
                    Err(kind) => self.issuer_failure(kind, redirect_uri, true),
                }
            }
        }
    }

    /// Record the resource owner's refusal
    pub fn deny(&mut self) -> AuthorizationResponse {
        if !self.pre_auth.authorizable() {
            return self.rejection();
        }
        self.access_denied()
    }

    fn access_denied(&self) -> AuthorizationResponse {
        let error = OAuthError::new(
            OAuthErrorKind::AccessDenied,
            self.messages.error_description(OAuthErrorKind::AccessDenied),
        );
        AuthorizationResponse::Error {
            redirect_uri: self.pre_auth.redirect_uri().map(str::to_owned),
            in_fragment: self.pre_auth.response_type() == Some(ResponseType::Token),
            error: ErrorResponse::new(&error, self.pre_auth.state()),
        }
    }

    fn rejection(&self) -> AuthorizationResponse {
        let error = self.pre_auth.error_response().unwrap_or_else(|| {
            ErrorResponse::new(
                &OAuthErrorKind::InvalidRequest.into(),
                self.pre_auth.state(),
            )
        });
        let redirect_uri = self
            .pre_auth
            .can_redirect_error()
            .then(|| self.pre_auth.redirect_uri().map(str::to_owned))
            .flatten();
        let in_fragment = self.pre_auth.requested_response_type() == Some(ResponseType::Token);
        AuthorizationResponse::Error {
            redirect_uri,
            in_fragment,
            error,
        }
    }

    fn issuer_failure(
        &self,
        kind: OAuthErrorKind,
        redirect_uri: String,
        in_fragment: bool,
    ) -> AuthorizationResponse {
        warn!(error = %kind, "Token issuer failed during authorization");
        let error = OAuthError::new(kind, self.messages.error_description(kind));
        AuthorizationResponse::Error {
            redirect_uri: Some(redirect_uri),
            in_fragment,
            error: ErrorResponse::new(&error, self.pre_auth.state()),
        }
    }
}
