// ABOUTME: Closed OAuth 2.0 error taxonomy shared between the engine and token issuers
// ABOUTME: Maps each kind to its RFC 6749 wire code and default English description
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Result alias for engine operations that resolve to an OAuth error
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Every error code the engine or a token issuer may report
///
/// Issuers report one of these kinds and the engine passes it through
/// verbatim to the error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthErrorKind {
    /// Missing or malformed request parameter
    InvalidRequest,
    /// Unknown client or failed client authentication
    InvalidClient,
    /// Authorization code or refresh token is invalid, expired, or revoked
    InvalidGrant,
    /// Client is not allowed to use the requested grant flow
    UnauthorizedClient,
    /// Grant type is unknown or disabled on this server
    UnsupportedGrantType,
    /// Response type is unknown or its flow is disabled
    UnsupportedResponseType,
    /// Requested scope is empty, unknown, or exceeds what is allowed
    InvalidScope,
    /// Redirect URI does not match the client registration
    InvalidRedirectUri,
    /// Resource owner or authorization policy denied the request
    AccessDenied,
    /// Unexpected failure inside a collaborator
    ServerError,
}

impl OAuthErrorKind {
    /// Wire code as defined by RFC 6749
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidRedirectUri => "invalid_redirect_uri",
            Self::AccessDenied => "access_denied",
            Self::ServerError => "server_error",
        }
    }

    /// Default English description for this kind
    #[must_use]
    pub const fn default_description(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request is missing a required parameter, includes an unsupported parameter value, or is otherwise malformed.",
            Self::InvalidClient => "Client authentication failed due to unknown client, no client authentication included, or unsupported authentication method.",
            Self::InvalidGrant => "The provided authorization grant is invalid, expired, revoked, does not match the redirection URI used in the authorization request, or was issued to another client.",
            Self::UnauthorizedClient => "The client is not authorized to perform this request using this method.",
            Self::UnsupportedGrantType => "The authorization grant type is not supported by the authorization server.",
            Self::UnsupportedResponseType => "The authorization server does not support this response type.",
            Self::InvalidScope => "The requested scope is invalid, unknown, or malformed.",
            Self::InvalidRedirectUri => "The requested redirect uri is malformed or doesn't match client redirect URI.",
            Self::AccessDenied => "The resource owner or authorization server denied the request.",
            Self::ServerError => "The authorization server encountered an unexpected condition which prevented it from fulfilling the request.",
        }
    }

    /// Whether the error may be delivered to the client via its redirect URI
    ///
    /// Redirect URI and client errors must never redirect, since the target
    /// itself has not been validated.
    #[must_use]
    pub const fn is_redirectable(&self) -> bool {
        !matches!(self, Self::InvalidRedirectUri | Self::InvalidClient)
    }
}

impl Display for OAuthErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An OAuth error with its human-readable description
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {description}")]
pub struct OAuthError {
    /// Error code
    pub kind: OAuthErrorKind,
    /// Human-readable description
    pub description: String,
}

impl OAuthError {
    /// Create an error with a specific description
    #[must_use]
    pub fn new(kind: OAuthErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    /// Create an `invalid_request` error naming the offending parameter
    #[must_use]
    pub fn missing_param(param: &str) -> Self {
        Self::new(
            OAuthErrorKind::InvalidRequest,
            format!("Missing required parameter: {param}."),
        )
    }

    /// Create an `invalid_request` error
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::new(OAuthErrorKind::InvalidRequest, description)
    }

    /// Create an `invalid_client` error
    #[must_use]
    pub fn invalid_client() -> Self {
        OAuthErrorKind::InvalidClient.into()
    }

    /// Create an `invalid_grant` error
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::new(OAuthErrorKind::InvalidGrant, description)
    }

    /// Create an `invalid_scope` error
    #[must_use]
    pub fn invalid_scope(description: impl Into<String>) -> Self {
        Self::new(OAuthErrorKind::InvalidScope, description)
    }
}

impl From<OAuthErrorKind> for OAuthError {
    fn from(kind: OAuthErrorKind) -> Self {
        Self::new(kind, kind.default_description())
    }
}
