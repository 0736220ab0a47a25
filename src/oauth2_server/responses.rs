// ABOUTME: Token endpoint and error response bodies (RFC 6749 §5.1 / §5.2)
// ABOUTME: A token response is exactly one of an issued token or an error, never both
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use serde::Serialize;

use super::issuer::IssuedToken;
use crate::errors::{OAuthError, OAuthErrorKind};
use crate::models::ScopeSet;

/// Successful token response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenBody {
    /// Access token value
    pub access_token: String,
    /// Token type (`Bearer`)
    pub token_type: String,
    /// Seconds until expiry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Refresh token, when issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scopes
    #[serde(skip_serializing_if = "ScopeSet::is_empty")]
    pub scope: ScopeSet,
    /// Creation time as a Unix timestamp
    pub created_at: i64,
}

impl From<IssuedToken> for AccessTokenBody {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            refresh_token: token.refresh_token,
            scope: token.scopes,
            created_at: token.created_at.timestamp(),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Error code
    pub error: OAuthErrorKind,
    /// Human-readable description
    pub error_description: String,
    /// Opaque state echoed back to the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ErrorResponse {
    /// Build an error body, echoing `state` verbatim
    #[must_use]
    pub fn new(error: &OAuthError, state: Option<&str>) -> Self {
        Self {
            error: error.kind,
            error_description: error.description.clone(),
            state: state.map(str::to_owned),
        }
    }

    /// HTTP status the transport layer should use
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.error {
            OAuthErrorKind::InvalidClient => 401,
            OAuthErrorKind::ServerError => 500,
            _ => 400,
        }
    }
}

impl From<OAuthError> for ErrorResponse {
    fn from(error: OAuthError) -> Self {
        Self::new(&error, None)
    }
}

/// Outcome of a token issuance request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenResponse {
    /// A token was issued or reused
    Issued(AccessTokenBody),
    /// The request was rejected
    Failed(ErrorResponse),
}

impl TokenResponse {
    /// Whether a token was issued
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Issued(_))
    }

    /// The issued token body, if any
    #[must_use]
    pub const fn token(&self) -> Option<&AccessTokenBody> {
        match self {
            Self::Issued(body) => Some(body),
            Self::Failed(_) => None,
        }
    }

    /// The error body, if any
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Issued(_) => None,
            Self::Failed(error) => Some(error),
        }
    }

    /// HTTP status the transport layer should use
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Issued(_) => 200,
            Self::Failed(error) => error.status_code(),
        }
    }
}
