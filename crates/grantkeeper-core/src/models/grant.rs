// ABOUTME: Grant flow and response type identifiers with their wire names
// ABOUTME: Maps authorization response types onto the flows they start
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::oauth;

/// A grant flow name that is not supported
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown grant flow: {0}")]
pub struct UnknownGrantFlow(pub String);

/// Named OAuth 2.0 authorization patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantFlow {
    /// Authorization code grant (RFC 6749 §4.1)
    AuthorizationCode,
    /// Implicit grant (RFC 6749 §4.2)
    Implicit,
    /// Client credentials grant (RFC 6749 §4.4)
    ClientCredentials,
    /// Resource owner password credentials grant (RFC 6749 §4.3)
    Password,
    /// Refresh token grant (RFC 6749 §6)
    RefreshToken,
}

impl GrantFlow {
    /// Every supported flow
    pub const ALL: [Self; 5] = [
        Self::AuthorizationCode,
        Self::Implicit,
        Self::ClientCredentials,
        Self::Password,
        Self::RefreshToken,
    ];

    /// Wire name of the flow
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => oauth::GRANT_AUTHORIZATION_CODE,
            Self::Implicit => oauth::GRANT_IMPLICIT,
            Self::ClientCredentials => oauth::GRANT_CLIENT_CREDENTIALS,
            Self::Password => oauth::GRANT_PASSWORD,
            Self::RefreshToken => oauth::GRANT_REFRESH_TOKEN,
        }
    }

    /// Resolve a token endpoint `grant_type` parameter
    ///
    /// The implicit flow has no token endpoint grant type, so `"implicit"`
    /// resolves to `None`.
    #[must_use]
    pub fn from_grant_type(grant_type: &str) -> Option<Self> {
        match grant_type.parse() {
            Ok(Self::Implicit) | Err(_) => None,
            Ok(flow) => Some(flow),
        }
    }

    /// Whether the flow sends the user agent back through a redirect URI
    #[must_use]
    pub const fn requires_redirect_uri(&self) -> bool {
        matches!(self, Self::AuthorizationCode | Self::Implicit)
    }

    /// Whether tokens issued through this flow may carry a refresh token
    #[must_use]
    pub const fn supports_refresh_token(&self) -> bool {
        !matches!(self, Self::Implicit | Self::ClientCredentials)
    }
}

impl Display for GrantFlow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantFlow {
    type Err = UnknownGrantFlow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flow| flow.as_str() == s)
            .ok_or_else(|| UnknownGrantFlow(s.to_owned()))
    }
}

/// Authorization endpoint `response_type` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Request an authorization code
    Code,
    /// Request an access token directly (implicit flow)
    Token,
}

impl ResponseType {
    /// Parse a `response_type` parameter; unknown values resolve to `None`
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            oauth::RESPONSE_TYPE_CODE => Some(Self::Code),
            oauth::RESPONSE_TYPE_TOKEN => Some(Self::Token),
            _ => None,
        }
    }

    /// Wire name of the response type
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => oauth::RESPONSE_TYPE_CODE,
            Self::Token => oauth::RESPONSE_TYPE_TOKEN,
        }
    }

    /// The flow this response type starts
    #[must_use]
    pub const fn grant_flow(&self) -> GrantFlow {
        match self {
            Self::Code => GrantFlow::AuthorizationCode,
            Self::Token => GrantFlow::Implicit,
        }
    }
}

impl Display for ResponseType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
