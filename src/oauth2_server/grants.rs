// ABOUTME: Persisted grant records the caller loads before a token exchange
// ABOUTME: Authorization codes and refresh tokens with expiry and revocation state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pkce::CodeChallenge;
use crate::models::ScopeSet;

/// Stored authorization code awaiting exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAuthorizationCode {
    /// The authorization code value
    pub code: String,
    /// Client the code was issued to
    pub client_uid: String,
    /// Resource owner who authorized the code
    pub resource_owner_id: String,
    /// Redirect URI that must match during exchange
    pub redirect_uri: String,
    /// Scopes granted at authorization time
    pub scopes: ScopeSet,
    /// When the code expires
    pub expires_at: DateTime<Utc>,
    /// When the code was revoked, if ever
    pub revoked_at: Option<DateTime<Utc>>,
    /// PKCE challenge bound to the code
    pub code_challenge: Option<CodeChallenge>,
}

impl StoredAuthorizationCode {
    /// Whether the code can still be exchanged at `now`
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// Stored refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    /// The refresh token value
    pub refresh_token: String,
    /// Client the token was issued to
    pub client_uid: Option<String>,
    /// Resource owner the token acts for
    pub resource_owner_id: Option<String>,
    /// Scopes of the original grant
    pub scopes: ScopeSet,
    /// Expiry, if refresh tokens expire
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the token has been revoked or rotated
    pub revoked: bool,
}

impl StoredRefreshToken {
    /// Whether the token can still be exchanged at `now`
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}
