// ABOUTME: In-memory token issuer backed by concurrent maps
// ABOUTME: Random base64url credentials, optional token reuse, refresh rotation and single-use codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::sync::atomic::{AtomicU64, Ordering};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, error};

use super::client::{Client, ResourceOwner};
use super::grants::{StoredAuthorizationCode, StoredRefreshToken};
use super::issuer::{CodeParams, IssueParams, IssuedCode, IssuedToken, TokenIssuer};
use crate::constants::oauth::{TOKEN_SECRET_BYTES, TOKEN_TYPE_BEARER};
use crate::errors::OAuthErrorKind;
use crate::models::{GrantFlow, ScopeSet};

/// Access token as held by the in-memory issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    /// Token value
    pub token: String,
    /// Client the token was issued to
    pub client_uid: String,
    /// Resource owner the token acts for
    pub resource_owner_id: Option<String>,
    /// Flow the token was issued through
    pub grant_flow: GrantFlow,
    /// Granted scopes
    pub scopes: ScopeSet,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Expiry; `None` never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token issued alongside
    pub refresh_token: Option<String>,
    /// Whether the token was revoked
    pub revoked: bool,
}

impl AccessTokenRecord {
    /// Whether the token is neither revoked nor expired at `now`
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    fn to_issued(&self, now: DateTime<Utc>) -> IssuedToken {
        IssuedToken {
            token: self.token.clone(),
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            expires_in: self
                .expires_at
                .map(|expires_at| (expires_at - now).num_seconds().max(0)),
            scopes: self.scopes.clone(),
            refresh_token: self.refresh_token.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReuseKey {
    client_uid: String,
    resource_owner_id: Option<String>,
    scopes: Vec<String>,
}

impl ReuseKey {
    fn new(client: &dyn Client, owner: Option<&dyn ResourceOwner>, scopes: &ScopeSet) -> Self {
        let mut sorted: Vec<String> = scopes.iter().map(str::to_owned).collect();
        sorted.sort_unstable();
        Self {
            client_uid: client.uid().to_owned(),
            resource_owner_id: owner.map(|owner| owner.id()),
            scopes: sorted,
        }
    }
}

/// `TokenIssuer` that keeps every credential in process memory
#[derive(Debug)]
pub struct InMemoryTokenIssuer {
    rng: SystemRandom,
    access_tokens: DashMap<String, AccessTokenRecord>,
    reusable: DashMap<ReuseKey, String>,
    refresh_tokens: DashMap<String, StoredRefreshToken>,
    // refresh token -> access token issued alongside it
    refresh_index: DashMap<String, String>,
    authorization_codes: DashMap<String, StoredAuthorizationCode>,
    issued: AtomicU64,
}

impl Default for InMemoryTokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTokenIssuer {
    /// Create an empty issuer
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
            access_tokens: DashMap::new(),
            reusable: DashMap::new(),
            refresh_tokens: DashMap::new(),
            refresh_index: DashMap::new(),
            authorization_codes: DashMap::new(),
            issued: AtomicU64::new(0),
        }
    }

    /// Number of access tokens minted, excluding reuses
    #[must_use]
    pub fn issued_count(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Look up an access token
    #[must_use]
    pub fn find_access_token(&self, token: &str) -> Option<AccessTokenRecord> {
        self.access_tokens.get(token).map(|record| record.clone())
    }

    /// Look up a refresh token
    #[must_use]
    pub fn find_refresh_token(&self, refresh_token: &str) -> Option<StoredRefreshToken> {
        self.refresh_tokens
            .get(refresh_token)
            .map(|stored| stored.clone())
    }

    /// Remove and return an authorization code so it can only be exchanged once
    #[must_use]
    pub fn take_authorization_code(&self, code: &str) -> Option<StoredAuthorizationCode> {
        self.authorization_codes
            .remove(code)
            .map(|(_, stored)| stored)
    }

    /// Revoke an access token; returns whether it existed
    pub fn revoke_access_token(&self, token: &str) -> bool {
        self.access_tokens.get_mut(token).is_some_and(|mut record| {
            record.revoked = true;
            true
        })
    }

    /// Revoke a refresh token; returns whether it existed
    pub fn revoke_refresh_token(&self, refresh_token: &str) -> bool {
        self.refresh_tokens
            .get_mut(refresh_token)
            .is_some_and(|mut stored| {
                stored.revoked = true;
                true
            })
    }

    fn generate_secret(&self) -> Result<String, OAuthErrorKind> {
        let mut bytes = [0u8; TOKEN_SECRET_BYTES];
        self.rng.fill(&mut bytes).map_err(|e| {
            error!(error = ?e, "System RNG failure, cannot generate credential");
            OAuthErrorKind::ServerError
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Revoke a rotated refresh token together with the access token issued alongside it
    fn retire_refresh_token(&self, refresh_token: &str) {
        if self.revoke_refresh_token(refresh_token) {
            debug!("Previous refresh token revoked");
        }
        if let Some((_, access_token)) = self.refresh_index.remove(refresh_token) {
            if self.revoke_access_token(&access_token) {
                debug!("Access token of the previous refresh token revoked");
            }
        }
    }

    fn mint(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &IssueParams<'_>,
        now: DateTime<Utc>,
    ) -> Result<AccessTokenRecord, OAuthErrorKind> {
        let expires_at = params
            .expires_in
            .map(|expires_in| expires_after(now, expires_in))
            .transpose()?;
        let token = self.generate_secret()?;
        let refresh_token = if params.use_refresh_token {
            Some(self.generate_secret()?)
        } else {
            None
        };
        let resource_owner_id = params.resource_owner.map(|owner| owner.id());

        let record = AccessTokenRecord {
            token: token.clone(),
            client_uid: client.uid().to_owned(),
            resource_owner_id: resource_owner_id.clone(),
            grant_flow: params.grant_flow,
            scopes: scopes.clone(),
            created_at: now,
            expires_at,
            refresh_token: refresh_token.clone(),
            revoked: false,
        };
        self.access_tokens.insert(token.clone(), record.clone());

        if let Some(refresh_token) = refresh_token {
            self.refresh_index.insert(refresh_token.clone(), token);
            self.refresh_tokens.insert(
                refresh_token.clone(),
                StoredRefreshToken {
                    refresh_token,
                    client_uid: Some(client.uid().to_owned()),
                    resource_owner_id,
                    scopes: scopes.clone(),
                    expires_at: None,
                    revoked: false,
                },
            );
        }

        self.issued.fetch_add(1, Ordering::Relaxed);
        Ok(record)
    }
}

impl TokenIssuer for InMemoryTokenIssuer {
    fn create(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &IssueParams<'_>,
    ) -> Result<IssuedToken, OAuthErrorKind> {
        let now = Utc::now();

        if let Some(previous) = params.previous_refresh_token {
            // The old credentials stay valid if minting the replacement fails.
            let record = self.mint(client, scopes, params, now)?;
            self.retire_refresh_token(previous);
            debug!(client_id = %client.uid(), "Refresh token rotated");
            return Ok(record.to_issued(now));
        }

        if !params.reuse_access_token {
            return self
                .mint(client, scopes, params, now)
                .map(|record| record.to_issued(now));
        }

        // The entry guard serializes concurrent requests for the same key.
        match self
            .reusable
            .entry(ReuseKey::new(client, params.resource_owner, scopes))
        {
            Entry::Occupied(mut entry) => {
                let reused = self
                    .access_tokens
                    .get(entry.get())
                    .filter(|record| record.is_usable(now))
                    .map(|record| record.to_issued(now));
                if let Some(token) = reused {
                    debug!(client_id = %client.uid(), "Reusing unexpired access token");
                    return Ok(token);
                }
                let record = self.mint(client, scopes, params, now)?;
                entry.insert(record.token.clone());
                Ok(record.to_issued(now))
            }
            Entry::Vacant(entry) => {
                let record = self.mint(client, scopes, params, now)?;
                entry.insert(record.token.clone());
                Ok(record.to_issued(now))
            }
        }
    }

    fn create_authorization_code(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &CodeParams<'_>,
    ) -> Result<IssuedCode, OAuthErrorKind> {
        let expires_at = expires_after(Utc::now(), params.expires_in)?;
        let code = self.generate_secret()?;
        self.authorization_codes.insert(
            code.clone(),
            StoredAuthorizationCode {
                code: code.clone(),
                client_uid: client.uid().to_owned(),
                resource_owner_id: params.resource_owner.id(),
                redirect_uri: params.redirect_uri.to_owned(),
                scopes: scopes.clone(),
                expires_at,
                revoked_at: None,
                code_challenge: params.code_challenge.cloned(),
            },
        );
        Ok(IssuedCode {
            code,
            expires_in: params.expires_in.num_seconds(),
        })
    }
}

fn expires_after(
    now: DateTime<Utc>,
    expires_in: Duration,
) -> Result<DateTime<Utc>, OAuthErrorKind> {
    now.checked_add_signed(expires_in).ok_or_else(|| {
        error!(
            expires_in_secs = expires_in.num_seconds(),
            "Credential lifetime is out of range"
        );
        OAuthErrorKind::ServerError
    })
}
