// ABOUTME: Caller-supplied policy hooks consulted by the authorization engine
// ABOUTME: Resource-owner authorization, per-client grant flow gating, and custom token lifetimes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::sync::Arc;

use chrono::Duration;

use crate::models::{GrantFlow, ScopeSet};
use crate::oauth2_server::client::{Client, ResourceOwner};

/// Decides whether a resource owner may authorize a given client
pub type ResourceOwnerAuthorizer =
    Arc<dyn Fn(Option<&dyn ResourceOwner>, &dyn Client) -> bool + Send + Sync>;

/// Decides whether a globally enabled grant flow is allowed for a client
pub type GrantFlowAuthorizer = Arc<dyn Fn(GrantFlow, &dyn Client) -> bool + Send + Sync>;

/// Computes a per-request access token lifetime; `None` falls back to the default
pub type AccessTokenExpiry = Arc<dyn Fn(&ExpiryContext<'_>) -> Option<Duration> + Send + Sync>;

/// Inputs available when computing a custom access token lifetime
pub struct ExpiryContext<'a> {
    /// Client the token is issued to
    pub client: &'a dyn Client,
    /// Flow through which the token is issued
    pub grant_flow: GrantFlow,
    /// Scopes the token will carry
    pub scopes: &'a ScopeSet,
    /// Resource owner, absent for client credentials
    pub resource_owner: Option<&'a dyn ResourceOwner>,
}
