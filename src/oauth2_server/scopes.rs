// ABOUTME: Scope negotiation: default substitution and the server/client/grant-type ceiling
// ABOUTME: The ceiling is the intersection of every restricted axis; unrestricted axes are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use tracing::debug;

use super::client::Client;
use crate::config::GrantFlowConfig;
use crate::errors::OAuthError;
use crate::models::{GrantFlow, ScopeSet};

/// Why a scope set could not be authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRejection {
    /// No scope was requested and no default scopes are configured
    Empty,
    /// A scope is outside the server-wide allowed scopes
    ExceedsServerScopes,
    /// A scope is outside the client's allowed scopes
    ExceedsClientScopes,
    /// A scope is outside the scopes allowed for the grant type
    ExceedsGrantTypeScopes,
}

impl ScopeRejection {
    /// Human-readable explanation
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Empty => "No scope was requested and no default scopes are configured.",
            Self::ExceedsServerScopes => "The requested scope is not known to this server.",
            Self::ExceedsClientScopes => "The requested scope is not allowed for this client.",
            Self::ExceedsGrantTypeScopes => "The requested scope is not allowed for this grant type.",
        }
    }
}

impl From<ScopeRejection> for OAuthError {
    fn from(rejection: ScopeRejection) -> Self {
        Self::invalid_scope(rejection.description())
    }
}

/// Resolves the effective scopes of a request
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver<'a> {
    config: &'a GrantFlowConfig,
}

impl<'a> ScopeResolver<'a> {
    /// Create a resolver over the given configuration
    #[must_use]
    pub const fn new(config: &'a GrantFlowConfig) -> Self {
        Self { config }
    }

    /// Resolve scopes where an empty result is a rejection
    ///
    /// Used by the authorization endpoint.
    ///
    /// # Errors
    ///
    /// Returns a `ScopeRejection` when no scope can be determined or the
    /// resolved set exceeds the applicable ceiling.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        client: &dyn Client,
        flow: GrantFlow,
    ) -> Result<ScopeSet, ScopeRejection> {
        let scopes = self.with_defaults(requested);
        if scopes.is_empty() {
            return Err(ScopeRejection::Empty);
        }
        self.check_ceiling(&scopes, client, flow)?;
        Ok(scopes)
    }

    /// Resolve scopes where an empty result is passed through
    ///
    /// Used by token endpoint grants, where an empty scope set is handed to
    /// the issuer unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `ScopeRejection` when a non-empty set exceeds the ceiling.
    pub fn resolve_allowing_empty(
        &self,
        requested: Option<&str>,
        client: &dyn Client,
        flow: GrantFlow,
    ) -> Result<ScopeSet, ScopeRejection> {
        let scopes = self.with_defaults(requested);
        if !scopes.is_empty() {
            self.check_ceiling(&scopes, client, flow)?;
        }
        Ok(scopes)
    }

    fn with_defaults(&self, requested: Option<&str>) -> ScopeSet {
        let scopes = requested.map(ScopeSet::from_string).unwrap_or_default();
        if scopes.is_empty() {
            self.config.default_scopes.clone()
        } else {
            scopes
        }
    }

    /// Intersection of every restricted axis, or `None` when nothing is restricted
    #[must_use]
    pub fn ceiling(&self, client: &dyn Client, flow: GrantFlow) -> Option<ScopeSet> {
        self.restricted_axes(client, flow)
            .into_iter()
            .map(|(_, scopes)| scopes)
            .reduce(|acc, scopes| acc.intersection(&scopes))
    }

    /// Check a resolved set against the ceiling
    ///
    /// The intersection decides; the first axis that excludes a scope names
    /// the rejection.
    ///
    /// # Errors
    ///
    /// Returns the rejection for the first failing axis, checked in the
    /// order server, client, grant type.
    pub fn check_ceiling(
        &self,
        scopes: &ScopeSet,
        client: &dyn Client,
        flow: GrantFlow,
    ) -> Result<(), ScopeRejection> {
        let Some(ceiling) = self.ceiling(client, flow) else {
            return Ok(());
        };
        if scopes.is_subset_of(&ceiling) {
            return Ok(());
        }

        let rejection = self
            .restricted_axes(client, flow)
            .into_iter()
            .find(|(_, axis)| !scopes.is_subset_of(axis))
            .map_or(ScopeRejection::ExceedsServerScopes, |(rejection, _)| rejection);

        debug!(
            client_id = %client.uid(),
            grant_flow = %flow,
            scopes = %scopes,
            ceiling = %ceiling,
            rejection = ?rejection,
            "Requested scopes exceed the applicable ceiling"
        );
        Err(rejection)
    }

    fn restricted_axes(&self, client: &dyn Client, flow: GrantFlow) -> Vec<(ScopeRejection, ScopeSet)> {
        let mut axes = Vec::with_capacity(3);

        let server = self.config.server_scopes();
        if !server.is_empty() {
            axes.push((ScopeRejection::ExceedsServerScopes, server));
        }
        if !client.scopes().is_empty() {
            axes.push((ScopeRejection::ExceedsClientScopes, client.scopes().clone()));
        }
        if let Some(grant_scopes) = self.config.scopes_for_grant_type(flow) {
            axes.push((ScopeRejection::ExceedsGrantTypeScopes, grant_scopes.clone()));
        }

        axes
    }
}
