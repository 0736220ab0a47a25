// ABOUTME: Grant flow gating for authorization and token requests
// ABOUTME: Maps response types to flows and checks server-wide and per-client enablement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use tracing::debug;

use super::client::Client;
use crate::config::GrantFlowConfig;
use crate::errors::{OAuthError, OAuthErrorKind, OAuthResult};
use crate::models::{GrantFlow, ResponseType};

/// Answers "is this flow usable here" questions; fails closed on unknown names
#[derive(Debug, Clone, Copy)]
pub struct GrantFlowPolicy<'a> {
    config: &'a GrantFlowConfig,
}

impl<'a> GrantFlowPolicy<'a> {
    /// Create a policy over the given configuration
    #[must_use]
    pub const fn new(config: &'a GrantFlowConfig) -> Self {
        Self { config }
    }

    /// Flow started by a `response_type` parameter
    #[must_use]
    pub fn flow_for_response_type(response_type: &str) -> Option<GrantFlow> {
        ResponseType::from_param(response_type).map(|rt| rt.grant_flow())
    }

    /// Whether a `response_type` is recognized and its flow enabled
    #[must_use]
    pub fn is_response_type_enabled(&self, response_type: &str) -> bool {
        Self::flow_for_response_type(response_type)
            .is_some_and(|flow| self.config.is_flow_enabled(flow))
    }

    /// Whether a token endpoint `grant_type` is recognized and enabled
    #[must_use]
    pub fn is_grant_type_enabled(&self, grant_type: &str) -> bool {
        GrantFlow::from_grant_type(grant_type).is_some_and(|flow| self.config.is_flow_enabled(flow))
    }

    /// Whether an enabled flow may be used by a specific client
    ///
    /// Both the configured hook and the client's own allow-list must agree.
    #[must_use]
    pub fn allows_for_client(&self, flow: GrantFlow, client: &dyn Client) -> bool {
        self.config.allow_grant_flow_for_client(flow, client) && client.allows_grant_flow(flow)
    }

    /// Resolve and gate an authorization endpoint `response_type`
    ///
    /// # Errors
    ///
    /// - `invalid_request` when the parameter is missing
    /// - `unsupported_response_type` when it is unknown or its flow disabled
    /// - `unauthorized_client` when the flow is disabled for this client
    pub fn check_response_type(
        &self,
        response_type: Option<&str>,
        client: &dyn Client,
    ) -> OAuthResult<ResponseType> {
        let raw = response_type
            .filter(|value| !value.is_empty())
            .ok_or_else(|| OAuthError::missing_param("response_type"))?;

        let response_type = ResponseType::from_param(raw)
            .filter(|rt| self.config.is_flow_enabled(rt.grant_flow()))
            .ok_or_else(|| {
                debug!(response_type = %raw, "Response type unknown or its flow is disabled");
                OAuthError::from(OAuthErrorKind::UnsupportedResponseType)
            })?;

        if !self.allows_for_client(response_type.grant_flow(), client) {
            debug!(
                client_id = %client.uid(),
                grant_flow = %response_type.grant_flow(),
                "Grant flow disabled for client"
            );
            return Err(OAuthErrorKind::UnauthorizedClient.into());
        }

        Ok(response_type)
    }

    /// Gate a token endpoint flow for a client
    ///
    /// # Errors
    ///
    /// - `unsupported_grant_type` when the flow is disabled server-wide
    /// - `unauthorized_client` when the flow is disabled for this client
    pub fn check_grant_flow(&self, flow: GrantFlow, client: &dyn Client) -> OAuthResult<()> {
        if !self.config.is_flow_enabled(flow) {
            debug!(grant_flow = %flow, "Grant flow disabled on this server");
            return Err(OAuthErrorKind::UnsupportedGrantType.into());
        }
        if !self.allows_for_client(flow, client) {
            debug!(client_id = %client.uid(), grant_flow = %flow, "Grant flow disabled for client");
            return Err(OAuthErrorKind::UnauthorizedClient.into());
        }
        Ok(())
    }
}
