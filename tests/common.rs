// ABOUTME: Shared test utilities and fixtures for integration tests
// ABOUTME: Provides quiet logging, standard clients and configs, and a recording token issuer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `grantkeeper`

use std::sync::{Mutex, Once};

use chrono::{Duration, Utc};
use grantkeeper::config::GrantFlowConfig;
use grantkeeper::constants::oauth::TOKEN_TYPE_BEARER;
use grantkeeper::errors::OAuthErrorKind;
use grantkeeper::models::{GrantFlow, ScopeSet};
use grantkeeper::oauth2_server::{
    AuthorizationParams, Client, CodeParams, IssueParams, IssuedCode, IssuedToken,
    RegisteredClient, TokenIssuer,
};

static INIT_LOGGER: Once = Once::new();

pub const APP_CALLBACK: &str = "https://app.com/callback";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Server config with default scope `default` and optional scopes `public profile`
pub fn scoped_config() -> GrantFlowConfig {
    init_test_logging();
    GrantFlowConfig::default()
        .with_default_scopes("default")
        .with_optional_scopes("public profile")
}

/// Client `app.com` registered with `https://app.com/callback`
pub fn app_client() -> RegisteredClient {
    RegisteredClient::new("app.com", "App").with_redirect_uri(APP_CALLBACK)
}

/// Authorization endpoint parameters for `app.com`
pub fn authorization_params(response_type: &str, scope: Option<&str>) -> AuthorizationParams {
    AuthorizationParams {
        client_id: Some("app.com".to_owned()),
        response_type: Some(response_type.to_owned()),
        redirect_uri: Some(APP_CALLBACK.to_owned()),
        scope: scope.map(str::to_owned),
        state: Some("xyz".to_owned()),
        ..AuthorizationParams::default()
    }
}

/// What a `RecordingIssuer` saw on one `create` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedIssue {
    pub client_uid: String,
    pub scopes: ScopeSet,
    pub grant_flow: GrantFlow,
    pub resource_owner_id: Option<String>,
    pub expires_in: Option<Duration>,
    pub use_refresh_token: bool,
    pub previous_refresh_token: Option<String>,
}

/// Token issuer that records its inputs and returns a fixed outcome
#[derive(Default)]
pub struct RecordingIssuer {
    pub calls: Mutex<Vec<RecordedIssue>>,
    pub failure: Option<OAuthErrorKind>,
}

impl RecordingIssuer {
    pub fn failing(kind: OAuthErrorKind) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(kind),
        }
    }

    pub fn calls(&self) -> Vec<RecordedIssue> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> RecordedIssue {
        self.calls().pop().expect("issuer was not called")
    }
}

impl TokenIssuer for RecordingIssuer {
    fn create(
        &self,
        client: &dyn Client,
        scopes: &ScopeSet,
        params: &IssueParams<'_>,
    ) -> Result<IssuedToken, OAuthErrorKind> {
        self.calls.lock().unwrap().push(RecordedIssue {
            client_uid: client.uid().to_owned(),
            scopes: scopes.clone(),
            grant_flow: params.grant_flow,
            resource_owner_id: params.resource_owner.map(|owner| owner.id()),
            expires_in: params.expires_in,
            use_refresh_token: params.use_refresh_token,
            previous_refresh_token: params.previous_refresh_token.map(str::to_owned),
        });
        if let Some(kind) = self.failure {
            return Err(kind);
        }
        Ok(IssuedToken {
            token: "access-token".to_owned(),
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            expires_in: params.expires_in.map(|d| d.num_seconds()),
            scopes: scopes.clone(),
            refresh_token: params.use_refresh_token.then(|| "refresh-token".to_owned()),
            created_at: Utc::now(),
        })
    }

    fn create_authorization_code(
        &self,
        _client: &dyn Client,
        _scopes: &ScopeSet,
        params: &CodeParams<'_>,
    ) -> Result<IssuedCode, OAuthErrorKind> {
        if let Some(kind) = self.failure {
            return Err(kind);
        }
        Ok(IssuedCode {
            code: "auth-code".to_owned(),
            expires_in: params.expires_in.num_seconds(),
        })
    }
}
