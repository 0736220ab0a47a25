// ABOUTME: Main library entry point for the Grantkeeper OAuth 2.0 decision engine
// ABOUTME: Decides whether authorization requests are authorizable and issues tokens through a pluggable issuer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

#![deny(unsafe_code)]

//! # Grantkeeper
//!
//! The authorization-decision and token-issuance engine of an OAuth 2.0
//! provider. Given a client, a requested grant flow, requested scopes and
//! (for user-facing flows) an authenticated resource owner, it decides
//! whether the request is authorizable, computes the granted scopes, and
//! issues an authorization code, an access token, or an error response.
//!
//! HTTP routing, persistence and views stay with the caller, which talks to
//! the engine through the [`oauth2_server::Client`],
//! [`oauth2_server::ResourceOwner`] and [`oauth2_server::TokenIssuer`]
//! traits.
//!
//! ## Architecture
//!
//! - **Models**: scope sets, grant flows and response types
//! - **Config**: grant flow enablement, scope lists and policy hooks
//! - **`OAuth2` server**: flow gating, scope negotiation, redirect URI
//!   validation, pre-authorization and token issuance
//!
//! ## Example Usage
//!
//! ```rust
//! use grantkeeper::config::GrantFlowConfig;
//! use grantkeeper::oauth2_server::{AuthorizationParams, PreAuthorization, RegisteredClient};
//!
//! let config = GrantFlowConfig::default()
//!     .with_default_scopes("default")
//!     .with_optional_scopes("public profile");
//! let client = RegisteredClient::new("app.com", "App")
//!     .with_redirect_uri("https://app.com/callback");
//!
//! let params = AuthorizationParams {
//!     client_id: Some("app.com".into()),
//!     response_type: Some("code".into()),
//!     redirect_uri: Some("https://app.com/callback".into()),
//!     scope: Some("public".into()),
//!     ..AuthorizationParams::default()
//! };
//! let mut pre_auth = PreAuthorization::new(&config, Some(&client), params);
//! assert!(pre_auth.authorizable());
//! assert_eq!(pre_auth.scope(), "public");
//! ```

/// Shared constants, error types and domain models
pub use grantkeeper_core::{constants, errors, models};

/// Grant flow configuration and policy hooks
pub mod config;

/// Structured logging setup
pub mod logging;

/// `OAuth` 2.0 decision and issuance engine
pub mod oauth2_server;
