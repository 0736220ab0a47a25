// ABOUTME: Error types for the authorization engine and its configuration layer
// ABOUTME: Re-exports the OAuth error taxonomy and configuration errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

/// Configuration loading errors
pub mod config;
/// OAuth 2.0 protocol errors shared with the token issuer contract
pub mod oauth;

pub use config::ConfigError;
pub use oauth::{OAuthError, OAuthErrorKind, OAuthResult};
