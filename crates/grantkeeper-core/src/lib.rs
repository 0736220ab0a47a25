// ABOUTME: Core types and constants for the Grantkeeper OAuth2 decision engine
// ABOUTME: Foundation crate with scope sets, grant flows, error taxonomy, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

#![deny(unsafe_code)]

//! # Grantkeeper Core
//!
//! Foundation crate providing the value types shared by every part of the
//! Grantkeeper authorization engine. This crate is designed to change
//! infrequently, enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: OAuth 2.0 error taxonomy (`OAuthErrorKind`, `OAuthError`) and `ConfigError`
//! - **constants**: Protocol identifiers and default lifetimes
//! - **models**: `ScopeSet`, `GrantFlow`, and `ResponseType`

/// OAuth 2.0 error taxonomy and configuration errors
pub mod errors;

/// Protocol constants organized by domain
pub mod constants;

/// Core value types (scope sets, grant flows, response types)
pub mod models;
