// ABOUTME: Protocol constants for OAuth 2.0 grant flows, token types, and lifetimes
// ABOUTME: Central place for wire identifiers shared by the engine and its collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

//! Constants module

/// OAuth 2.0 protocol identifiers and defaults
pub mod oauth;

/// Service identifiers used in structured logs
pub mod service_names {
    /// Library and CLI service name
    pub const GRANTKEEPER: &str = "grantkeeper";
}

pub use oauth::*;
