// ABOUTME: Core value types for the authorization engine
// ABOUTME: Scope sets, grant flows, and authorization response types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

/// Grant flow and response type identifiers
pub mod grant;
/// Space-delimited scope sets with set algebra
pub mod scopes;

pub use grant::{GrantFlow, ResponseType, UnknownGrantFlow};
pub use scopes::ScopeSet;
