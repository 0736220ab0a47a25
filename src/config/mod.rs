// ABOUTME: Configuration management for the authorization engine
// ABOUTME: Grant flow enablement, scope policy, token lifetimes, and injectable policy hooks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors
//! Configuration module for Grantkeeper
//!
//! Configuration is a plain value loaded once at process start and passed
//! by reference to every component. There is no global instance: tests and
//! embedders substitute values per scenario through the `with_*` builders.
//!
//! - **Grant flows**: which flows are enabled, scope defaults and ceilings,
//!   token lifetimes, and refresh/reuse/PKCE switches
//! - **Hooks**: caller-supplied predicates for resource-owner authorization,
//!   per-client grant flow gating, and custom access token lifetimes

/// Grant flow configuration loaded from the environment
pub mod grant_flows;
/// Injectable policy hooks
pub mod hooks;

pub use grant_flows::GrantFlowConfig;
pub use hooks::{AccessTokenExpiry, ExpiryContext, GrantFlowAuthorizer, ResourceOwnerAuthorizer};
