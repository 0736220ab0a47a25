// ABOUTME: OAuth 2.0 authorization-decision and token-issuance engine
// ABOUTME: Grant flow gating, scope negotiation, redirect validation, pre-authorization and token issuance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

/// Consent step and authorization endpoint redirects
pub mod authorization;
/// Client and resource owner capability interfaces plus an in-memory registry
pub mod client;
/// Grant flow enablement and per-client gating
pub mod flows;
/// Persisted authorization code and refresh token records
pub mod grants;
/// Token issuer contract
pub mod issuer;
/// In-memory token issuer
pub mod memory;
/// Localized status and error strings
pub mod messages;
/// PKCE code challenge handling (RFC 7636)
pub mod pkce;
/// Authorization endpoint decision
pub mod pre_authorization;
/// Redirect URI validation
pub mod redirect;
/// Token and error response bodies
pub mod responses;
/// Scope negotiation
pub mod scopes;
/// Token endpoint issuance
pub mod token_request;

// Authorization endpoint
pub use authorization::{AuthorizationRequest, AuthorizationResponse};
pub use pre_authorization::{
    AuthorizationParams, AuthorizationState, PreAuthorization, ResolvedAuthorization,
};

// Clients and resource owners
pub use client::{
    Client, ClientError, ClientStore, InMemoryClientStore, RegisteredClient, ResourceOwner,
};

// Policies
pub use flows::GrantFlowPolicy;
pub use redirect::{validate_redirect_uri, RedirectRequirement};
pub use scopes::{ScopeRejection, ScopeResolver};

// Token endpoint
pub use grants::{StoredAuthorizationCode, StoredRefreshToken};
pub use issuer::{CodeParams, IssueParams, IssuedCode, IssuedToken, TokenIssuer};
pub use memory::{AccessTokenRecord, InMemoryTokenIssuer};
pub use responses::{AccessTokenBody, ErrorResponse, TokenResponse};
pub use token_request::{
    AuthorizationCodeGrant, ClientCredentialsGrant, Grant, PasswordGrant, RefreshTokenGrant,
    TokenIssuanceRequest,
};

// Supporting types
pub use messages::{EnglishMessages, Messages};
pub use pkce::{CodeChallenge, CodeChallengeMethod};
