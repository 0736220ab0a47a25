// ABOUTME: OAuth 2.0 wire identifiers for grant types, response types, and PKCE methods
// ABOUTME: Includes default token lifetimes and the native out-of-band redirect URI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

/// `authorization_code` grant type
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
/// Implicit flow name (no token endpoint grant type exists for it)
pub const GRANT_IMPLICIT: &str = "implicit";
/// `client_credentials` grant type
pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";
/// Resource owner password credentials grant type
pub const GRANT_PASSWORD: &str = "password";
/// `refresh_token` grant type
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// Response type selecting the authorization code flow
pub const RESPONSE_TYPE_CODE: &str = "code";
/// Response type selecting the implicit flow
pub const RESPONSE_TYPE_TOKEN: &str = "token";

/// Token type reported for every issued access token
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Out-of-band redirect URI for native applications (RFC 8252)
pub const NATIVE_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// PKCE plain challenge method
pub const PKCE_METHOD_PLAIN: &str = "plain";
/// PKCE SHA-256 challenge method
pub const PKCE_METHOD_S256: &str = "S256";

/// Default access token lifetime (2 hours)
pub const DEFAULT_ACCESS_TOKEN_EXPIRES_IN_SECS: i64 = 7200;
/// Default authorization code lifetime (10 minutes)
pub const DEFAULT_AUTHORIZATION_CODE_EXPIRES_IN_SECS: i64 = 600;
/// Longest configurable credential lifetime (10 years)
pub const MAX_EXPIRES_IN_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Size in bytes of generated token secrets before encoding
pub const TOKEN_SECRET_BYTES: usize = 32;
