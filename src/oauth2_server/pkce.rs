// ABOUTME: PKCE (RFC 7636) challenge validation at authorization time and verifier checks at exchange
// ABOUTME: Supports plain and S256 methods with constant-time comparison
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::fmt::{self, Display, Formatter};

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::constants::oauth::{PKCE_METHOD_PLAIN, PKCE_METHOD_S256};
use crate::errors::{OAuthError, OAuthResult};

/// PKCE code challenge method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    /// Challenge equals the verifier
    #[serde(rename = "plain")]
    Plain,
    /// Challenge is base64url(SHA-256(verifier)) without padding
    S256,
}

impl CodeChallengeMethod {
    /// Parse a `code_challenge_method` parameter
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            PKCE_METHOD_PLAIN => Some(Self::Plain),
            PKCE_METHOD_S256 => Some(Self::S256),
            _ => None,
        }
    }

    /// Wire name of the method
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => PKCE_METHOD_PLAIN,
            Self::S256 => PKCE_METHOD_S256,
        }
    }

    /// Derive the challenge for a verifier
    #[must_use]
    pub fn challenge_for(&self, verifier: &str) -> String {
        match self {
            Self::Plain => verifier.to_owned(),
            Self::S256 => general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
        }
    }
}

impl Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated code challenge attached to an authorization request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChallenge {
    /// Challenge value
    pub challenge: String,
    /// Transformation applied to the verifier
    pub method: CodeChallengeMethod,
}

impl CodeChallenge {
    /// Validate the PKCE parameters of an authorization request
    ///
    /// An omitted method defaults to `plain` (RFC 7636 §4.3).
    ///
    /// # Errors
    ///
    /// `invalid_request` for an unknown method, a method without a
    /// challenge, or a missing challenge when PKCE is required.
    pub fn from_request(
        challenge: Option<&str>,
        method: Option<&str>,
        required: bool,
    ) -> OAuthResult<Option<Self>> {
        let challenge = challenge.filter(|c| !c.is_empty());
        let method = method.filter(|m| !m.is_empty());

        match (challenge, method) {
            (None, None) if required => Err(OAuthError::missing_param("code_challenge")),
            (None, None) => Ok(None),
            (None, Some(_)) => Err(OAuthError::missing_param("code_challenge")),
            (Some(challenge), method) => {
                let method = match method {
                    None => CodeChallengeMethod::Plain,
                    Some(raw) => CodeChallengeMethod::from_param(raw).ok_or_else(|| {
                        OAuthError::invalid_request(format!(
                            "Unsupported code_challenge_method: {raw}."
                        ))
                    })?,
                };
                Ok(Some(Self {
                    challenge: challenge.to_owned(),
                    method,
                }))
            }
        }
    }

    /// Verify a `code_verifier` against this challenge in constant time
    #[must_use]
    pub fn verify(&self, verifier: &str) -> bool {
        let computed = self.method.challenge_for(verifier);
        computed.as_bytes().ct_eq(self.challenge.as_bytes()).into()
    }
}
