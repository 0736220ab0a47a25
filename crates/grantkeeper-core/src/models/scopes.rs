// ABOUTME: Immutable scope set with order-independent equality and set algebra
// ABOUTME: Round-trips losslessly through the space-delimited OAuth scope string
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An ordered, duplicate-free collection of scope tokens
///
/// Insertion order is kept for rendering, but equality is set equality:
/// `"read write"` equals `"write read"`. Parsing never fails; empty and
/// repeated tokens are dropped.
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Create an empty scope set
    #[must_use]
    pub const fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Parse a space-delimited scope string
    #[must_use]
    pub fn from_string(scope: &str) -> Self {
        let mut set = Self::new();
        set.extend_tokens(scope);
        set
    }

    /// Build a scope set from a collection of scope strings
    ///
    /// Each element is itself split on whitespace, so `["read write"]`
    /// yields two scopes.
    #[must_use]
    pub fn from_collection<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for scope in scopes {
            set.extend_tokens(scope.as_ref());
        }
        set
    }

    fn extend_tokens(&mut self, raw: &str) {
        for token in raw.split_whitespace() {
            if !self.has(token) {
                self.scopes.push(token.to_owned());
            }
        }
    }

    /// Whether the set contains no scopes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Number of distinct scopes
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Case-sensitive membership test for a single scope token
    #[must_use]
    pub fn has(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    /// Whether every scope in this set is also in `other`
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.scopes.iter().all(|s| other.has(s))
    }

    /// Scopes present in both sets, in this set's order
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            scopes: self
                .scopes
                .iter()
                .filter(|s| other.has(s))
                .cloned()
                .collect(),
        }
    }

    /// Scopes present in either set, this set's order first
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for scope in &other.scopes {
            if !merged.has(scope) {
                merged.scopes.push(scope.clone());
            }
        }
        merged
    }

    /// Iterate scopes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }
}

impl PartialEq for ScopeSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset_of(other)
    }
}

impl Display for ScopeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(" "))
    }
}

impl FromStr for ScopeSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

impl From<&str> for ScopeSet {
    fn from(scope: &str) -> Self {
        Self::from_string(scope)
    }
}

impl From<String> for ScopeSet {
    fn from(scope: String) -> Self {
        Self::from_string(&scope)
    }
}

impl From<ScopeSet> for String {
    fn from(set: ScopeSet) -> Self {
        set.to_string()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_collection(iter)
    }
}
