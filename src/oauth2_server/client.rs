// ABOUTME: Client and resource-owner capability interfaces with an in-memory client registry
// ABOUTME: Registration validates redirect URIs; lookups return shared read-only client views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::redirect::validate_redirect_uri_format;
use crate::models::{GrantFlow, ScopeSet};

/// Read-only view of a registered client application
pub trait Client: Send + Sync {
    /// Public client identifier (`client_id`)
    fn uid(&self) -> &str;

    /// Display name shown to resource owners
    fn name(&self) -> &str;

    /// Raw registered redirect URI(s), whitespace or newline delimited
    fn redirect_uri(&self) -> Option<&str>;

    /// Registered redirect URIs as individual entries
    fn redirect_uris(&self) -> Vec<&str> {
        self.redirect_uri()
            .map(|raw| raw.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Scopes this client is restricted to; empty means unrestricted
    fn scopes(&self) -> &ScopeSet;

    /// Whether the client can keep a secret
    fn is_confidential(&self) -> bool;

    /// Client-level grant flow gate, consulted after the server-wide checks
    fn allows_grant_flow(&self, _flow: GrantFlow) -> bool {
        true
    }
}

/// The end user granting access
pub trait ResourceOwner: Send + Sync {
    /// Stable identifier of the resource owner
    fn id(&self) -> String;
}

impl ResourceOwner for String {
    fn id(&self) -> String {
        self.clone()
    }
}

impl ResourceOwner for Uuid {
    fn id(&self) -> String {
        self.to_string()
    }
}

/// Lookup of registered clients by `client_id`
pub trait ClientStore: Send + Sync {
    /// Find a client by its public identifier
    fn find_by_uid(&self, uid: &str) -> Option<Arc<dyn Client>>;
}

/// Errors raised while registering clients
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A redirect URI failed format validation
    #[error("Invalid redirect_uri '{uri}' for client {client_id}: {reason}")]
    InvalidRedirectUri {
        /// Client being registered
        client_id: String,
        /// Offending URI
        uri: String,
        /// Why the URI was rejected
        reason: &'static str,
    },

    /// A client with the same `client_id` already exists
    #[error("Client {0} is already registered")]
    Duplicate(String),

    /// The registry file could not be read
    #[error("Failed to read client registry {path}")]
    Io {
        /// Registry file path
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The registry file is not a JSON array of clients
    #[error("Failed to parse client registry {path}")]
    Parse {
        /// Registry file path
        path: String,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

const fn default_confidential() -> bool {
    true
}

/// Concrete client record used by the in-memory registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredClient {
    /// Public client identifier
    pub uid: String,
    /// Display name
    pub name: String,
    /// Registered redirect URI(s), whitespace or newline delimited
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Allowed scopes; empty means unrestricted
    #[serde(default)]
    pub scopes: ScopeSet,
    /// Whether the client can keep a secret
    #[serde(default = "default_confidential")]
    pub confidential: bool,
    /// Allowed grant flows; empty means every server-enabled flow
    #[serde(default)]
    pub grant_flows: Vec<GrantFlow>,
}

impl RegisteredClient {
    /// Create a confidential client with no redirect URI and no scope restriction
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            redirect_uri: None,
            scopes: ScopeSet::new(),
            confidential: true,
            grant_flows: Vec::new(),
        }
    }

    /// Set the registered redirect URI(s)
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Restrict the client to a set of scopes
    #[must_use]
    pub fn with_scopes(mut self, scopes: &str) -> Self {
        self.scopes = ScopeSet::from_string(scopes);
        self
    }

    /// Restrict the client to a set of grant flows
    #[must_use]
    pub fn with_grant_flows(mut self, flows: impl IntoIterator<Item = GrantFlow>) -> Self {
        self.grant_flows = flows.into_iter().collect();
        self
    }

    /// Mark the client as public (cannot keep a secret)
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.confidential = false;
        self
    }
}

impl Client for RegisteredClient {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    fn is_confidential(&self) -> bool {
        self.confidential
    }

    fn allows_grant_flow(&self, flow: GrantFlow) -> bool {
        self.grant_flows.is_empty() || self.grant_flows.contains(&flow)
    }
}

/// Thread-safe in-memory client registry
#[derive(Debug, Default)]
pub struct InMemoryClientStore {
    clients: DashMap<String, Arc<RegisteredClient>>,
    force_ssl: bool,
}

impl InMemoryClientStore {
    /// Create an empty registry
    ///
    /// With `force_ssl`, redirect URIs must use https unless they target a
    /// loopback host.
    #[must_use]
    pub fn new(force_ssl: bool) -> Self {
        Self {
            clients: DashMap::new(),
            force_ssl,
        }
    }

    /// Load a registry from a JSON array of client records
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the file cannot be read or parsed, or if any
    /// client fails registration.
    pub fn from_json_file(path: &Path, force_ssl: bool) -> Result<Self, ClientError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ClientError::Io {
            path: display.clone(),
            source,
        })?;
        let clients: Vec<RegisteredClient> =
            serde_json::from_str(&raw).map_err(|source| ClientError::Parse {
                path: display,
                source,
            })?;

        let store = Self::new(force_ssl);
        for client in clients {
            store.register(client)?;
        }
        Ok(store)
    }

    /// Register a client after validating its redirect URIs
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidRedirectUri` for a malformed URI and
    /// `ClientError::Duplicate` if the `client_id` is taken.
    pub fn register(&self, client: RegisteredClient) -> Result<(), ClientError> {
        for uri in client.redirect_uris() {
            validate_redirect_uri_format(uri, self.force_ssl).map_err(|reason| {
                ClientError::InvalidRedirectUri {
                    client_id: client.uid.clone(),
                    uri: uri.to_owned(),
                    reason,
                }
            })?;
        }

        match self.clients.entry(client.uid.clone()) {
            Entry::Occupied(_) => Err(ClientError::Duplicate(client.uid)),
            Entry::Vacant(slot) => {
                debug!(client_id = %client.uid, "Registered OAuth client");
                slot.insert(Arc::new(client));
                Ok(())
            }
        }
    }

    /// Number of registered clients
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether no clients are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ClientStore for InMemoryClientStore {
    fn find_by_uid(&self, uid: &str) -> Option<Arc<dyn Client>> {
        self.clients
            .get(uid)
            .map(|entry| Arc::clone(entry.value()) as Arc<dyn Client>)
    }
}
