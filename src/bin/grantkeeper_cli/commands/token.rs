// ABOUTME: Token endpoint commands for grantkeeper-cli
// ABOUTME: Runs grants against an in-memory issuer and prints the RFC 6749 response body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use anyhow::Result;
use grantkeeper::config::GrantFlowConfig;
use grantkeeper::oauth2_server::{
    ClientCredentialsGrant, ClientStore, InMemoryClientStore, InMemoryTokenIssuer,
    TokenIssuanceRequest,
};
use tracing::info;

use crate::helpers::display::print_json;

/// Issue a token with the client credentials grant
pub fn client_credentials(
    config: &GrantFlowConfig,
    store: &InMemoryClientStore,
    client_id: &str,
    scope: Option<String>,
) -> Result<()> {
    let client = store.find_by_uid(client_id);
    let issuer = InMemoryTokenIssuer::new();
    let grant = ClientCredentialsGrant {
        client: client.as_deref(),
        scope,
    };

    let mut request = TokenIssuanceRequest::new(config, &issuer, grant);
    let response = request.authorize();
    info!(status = response.status_code(), "Client credentials request processed");

    print_json(response)
}
