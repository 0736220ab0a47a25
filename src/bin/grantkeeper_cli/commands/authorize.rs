// ABOUTME: Authorization endpoint command for grantkeeper-cli
// ABOUTME: Prints the pre-authorization status document, or the redirect location on approval
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use anyhow::{bail, Result};
use grantkeeper::config::GrantFlowConfig;
use grantkeeper::oauth2_server::{
    AuthorizationParams, AuthorizationRequest, ClientStore, EnglishMessages, InMemoryClientStore,
    InMemoryTokenIssuer, PreAuthorization,
};
use serde_json::{json, Map};
use tracing::info;

use crate::helpers::display::print_json;

/// Evaluate an authorization request and optionally approve it
pub fn run(
    config: &GrantFlowConfig,
    store: &InMemoryClientStore,
    params: AuthorizationParams,
    resource_owner: Option<String>,
    approve: bool,
) -> Result<()> {
    let client = params
        .client_id
        .as_deref()
        .and_then(|uid| store.find_by_uid(uid));

    let mut pre_auth = PreAuthorization::new(config, client.as_deref(), params);
    if let Some(owner) = &resource_owner {
        pre_auth = pre_auth.with_resource_owner(owner);
    }

    if !pre_auth.authorizable() {
        if let Some(error) = pre_auth.error_response() {
            print_json(&error)?;
        }
        return Ok(());
    }

    if !approve {
        print_json(&pre_auth.as_json(&EnglishMessages, Map::new()))?;
        return Ok(());
    }

    if resource_owner.is_none() {
        bail!("--resource-owner is required with --approve");
    }
    let issuer = InMemoryTokenIssuer::new();
    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);
    info!(success = response.is_success(), "Authorization request processed");

    print_json(&json!({
        "success": response.is_success(),
        "redirect_location": response.redirect_location(),
        "native": response.is_native(),
    }))
}
