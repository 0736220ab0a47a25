// ABOUTME: Tests for grant flow enablement and per-client flow gating
// ABOUTME: Validates response type mapping, server-wide switches and client hooks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use grantkeeper::config::GrantFlowConfig;
use grantkeeper::errors::OAuthErrorKind;
use grantkeeper::models::{GrantFlow, ResponseType};
use grantkeeper::oauth2_server::{Client, GrantFlowPolicy, RegisteredClient};

#[test]
fn test_grant_flow_names() {
    for flow in GrantFlow::ALL {
        assert_eq!(flow.as_str().parse::<GrantFlow>().unwrap(), flow);
    }
    assert!("device_code".parse::<GrantFlow>().is_err());
    assert_eq!(
        GrantFlow::from_grant_type("client_credentials"),
        Some(GrantFlow::ClientCredentials)
    );
    assert_eq!(GrantFlow::from_grant_type("implicit"), None);
}

#[test]
fn test_response_type_maps_to_flow() {
    assert_eq!(
        GrantFlowPolicy::flow_for_response_type("code"),
        Some(GrantFlow::AuthorizationCode)
    );
    assert_eq!(
        GrantFlowPolicy::flow_for_response_type("token"),
        Some(GrantFlow::Implicit)
    );
    assert_eq!(GrantFlowPolicy::flow_for_response_type("id_token"), None);
    assert_eq!(ResponseType::Token.grant_flow(), GrantFlow::Implicit);
}

#[test]
fn test_enablement_follows_configuration() {
    common::init_test_logging();
    let config = GrantFlowConfig::default().with_grant_flows([GrantFlow::AuthorizationCode]);
    let policy = GrantFlowPolicy::new(&config);

    assert!(policy.is_response_type_enabled("code"));
    assert!(!policy.is_response_type_enabled("token"));
    assert!(!policy.is_response_type_enabled("unknown"));
    assert!(policy.is_grant_type_enabled("authorization_code"));
    assert!(!policy.is_grant_type_enabled("client_credentials"));
    assert!(!policy.is_grant_type_enabled("implicit"));
}

#[test]
fn test_check_response_type_errors() {
    common::init_test_logging();
    let config = GrantFlowConfig::default().with_grant_flows([GrantFlow::AuthorizationCode]);
    let policy = GrantFlowPolicy::new(&config);
    let client = common::app_client();

    assert_eq!(
        policy.check_response_type(Some("code"), &client).unwrap(),
        ResponseType::Code
    );
    assert_eq!(
        policy.check_response_type(None, &client).unwrap_err().kind,
        OAuthErrorKind::InvalidRequest
    );
    assert_eq!(
        policy.check_response_type(Some("token"), &client).unwrap_err().kind,
        OAuthErrorKind::UnsupportedResponseType
    );
    assert_eq!(
        policy.check_response_type(Some("bogus"), &client).unwrap_err().kind,
        OAuthErrorKind::UnsupportedResponseType
    );
}

#[test]
fn test_client_allow_list_gates_flows() {
    common::init_test_logging();
    let config = GrantFlowConfig::default();
    let policy = GrantFlowPolicy::new(&config);
    let client = common::app_client().with_grant_flows([GrantFlow::ClientCredentials]);

    assert!(policy.check_grant_flow(GrantFlow::ClientCredentials, &client).is_ok());
    assert_eq!(
        policy.check_response_type(Some("code"), &client).unwrap_err().kind,
        OAuthErrorKind::UnauthorizedClient
    );
}

#[test]
fn test_grant_flow_hook_gates_flows() {
    common::init_test_logging();
    let config = GrantFlowConfig::default()
        .with_grant_flow_authorizer(|flow, client: &dyn Client| {
            flow != GrantFlow::ClientCredentials || client.is_confidential()
        });
    let policy = GrantFlowPolicy::new(&config);
    let confidential = RegisteredClient::new("backend", "Backend");
    let public = RegisteredClient::new("spa", "SPA").public();

    assert!(policy.allows_for_client(GrantFlow::ClientCredentials, &confidential));
    assert!(!policy.allows_for_client(GrantFlow::ClientCredentials, &public));
    assert_eq!(
        policy
            .check_grant_flow(GrantFlow::ClientCredentials, &public)
            .unwrap_err()
            .kind,
        OAuthErrorKind::UnauthorizedClient
    );
    assert!(policy.check_grant_flow(GrantFlow::AuthorizationCode, &public).is_ok());
}

#[test]
fn test_disabled_flow_is_unsupported_even_when_client_allows_it() {
    common::init_test_logging();
    let config = GrantFlowConfig::default().with_grant_flows([GrantFlow::AuthorizationCode]);
    let policy = GrantFlowPolicy::new(&config);
    let client = common::app_client();

    assert_eq!(
        policy
            .check_grant_flow(GrantFlow::Password, &client)
            .unwrap_err()
            .kind,
        OAuthErrorKind::UnsupportedGrantType
    );
}
