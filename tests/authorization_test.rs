// ABOUTME: Tests for the consent step and authorization endpoint redirects
// ABOUTME: Code and implicit token issuance, denial, native clients and a full code exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::RecordingIssuer;
use grantkeeper::constants::oauth::NATIVE_REDIRECT_URI;
use grantkeeper::errors::OAuthErrorKind;
use grantkeeper::models::GrantFlow;
use grantkeeper::oauth2_server::{
    AuthorizationCodeGrant, AuthorizationParams, AuthorizationRequest, AuthorizationResponse,
    CodeChallengeMethod, ErrorResponse, InMemoryTokenIssuer, PreAuthorization, RegisteredClient,
    TokenIssuanceRequest,
};
use uuid::Uuid;

fn error_body(response: &AuthorizationResponse) -> &ErrorResponse {
    match response {
        AuthorizationResponse::Error { error, .. } => error,
        other => panic!("expected an error response, got {other:?}"),
    }
}

#[test]
fn test_code_redirect_carries_code_and_state() {
    let config = common::scoped_config();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::default();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert!(response.is_success());
    assert!(!response.is_native());
    assert_eq!(
        response.redirect_location().as_deref(),
        Some("https://app.com/callback?code=auth-code&state=xyz")
    );
    match response {
        AuthorizationResponse::Code { code, .. } => assert_eq!(code.expires_in, 600),
        other => panic!("expected a code, got {other:?}"),
    }
}

#[test]
fn test_implicit_token_in_fragment() {
    let config = common::scoped_config()
        .with_grant_flows([GrantFlow::AuthorizationCode, GrantFlow::Implicit])
        .with_refresh_token(true);
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::default();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("token", Some("public")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert_eq!(
        response.redirect_location().as_deref(),
        Some(
            "https://app.com/callback#access_token=access-token&token_type=Bearer\
             &expires_in=7200&scope=public&state=xyz"
        )
    );
    let call = issuer.last_call();
    assert_eq!(call.grant_flow, GrantFlow::Implicit);
    assert_eq!(call.resource_owner_id.as_deref(), Some("alice"));
    assert!(!call.use_refresh_token);
}

#[test]
fn test_missing_resource_owner_is_access_denied() {
    let config = common::scoped_config();
    let client = common::app_client();
    let issuer = RecordingIssuer::default();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    );

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert_eq!(error_body(&response).error, OAuthErrorKind::AccessDenied);
    assert!(response
        .redirect_location()
        .unwrap()
        .starts_with("https://app.com/callback?error=access_denied"));
    assert!(issuer.calls().is_empty());
}

#[test]
fn test_owner_checked_by_hook_is_the_owner_issued_for() {
    let config = common::scoped_config().with_resource_owner_authorizer(|owner, _client| {
        owner.is_some_and(|owner| owner.id() == "alice")
    });
    let client = common::app_client();
    let alice = "alice".to_owned();
    let mallory = "mallory".to_owned();
    let issuer = InMemoryTokenIssuer::new();

    let mut refused = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    )
    .with_resource_owner(&mallory);
    let response = AuthorizationRequest::new(&mut refused).authorize(&issuer);
    assert!(!response.is_success());

    let mut accepted = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    )
    .with_resource_owner(&alice);
    let code = match AuthorizationRequest::new(&mut accepted).authorize(&issuer) {
        AuthorizationResponse::Code { code, .. } => code,
        other => panic!("expected a code, got {other:?}"),
    };
    let stored = issuer.take_authorization_code(&code.code).unwrap();
    assert_eq!(stored.resource_owner_id, "alice");
}

#[test]
fn test_uuid_resource_owner() {
    let config = common::scoped_config()
        .with_grant_flows([GrantFlow::AuthorizationCode, GrantFlow::Implicit]);
    let client = common::app_client();
    let owner = Uuid::new_v4();
    let issuer = InMemoryTokenIssuer::new();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("token", Some("public")),
    )
    .with_resource_owner(&owner);

    let token = match AuthorizationRequest::new(&mut pre_auth).authorize(&issuer) {
        AuthorizationResponse::Token { token, .. } => token,
        other => panic!("expected a token, got {other:?}"),
    };

    let record = issuer.find_access_token(&token.token).unwrap();
    assert_eq!(record.resource_owner_id, Some(owner.to_string()));
    assert_eq!(record.grant_flow, GrantFlow::Implicit);
}

#[test]
fn test_deny_redirects_access_denied() {
    let config = common::scoped_config();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).deny();

    assert!(!response.is_success());
    assert_eq!(error_body(&response).error, OAuthErrorKind::AccessDenied);
    let location = response.redirect_location().unwrap();
    assert!(location.starts_with("https://app.com/callback?error=access_denied&error_description="));
    assert!(location.ends_with("&state=xyz"));
}

#[test]
fn test_deny_implicit_uses_fragment() {
    let config = common::scoped_config()
        .with_grant_flows([GrantFlow::AuthorizationCode, GrantFlow::Implicit]);
    let client = common::app_client();
    let alice = "alice".to_owned();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("token", Some("public")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).deny();

    let location = response.redirect_location().unwrap();
    assert!(location.starts_with("https://app.com/callback#error=access_denied"));
}

#[test]
fn test_rejected_request_redirects_redirectable_errors() {
    let config = common::scoped_config();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::default();
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("invalid")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert_eq!(error_body(&response).error, OAuthErrorKind::InvalidScope);
    let location = response.redirect_location().unwrap();
    assert!(location.starts_with("https://app.com/callback?error=invalid_scope"));
    assert!(issuer.calls().is_empty());
}

#[test]
fn test_unverified_redirect_is_never_followed() {
    let config = common::scoped_config();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::default();
    let params = AuthorizationParams {
        redirect_uri: Some("https://evil.example/cb".to_owned()),
        ..common::authorization_params("code", Some("public"))
    };
    let mut pre_auth = PreAuthorization::new(&config, Some(&client), params)
        .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert_eq!(
        error_body(&response).error,
        OAuthErrorKind::InvalidRedirectUri
    );
    assert!(response.is_native());
    assert_eq!(response.redirect_location(), None);
}

#[test]
fn test_native_client_gets_no_redirect() {
    let config = common::scoped_config();
    let client = RegisteredClient::new("cli", "CLI").with_redirect_uri(NATIVE_REDIRECT_URI);
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::default();
    let params = AuthorizationParams {
        client_id: Some("cli".to_owned()),
        redirect_uri: Some(NATIVE_REDIRECT_URI.to_owned()),
        ..common::authorization_params("code", Some("public"))
    };
    let mut pre_auth = PreAuthorization::new(&config, Some(&client), params)
        .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert!(response.is_success());
    assert!(response.is_native());
    assert_eq!(response.redirect_location(), None);
}

#[test]
fn test_issuer_failure_is_redirected() {
    let config = common::scoped_config();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = RecordingIssuer::failing(OAuthErrorKind::ServerError);
    let mut pre_auth = PreAuthorization::new(
        &config,
        Some(&client),
        common::authorization_params("code", Some("public")),
    )
    .with_resource_owner(&alice);

    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);

    assert_eq!(
        error_body(&response).error,
        OAuthErrorKind::ServerError
    );
    assert!(response
        .redirect_location()
        .unwrap()
        .contains("error=server_error"));
}

#[test]
fn test_code_flow_end_to_end_with_pkce() {
    let config = common::scoped_config()
        .with_grant_flows([GrantFlow::AuthorizationCode, GrantFlow::RefreshToken])
        .with_refresh_token(true);
    let client = common::app_client();
    let alice = "alice".to_owned();
    let issuer = InMemoryTokenIssuer::new();

    let params = AuthorizationParams {
        code_challenge: Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_owned()),
        code_challenge_method: Some("S256".to_owned()),
        ..common::authorization_params("code", Some("public profile"))
    };
    let mut pre_auth = PreAuthorization::new(&config, Some(&client), params)
        .with_resource_owner(&alice);
    let response = AuthorizationRequest::new(&mut pre_auth).authorize(&issuer);
    let code = match response {
        AuthorizationResponse::Code { code, .. } => code,
        other => panic!("expected a code, got {other:?}"),
    };

    let stored = issuer.take_authorization_code(&code.code).unwrap();
    assert_eq!(stored.resource_owner_id, "alice");
    assert_eq!(
        stored.code_challenge.as_ref().unwrap().method,
        CodeChallengeMethod::S256
    );
    assert!(issuer.take_authorization_code(&code.code).is_none());

    let grant = AuthorizationCodeGrant {
        client: Some(&client),
        code: Some(&stored),
        redirect_uri: Some(common::APP_CALLBACK.to_owned()),
        code_verifier: Some("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_owned()),
    };
    let mut exchange = TokenIssuanceRequest::new(&config, &issuer, grant);
    let body = exchange.authorize().token().cloned().unwrap();

    let record = issuer.find_access_token(&body.access_token).unwrap();
    assert_eq!(record.resource_owner_id.as_deref(), Some("alice"));
    assert_eq!(record.scopes.to_string(), "public profile");
    let refresh = issuer
        .find_refresh_token(body.refresh_token.as_deref().unwrap())
        .unwrap();
    assert_eq!(refresh.client_uid.as_deref(), Some("app.com"));
}
