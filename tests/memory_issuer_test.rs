// ABOUTME: Tests for the in-memory token issuer
// ABOUTME: Token reuse, refresh rotation, single-use codes and concurrent reuse
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::HashSet;
use std::thread;

use chrono::{Duration, Utc};
use grantkeeper::errors::OAuthErrorKind;
use grantkeeper::models::{GrantFlow, ScopeSet};
use grantkeeper::oauth2_server::{
    CodeParams, InMemoryTokenIssuer, IssueParams, RegisteredClient, ResourceOwner, TokenIssuer,
};

fn params<'a>(owner: Option<&'a dyn ResourceOwner>, reuse: bool) -> IssueParams<'a> {
    IssueParams {
        grant_flow: GrantFlow::Password,
        resource_owner: owner,
        expires_in: Some(Duration::hours(2)),
        use_refresh_token: false,
        reuse_access_token: reuse,
        previous_refresh_token: None,
    }
}

#[test]
fn test_mints_unique_tokens_without_reuse() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let scopes = ScopeSet::from_string("public");

    let first = issuer.create(&client, &scopes, &params(None, false)).unwrap();
    let second = issuer.create(&client, &scopes, &params(None, false)).unwrap();

    assert_ne!(first.token, second.token);
    assert_eq!(issuer.issued_count(), 2);
    // 32 random bytes, unpadded URL-safe base64
    assert_eq!(first.token.len(), 43);
    assert_eq!(first.token_type, "Bearer");
    assert_eq!(first.expires_in, Some(7200));
}

#[test]
fn test_reuses_unexpired_token_for_same_grant() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let bob = "bob".to_owned();

    let first = issuer
        .create(&client, &ScopeSet::from_string("public profile"), &params(Some(&alice), true))
        .unwrap();
    let reordered = issuer
        .create(&client, &ScopeSet::from_string("profile public"), &params(Some(&alice), true))
        .unwrap();
    let other_owner = issuer
        .create(&client, &ScopeSet::from_string("public profile"), &params(Some(&bob), true))
        .unwrap();

    assert_eq!(first.token, reordered.token);
    assert_ne!(first.token, other_owner.token);
    assert_eq!(issuer.issued_count(), 2);
}

#[test]
fn test_revoked_token_is_not_reused() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let scopes = ScopeSet::from_string("public");

    let first = issuer.create(&client, &scopes, &params(None, true)).unwrap();
    assert!(issuer.revoke_access_token(&first.token));
    let second = issuer.create(&client, &scopes, &params(None, true)).unwrap();

    assert_ne!(first.token, second.token);
    assert!(!issuer
        .find_access_token(&first.token)
        .unwrap()
        .is_usable(Utc::now()));
    assert!(!issuer.revoke_access_token("unknown"));
}

#[test]
fn test_refresh_rotation_revokes_previous() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let scopes = ScopeSet::from_string("public");

    let original = issuer
        .create(
            &client,
            &scopes,
            &IssueParams {
                use_refresh_token: true,
                ..params(Some(&alice), true)
            },
        )
        .unwrap();
    let old_refresh = original.refresh_token.clone().unwrap();

    let rotated = issuer
        .create(
            &client,
            &scopes,
            &IssueParams {
                grant_flow: GrantFlow::RefreshToken,
                use_refresh_token: true,
                previous_refresh_token: Some(&old_refresh),
                ..params(Some(&alice), true)
            },
        )
        .unwrap();

    assert_ne!(rotated.token, original.token);
    let new_refresh = rotated.refresh_token.unwrap();
    assert_ne!(new_refresh, old_refresh);
    assert!(issuer.find_refresh_token(&old_refresh).unwrap().revoked);
    assert!(!issuer
        .find_access_token(&original.token)
        .unwrap()
        .is_usable(Utc::now()));
    assert!(issuer
        .find_access_token(&rotated.token)
        .unwrap()
        .is_usable(Utc::now()));

    let stored = issuer.find_refresh_token(&new_refresh).unwrap();
    assert!(stored.is_usable(Utc::now()));
    assert_eq!(stored.resource_owner_id.as_deref(), Some("alice"));
    assert_eq!(stored.scopes, scopes);
}

#[test]
fn test_failed_rotation_keeps_previous_credentials() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let scopes = ScopeSet::from_string("public");

    let original = issuer
        .create(
            &client,
            &scopes,
            &IssueParams {
                use_refresh_token: true,
                ..params(Some(&alice), false)
            },
        )
        .unwrap();
    let old_refresh = original.refresh_token.clone().unwrap();

    let result = issuer.create(
        &client,
        &scopes,
        &IssueParams {
            grant_flow: GrantFlow::RefreshToken,
            expires_in: Some(Duration::MAX),
            use_refresh_token: true,
            previous_refresh_token: Some(&old_refresh),
            ..params(Some(&alice), false)
        },
    );

    assert_eq!(result.unwrap_err(), OAuthErrorKind::ServerError);
    assert!(issuer
        .find_refresh_token(&old_refresh)
        .unwrap()
        .is_usable(Utc::now()));
    assert!(issuer
        .find_access_token(&original.token)
        .unwrap()
        .is_usable(Utc::now()));
    assert_eq!(issuer.issued_count(), 1);
}

#[test]
fn test_out_of_range_lifetime_is_a_server_error() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let alice = "alice".to_owned();
    let scopes = ScopeSet::from_string("public");

    let token = issuer.create(
        &client,
        &scopes,
        &IssueParams {
            expires_in: Some(Duration::MAX),
            ..params(Some(&alice), true)
        },
    );
    let code = issuer.create_authorization_code(
        &client,
        &scopes,
        &CodeParams {
            resource_owner: &alice,
            redirect_uri: common::APP_CALLBACK,
            expires_in: Duration::MAX,
            code_challenge: None,
        },
    );

    assert_eq!(token.unwrap_err(), OAuthErrorKind::ServerError);
    assert_eq!(code.unwrap_err(), OAuthErrorKind::ServerError);
    assert_eq!(issuer.issued_count(), 0);
}

#[test]
fn test_non_expiring_token() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();

    let token = issuer
        .create(
            &client,
            &ScopeSet::new(),
            &IssueParams {
                expires_in: None,
                ..params(None, false)
            },
        )
        .unwrap();

    assert_eq!(token.expires_in, None);
    let record = issuer.find_access_token(&token.token).unwrap();
    assert_eq!(record.expires_at, None);
    assert!(record.scopes.is_empty());
}

#[test]
fn test_authorization_codes_are_single_use() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = common::app_client();
    let alice = "alice".to_owned();

    let code = issuer
        .create_authorization_code(
            &client,
            &ScopeSet::from_string("public"),
            &CodeParams {
                resource_owner: &alice,
                redirect_uri: common::APP_CALLBACK,
                expires_in: Duration::minutes(10),
                code_challenge: None,
            },
        )
        .unwrap();
    assert_eq!(code.expires_in, 600);

    let stored = issuer.take_authorization_code(&code.code).unwrap();
    assert_eq!(stored.client_uid, "app.com");
    assert_eq!(stored.redirect_uri, common::APP_CALLBACK);
    assert!(stored.is_usable(Utc::now()));
    assert!(issuer.take_authorization_code(&code.code).is_none());
}

#[test]
fn test_concurrent_reuse_yields_one_token() {
    common::init_test_logging();
    let issuer = InMemoryTokenIssuer::new();
    let client = RegisteredClient::new("backend", "Backend");
    let scopes = ScopeSet::from_string("public");

    let tokens: HashSet<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    issuer
                        .create(&client, &scopes, &params(None, true))
                        .unwrap()
                        .token
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(tokens.len(), 1);
    assert_eq!(issuer.issued_count(), 1);
}
