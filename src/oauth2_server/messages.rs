// ABOUTME: Localization seam for human-readable status and error strings
// ABOUTME: Ships an English catalog; embedders plug in their own translations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

use crate::errors::OAuthErrorKind;

/// Source of user-facing strings
pub trait Messages: Send + Sync {
    /// Status line included in the pre-authorization document
    fn pre_authorization_status(&self) -> String;

    /// Description for an error kind
    fn error_description(&self, kind: OAuthErrorKind) -> String {
        kind.default_description().to_owned()
    }
}

/// Built-in English messages
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl Messages for EnglishMessages {
    fn pre_authorization_status(&self) -> String {
        "Pre-authorization".to_owned()
    }
}
