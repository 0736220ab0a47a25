// ABOUTME: Command modules for grantkeeper-cli
// ABOUTME: Authorization endpoint evaluation and token endpoint grants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

pub mod authorize;
pub mod token;
