// ABOUTME: Configuration error types raised while loading engine settings
// ABOUTME: Covers unknown grant flows, malformed numbers, and malformed scope mappings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors

/// Errors raised while building configuration from the environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A grant flow name is not one of the supported flows
    #[error("Unknown grant flow '{value}' in {key}")]
    UnknownGrantFlow {
        /// Environment variable that carried the value
        key: &'static str,
        /// Offending flow name
        value: String,
    },

    /// A numeric setting could not be parsed
    #[error("Invalid number '{value}' in {key}")]
    InvalidNumber {
        /// Environment variable that carried the value
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// A boolean setting could not be parsed
    #[error("Invalid boolean '{value}' in {key}")]
    InvalidBool {
        /// Environment variable that carried the value
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// A `flow=scopes` mapping entry is malformed
    #[error("Malformed entry '{entry}' in {key}: expected flow=scope [scope ...]")]
    MalformedMapping {
        /// Environment variable that carried the value
        key: &'static str,
        /// Offending entry
        entry: String,
    },
}
