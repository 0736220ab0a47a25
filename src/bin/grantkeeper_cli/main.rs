// ABOUTME: Grantkeeper CLI - evaluate authorization requests and issue tokens from the shell
// ABOUTME: Loads a client registry file and grant flow configuration from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grantkeeper Contributors
//!
//! Usage:
//! ```bash
//! # Evaluate an authorization request and print the status document
//! grantkeeper-cli --clients clients.json authorize --client-id app \
//!     --response-type code --redirect-uri https://app.com/callback --scope public
//!
//! # Approve it on behalf of a resource owner and print the redirect location
//! grantkeeper-cli --clients clients.json authorize --client-id app \
//!     --response-type code --redirect-uri https://app.com/callback --resource-owner user-1 --approve
//!
//! # Issue a client credentials token
//! grantkeeper-cli --clients clients.json token client-credentials --client-id app --scope public
//! ```

mod commands;
mod helpers;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grantkeeper::config::GrantFlowConfig;
use grantkeeper::logging::LoggingConfig;
use grantkeeper::oauth2_server::{AuthorizationParams, InMemoryClientStore};
use tracing::info;

/// Environment variable naming the client registry file
const ENV_CLIENTS_FILE: &str = "GRANTKEEPER_CLIENTS_FILE";

#[derive(Parser)]
#[command(
    name = "grantkeeper-cli",
    about = "Grantkeeper OAuth 2.0 decision engine CLI",
    long_about = "Evaluate authorization requests and issue tokens against a client registry file, using grant flow configuration from GRANTKEEPER_* environment variables."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Client registry file (JSON array of clients)
    #[arg(long, global = true)]
    clients: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Evaluate an authorization endpoint request
    Authorize {
        /// Client identifier
        #[arg(long)]
        client_id: String,

        /// Response type (`code` or `token`)
        #[arg(long, default_value = "code")]
        response_type: String,

        /// Redirect URI
        #[arg(long)]
        redirect_uri: Option<String>,

        /// Space-separated scopes
        #[arg(long)]
        scope: Option<String>,

        /// Opaque state echoed back to the client
        #[arg(long)]
        state: Option<String>,

        /// PKCE code challenge
        #[arg(long)]
        code_challenge: Option<String>,

        /// PKCE code challenge method (`plain` or `S256`)
        #[arg(long)]
        code_challenge_method: Option<String>,

        /// Authenticated resource owner identifier
        #[arg(long)]
        resource_owner: Option<String>,

        /// Approve the request and print the redirect location
        #[arg(long)]
        approve: bool,
    },

    /// Token endpoint grants
    Token {
        #[command(subcommand)]
        action: TokenCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum TokenCommand {
    /// Issue a token with the client credentials grant
    ClientCredentials {
        /// Client identifier
        #[arg(long)]
        client_id: String,

        /// Space-separated scopes
        #[arg(long)]
        scope: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let config = GrantFlowConfig::from_env().context("invalid grant flow configuration")?;

    let clients_path = cli
        .clients
        .or_else(|| env::var(ENV_CLIENTS_FILE).ok().map(PathBuf::from))
        .with_context(|| format!("no client registry given: pass --clients or set {ENV_CLIENTS_FILE}"))?;
    let store = InMemoryClientStore::from_json_file(&clients_path, config.force_ssl_in_redirect_uri)?;
    info!(path = %clients_path.display(), clients = store.len(), "Client registry loaded");

    match cli.command {
        Command::Authorize {
            client_id,
            response_type,
            redirect_uri,
            scope,
            state,
            code_challenge,
            code_challenge_method,
            resource_owner,
            approve,
        } => {
            let params = AuthorizationParams {
                client_id: Some(client_id),
                response_type: Some(response_type),
                redirect_uri,
                scope,
                state,
                code_challenge,
                code_challenge_method,
            };
            commands::authorize::run(&config, &store, params, resource_owner, approve)?;
        }
        Command::Token { action } => match action {
            TokenCommand::ClientCredentials { client_id, scope } => {
                commands::token::client_credentials(&config, &store, &client_id, scope)?;
            }
        },
    }

    Ok(())
}
