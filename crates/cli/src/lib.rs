// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! portal - a relay file-delivery client.
//!
//! This crate provides the controller behind the `portal` CLI: it holds a
//! session with a relay backend, receives files pushed over a WebSocket
//! channel, uploads local files, and keeps a view of an inventory backend.
//!
//! # Main Components
//!
//! - [`relay::SessionStore`] - the current relay session, shared via `Arc`
//! - [`relay::ConnectionManager`] - channel lifecycle with backoff reconnects
//! - [`relay::Router`] - per-frame dispatch, acknowledgments and heartbeats
//! - [`relay::UploadCoordinator`] - size-checked multipart uploads
//! - [`inventory::InventoryClient`] - tree snapshots, downloads and saves
//! - [`Config`] - endpoints, backoff and timeouts from TOML
//!
//! # Receiving files
//!
//! ```rust,ignore
//! use portal::{relay::Relay, Config};
//!
//! let mut relay = Relay::from_config(&Config::default());
//! relay.manager.register_handler(|name: &str, bytes: &[u8]| {
//!     println!("{} ({} bytes)", name, bytes.len());
//! });
//! relay.manager.run().await?;
//! ```

mod cli;
mod commands;
mod display;
mod logging;

pub mod config;
pub mod error;
pub mod inventory;
pub mod relay;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};

/// Run a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose, cli.log_file.as_deref())?;
    let config = Config::resolve(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&config, cli.command))
}

async fn dispatch(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Listen { out, materialize } => {
            commands::listen::run(config, &out, materialize).await
        }
        Command::Upload { paths } => commands::upload::run(config, &paths).await,
        Command::Tree { flat } => commands::tree::run(config, flat).await,
        Command::Watch => commands::watch::run(config).await,
        Command::Fetch { name, out } => commands::fetch::run(config, &name, out.as_deref()).await,
    }
}
