// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::until_interrupted;
use crate::config::Config;
use crate::error::Result;
use crate::inventory::{InventoryClient, InventoryWatcher, WatchEvent};

pub async fn run(config: &Config) -> Result<()> {
    let client = Arc::new(InventoryClient::new(
        &config.inventory.api_url,
        config.http.timeout(),
    ));
    let (mut watcher, mut events) =
        InventoryWatcher::new(client, &config.inventory.ws_url, config.reconnect.policy());
    let closer = watcher.closer();

    let watching = async {
        tokio::select! {
            result = watcher.run() => result,
            _ = async {
                while let Some(event) = events.recv().await {
                    if let WatchEvent::NewFile(name) = event {
                        println!("{}", name);
                    }
                }
            } => Ok(()),
        }
    };
    until_interrupted(closer, watching).await
}
