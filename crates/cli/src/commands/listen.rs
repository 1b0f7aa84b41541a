// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::{local_file_name, until_interrupted};
use crate::config::Config;
use crate::display::format_size;
use crate::error::Result;
use crate::inventory::InventoryClient;
use crate::relay::{ControllerEvent, Relay};

pub async fn run(config: &Config, out: &Path, materialize: bool) -> Result<()> {
    tokio::fs::create_dir_all(out).await?;

    let Relay {
        mut manager,
        mut events,
        ..
    } = Relay::from_config(config);
    let inventory = materialize.then(|| {
        InventoryClient::new(&config.inventory.api_url, config.http.timeout())
    });

    // The handler runs inside the router, so file I/O happens on a queue.
    let (tx, rx) = mpsc::unbounded_channel::<(String, Vec<u8>)>();
    manager.register_handler(move |name: &str, bytes: &[u8]| {
        let _ = tx.send((name.to_string(), bytes.to_vec()));
    });
    let handlers = manager.handlers();
    let closer = manager.closer();

    let session = async {
        let result = tokio::select! {
            result = manager.run() => result,
            _ = report(&mut events) => Ok(()),
        };
        // Dropping the handler ends the writer.
        handlers.clear();
        result
    };

    let (result, ()) = tokio::join!(
        until_interrupted(closer, session),
        write_deliveries(rx, out.to_path_buf(), inventory.map(Arc::new)),
    );
    result
}

async fn report(events: &mut mpsc::UnboundedReceiver<ControllerEvent>) {
    while let Some(event) = events.recv().await {
        if let ControllerEvent::SessionStarted(session) = event {
            println!("listening on session {}", session.id());
        }
    }
}

async fn write_deliveries(
    mut rx: mpsc::UnboundedReceiver<(String, Vec<u8>)>,
    out: PathBuf,
    inventory: Option<Arc<InventoryClient>>,
) {
    while let Some((name, bytes)) = rx.recv().await {
        match save_delivery(&out, &name, &bytes).await {
            Ok(path) => println!(
                "received {} ({}) -> {}",
                name,
                format_size(bytes.len() as u64),
                path.display()
            ),
            Err(e) => eprintln!("error: failed to write {}: {}", name, e),
        }

        if let Some(inventory) = &inventory {
            if let Err(e) = inventory.save_file(&name, &bytes).await {
                eprintln!("error: {}", e);
            }
        }
    }
}

/// Write a received file into `out`, returning the path written.
pub(crate) async fn save_delivery(out: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let file_name = local_file_name(name).unwrap_or_else(|| "unnamed".to_string());
    let path = out.join(file_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

#[cfg(test)]
#[path = "listen_tests.rs"]
mod tests;
