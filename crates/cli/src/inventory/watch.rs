// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push channel watcher for the inventory backend.
//!
//! The backend sends one bare file name per text frame on `{ws_url}/ws`
//! whenever a file is added. Each (re)connect refetches the tree so names
//! announced while disconnected are not missed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::client::InventoryClient;
use crate::error::{Error, Result};
use crate::relay::{Closer, ReconnectPolicy};
use crate::transport::{Transport, WebSocketTransport};

/// Notifications from the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Push channel is open and the tree was refetched.
    Connected { known: usize },
    /// A name not seen before was announced.
    NewFile(String),
    /// Push channel dropped; a reconnect is scheduled.
    Disconnected(String),
}

/// Keeps the inventory push channel open and feeds the known-files list.
pub struct InventoryWatcher<T: Transport = WebSocketTransport> {
    client: Arc<InventoryClient>,
    url: String,
    policy: ReconnectPolicy,
    transport: T,
    events: mpsc::UnboundedSender<WatchEvent>,
    cancel: CancellationToken,
}

impl InventoryWatcher<WebSocketTransport> {
    pub fn new(
        client: Arc<InventoryClient>,
        ws_url: &str,
        policy: ReconnectPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        Self::with_transport(WebSocketTransport::new(), client, ws_url, policy)
    }
}

impl<T: Transport> InventoryWatcher<T> {
    pub fn with_transport(
        transport: T,
        client: Arc<InventoryClient>,
        ws_url: &str,
        policy: ReconnectPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let watcher = InventoryWatcher {
            client,
            url: format!("{}/ws", ws_url.trim_end_matches('/')),
            policy,
            transport,
            events,
            cancel: CancellationToken::new(),
        };
        (watcher, events_rx)
    }

    pub fn closer(&self) -> Closer {
        Closer::new(self.cancel.clone())
    }

    /// Watch until closed or the reconnect budget runs out.
    pub async fn run(&mut self) -> Result<()> {
        let cancel = self.cancel.clone();
        let mut failures = 0u32;
        let mut retry = 0u32;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let opened = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.transport.connect(&self.url) => result,
            };

            let reason = match opened {
                Ok(()) => {
                    let opened_at = Instant::now();
                    self.on_connected().await;
                    let reason = match self.pump(&cancel).await {
                        Some(reason) => reason,
                        None => break,
                    };
                    if self.policy.settled(opened_at.elapsed()) {
                        failures = 0;
                        retry = 0;
                    } else {
                        failures = failures.saturating_add(1);
                        if self.policy.exhausted(failures) {
                            return Err(self.give_up(failures, reason));
                        }
                    }
                    reason
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    if self.policy.exhausted(failures) {
                        return Err(self.give_up(failures, e));
                    }
                    e.to_string()
                }
            };

            let _ = self.events.send(WatchEvent::Disconnected(reason.clone()));
            retry = retry.saturating_add(1);
            let delay = self.policy.delay_for(retry);
            tracing::info!("inventory push channel down ({}), retrying in {:?}", reason, delay);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if self.transport.is_connected() {
            let _ = self.transport.disconnect().await;
        }
        Ok(())
    }

    fn give_up(&self, failures: u32, reason: impl std::fmt::Display) -> Error {
        tracing::error!(
            "giving up on inventory push channel after {} attempt(s): {}",
            failures,
            reason
        );
        Error::inventory(
            "watch",
            format!("gave up after {} attempt(s): {}", failures, reason),
        )
    }

    async fn on_connected(&self) {
        tracing::info!("inventory push channel open at {}", self.url);
        if let Err(e) = self.client.fetch_tree().await {
            tracing::warn!("tree refresh failed: {}", e);
        }
        let known = self.client.known_files().len();
        let _ = self.events.send(WatchEvent::Connected { known });
    }

    /// Returns the drop reason, or `None` when closed.
    async fn pump(&mut self, cancel: &CancellationToken) -> Option<String> {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => return None,
                result = self.transport.recv() => result,
            };
            let text = match received {
                Ok(Some(text)) => text,
                Ok(None) => return Some("channel closed by backend".to_string()),
                Err(e) => return Some(e.to_string()),
            };

            let name = text.trim();
            if name.is_empty() {
                continue;
            }
            if self.client.record_new_file(name) {
                tracing::info!("new file: {}", name);
                let _ = self.events.send(WatchEvent::NewFile(name.to_string()));
            } else {
                tracing::debug!("already known: {}", name);
            }
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
