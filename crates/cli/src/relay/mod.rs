// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Relay client: session store, channel lifecycle, message routing and
//! uploads.
//!
//! All components share one [`SessionStore`] handed to them at construction,
//! so several relay clients can live in one process.

pub mod api;
mod lifecycle;
mod router;
mod session;
mod upload;

use std::sync::Arc;

use tokio::sync::mpsc;

pub use api::RelayApi;
pub use lifecycle::{
    Closer, ConnectionManager, ConnectionState, ControllerEvent, ReconnectPolicy,
};
pub use router::{DeliveryHandler, Discard, HandlerSlot, Routed, Router};
pub use session::SessionStore;
pub use upload::{check_size, UploadCoordinator, UploadResult, MAX_UPLOAD_BYTES};

use crate::config::Config;

/// A fully wired relay client.
pub struct Relay {
    pub store: Arc<SessionStore>,
    pub manager: ConnectionManager,
    pub events: mpsc::UnboundedReceiver<ControllerEvent>,
    pub uploads: UploadCoordinator,
}

impl Relay {
    /// Build every relay component from configuration.
    pub fn from_config(config: &Config) -> Self {
        let api = RelayApi::new(&config.relay.api_url, config.http.timeout());
        let store = Arc::new(SessionStore::new(api.clone()));
        let (manager, events) = ConnectionManager::new(
            &config.relay.ws_url,
            config.reconnect.policy(),
            Arc::clone(&store),
        );
        let uploads = UploadCoordinator::new(api, Arc::clone(&store));
        Relay {
            store,
            manager,
            events,
            uploads,
        }
    }
}
