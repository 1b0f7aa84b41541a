// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Message router for the relay session channel.
//!
//! Every inbound frame is classified and dispatched in arrival order:
//!
//! | type            | action                            | reply               |
//! |-----------------|-----------------------------------|---------------------|
//! | `file_delivery` | decode, hand to delivery handler  | `file_received_ack` |
//! | `heartbeat`     | none                              | `heartbeat_ack`     |
//! | anything else   | log                               | none                |
//!
//! A delivery is acknowledged exactly once per connection incarnation, even
//! when its payload fails to decode or no handler is registered; a repeated
//! `file_id` within the same incarnation is dropped without a second ack.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use portal_core::{ClientFrame, CodecError, Delivery, Inbound};

use super::session::SessionStore;

/// Receives decoded deliveries.
pub trait DeliveryHandler: Send {
    fn on_delivery(&mut self, filename: &str, content: &[u8]);
}

impl<F> DeliveryHandler for F
where
    F: FnMut(&str, &[u8]) + Send,
{
    fn on_delivery(&mut self, filename: &str, content: &[u8]) {
        self(filename, content)
    }
}

#[derive(Default)]
struct SlotState {
    handler: Option<Box<dyn DeliveryHandler>>,
    /// Bumped by every register or clear.
    generation: u64,
}

/// Slot holding the single registered delivery handler.
///
/// Cloning shares the slot, so a handler can be registered or replaced from
/// outside while the router is running, or from inside the handler itself.
#[derive(Clone, Default)]
pub struct HandlerSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl HandlerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`, returning the one it replaced.
    ///
    /// Called from inside a running handler, the running handler is the one
    /// replaced; it is dropped once it returns and `None` is returned here.
    pub fn register<H: DeliveryHandler + 'static>(
        &self,
        handler: H,
    ) -> Option<Box<dyn DeliveryHandler>> {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.handler.replace(Box::new(handler))
    }

    /// Remove the registered handler.
    pub fn clear(&self) -> Option<Box<dyn DeliveryHandler>> {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.handler.take()
    }

    /// Invoke the handler. Returns false if none is registered.
    ///
    /// The handler runs with the slot unlocked and is put back afterwards
    /// unless it was replaced or cleared in the meantime.
    fn dispatch(&self, filename: &str, content: &[u8]) -> bool {
        let (taken, generation) = {
            let mut slot = self.lock();
            (slot.handler.take(), slot.generation)
        };
        let Some(mut handler) = taken else {
            return false;
        };
        handler.on_delivery(filename, content);

        let mut slot = self.lock();
        if slot.generation == generation {
            slot.handler = Some(handler);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What the router did with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    /// Delivery decoded and handed to the handler.
    Delivered {
        file_id: String,
        filename: String,
        size: usize,
    },
    /// Delivery acknowledged but not handed to anyone.
    Discarded { file_id: String, reason: Discard },
    /// Delivery whose `file_id` was already acknowledged on this incarnation.
    Duplicate { file_id: String },
    Heartbeat,
    /// Well-formed frame of a type this client does not handle.
    Unrecognized(String),
    /// Frame that could not be parsed.
    Malformed(String),
    /// Frame from a channel whose session is no longer current.
    Stale { session_id: String },
}

/// Why a delivery was acknowledged without reaching the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discard {
    Codec(CodecError),
    NoHandler,
}

impl Routed {
    /// The frame to send back, if any.
    pub fn reply(&self) -> Option<ClientFrame> {
        match self {
            Routed::Delivered { file_id, .. } | Routed::Discarded { file_id, .. } => {
                Some(ClientFrame::ack(file_id.clone()))
            }
            Routed::Heartbeat => Some(ClientFrame::HeartbeatAck),
            _ => None,
        }
    }
}

/// Classifies inbound frames and dispatches them.
pub struct Router {
    store: Arc<SessionStore>,
    handlers: HandlerSlot,
    acked: HashSet<String>,
    /// Store incarnation `acked` belongs to.
    incarnation: u64,
}

impl Router {
    pub fn new(store: Arc<SessionStore>, handlers: HandlerSlot) -> Self {
        let incarnation = store.incarnation();
        Router {
            store,
            handlers,
            acked: HashSet::new(),
            incarnation,
        }
    }

    /// The handler slot this router dispatches to.
    pub fn handlers(&self) -> HandlerSlot {
        self.handlers.clone()
    }

    /// Route one frame received on the channel bound to `session_id`.
    pub fn route(&mut self, text: &str, session_id: &str) -> Routed {
        if !self.store.is_current(session_id) {
            tracing::debug!("dropping frame for orphaned session {}", session_id);
            return Routed::Stale {
                session_id: session_id.to_string(),
            };
        }

        let incarnation = self.store.incarnation();
        if incarnation != self.incarnation {
            self.acked.clear();
            self.incarnation = incarnation;
        }

        match Inbound::parse(text) {
            Ok(Inbound::Delivery(delivery)) => self.deliver(delivery),
            Ok(Inbound::Heartbeat) => {
                tracing::debug!("heartbeat");
                Routed::Heartbeat
            }
            Ok(Inbound::Unrecognized(kind)) => {
                tracing::warn!("ignoring unrecognized frame type '{}'", kind);
                Routed::Unrecognized(kind)
            }
            Err(e) => {
                tracing::warn!("ignoring malformed frame: {}", e);
                Routed::Malformed(e.to_string())
            }
        }
    }

    fn deliver(&mut self, delivery: Delivery) -> Routed {
        let Delivery {
            file_id, filename, ..
        } = &delivery;

        if self.acked.contains(file_id) {
            tracing::debug!("duplicate delivery {} ignored", file_id);
            return Routed::Duplicate {
                file_id: file_id.clone(),
            };
        }
        self.acked.insert(file_id.clone());

        let content = match delivery.decode_content() {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("discarding delivery {} ({}): {}", file_id, filename, e);
                return Routed::Discarded {
                    file_id: file_id.clone(),
                    reason: Discard::Codec(e),
                };
            }
        };

        if !self.handlers.dispatch(filename, &content) {
            tracing::warn!(
                "no delivery handler registered, dropping {} ({})",
                file_id,
                filename
            );
            return Routed::Discarded {
                file_id: file_id.clone(),
                reason: Discard::NoHandler,
            };
        }

        tracing::info!("received {} ({} bytes)", filename, content.len());
        Routed::Delivered {
            file_id: file_id.clone(),
            filename: filename.clone(),
            size: content.len(),
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
