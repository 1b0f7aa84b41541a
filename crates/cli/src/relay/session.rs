// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session store: the single source of truth for "am I connected, and as whom".
//!
//! The store is owned explicitly and shared via `Arc` with the components
//! that need it (lifecycle manager, router, upload coordinator). Each
//! installed session starts a new connection incarnation.

use std::sync::Mutex;

use portal_core::Session;

use super::api::RelayApi;
use crate::error::Result;

#[derive(Debug, Default)]
struct SessionSlot {
    session: Option<Session>,
    incarnation: u64,
}

/// Holds the current relay session.
#[derive(Debug)]
pub struct SessionStore {
    api: RelayApi,
    slot: Mutex<SessionSlot>,
}

impl SessionStore {
    pub fn new(api: RelayApi) -> Self {
        SessionStore {
            api,
            slot: Mutex::new(SessionSlot::default()),
        }
    }

    /// Request a session from the relay and make it current.
    ///
    /// Any previous session is replaced; frames still in flight for it are
    /// dropped by the router.
    pub async fn begin_session(&self) -> Result<Session> {
        let session = self.request_session().await?;
        self.install(session.clone());
        Ok(session)
    }

    /// Request a session from the relay without installing it.
    pub async fn request_session(&self) -> Result<Session> {
        let response = self.api.connect().await?;
        tracing::debug!(
            "relay issued session {} ({})",
            response.session_id,
            response.message
        );
        Ok(response.session())
    }

    /// Make `session` current, orphaning whatever was there before.
    pub fn install(&self, session: Session) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.session.replace(session) {
            tracing::debug!("session {} orphaned", old.session_id);
        }
        slot.incarnation = slot.incarnation.saturating_add(1);
    }

    /// The current session, if any.
    pub fn current(&self) -> Option<Session> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.session.clone()
    }

    /// Whether `session_id` names the current session.
    pub fn is_current(&self, session_id: &str) -> bool {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.session
            .as_ref()
            .is_some_and(|s| s.session_id == session_id)
    }

    /// Number of sessions installed so far.
    pub fn incarnation(&self) -> u64 {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.incarnation
    }

    /// Forget the current session.
    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.session = None;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
