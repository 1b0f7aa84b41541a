// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle for the relay session channel.
//!
//! The manager owns the channel and drives it through
//! `Disconnected -> Connecting -> Connected -> Reconnecting -> Closed`.
//! Every (re)connect requests a fresh session, binds a new channel to it and
//! starts a new session incarnation. Drops are retried with exponential
//! backoff; only exhaustion is surfaced, once, as [`Error::Channel`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use portal_core::Session;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::router::{DeliveryHandler, HandlerSlot, Routed, Router};
use super::session::SessionStore;
use crate::error::{Error, Result};
use crate::transport::{Transport, WebSocketTransport};

/// Channel state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Waiting out the backoff before reconnect attempt `attempt`.
    Reconnecting { attempt: u32 },
    /// Terminal: closed explicitly or retries exhausted.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Reconnecting { attempt } => {
                write!(f, "reconnecting (attempt {})", attempt)
            }
            ConnectionState::Closed => write!(f, "closed"),
        }
    }
}

/// Exponential backoff for reconnects.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts before giving up (0 = unlimited).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
    /// Uptime after which a connection counts as successful and resets the
    /// attempt budget. Shorter-lived connections count as failed attempts.
    pub stable_after: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            stable_after: Duration::from_secs(10),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry `attempt` (1-based): `initial * multiplier^(attempt - 1)`,
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        match Duration::try_from_secs_f64(secs) {
            Ok(delay) => delay.min(self.max_delay),
            Err(_) => self.max_delay,
        }
    }

    /// Whether `failures` consecutive failed attempts use up the budget.
    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts > 0 && failures >= self.max_attempts
    }

    /// Whether a connection that stayed up for `uptime` was stable.
    pub fn settled(&self, uptime: Duration) -> bool {
        uptime >= self.stable_after
    }
}

/// Notifications emitted while the manager runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    StateChanged(ConnectionState),
    /// A new session was installed and its channel is being opened.
    SessionStarted(Session),
    /// A delivery reached the registered handler.
    Delivered {
        file_id: String,
        filename: String,
        size: usize,
    },
    /// Retries were exhausted; the manager is closed.
    Failed { attempts: u32, reason: String },
}

/// Handle for closing a running manager from elsewhere.
#[derive(Debug, Clone)]
pub struct Closer {
    token: CancellationToken,
}

impl Closer {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Closer { token }
    }

    /// Stop reconnecting and close the channel. Takes effect immediately;
    /// the run loop then returns `Ok(())`.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

enum Established {
    Open(Session),
    Failed(String),
    Cancelled,
}

enum Pumped {
    Dropped(String),
    Cancelled,
}

/// Drives the relay channel for one client.
pub struct ConnectionManager<T: Transport = WebSocketTransport> {
    ws_url: String,
    policy: ReconnectPolicy,
    store: Arc<SessionStore>,
    router: Router,
    transport: T,
    state: watch::Sender<ConnectionState>,
    events: mpsc::UnboundedSender<ControllerEvent>,
    cancel: CancellationToken,
}

impl ConnectionManager<WebSocketTransport> {
    /// Create a manager for the relay channel at `ws_url`.
    ///
    /// Returns the manager and the receiving end of its event stream.
    pub fn new(
        ws_url: &str,
        policy: ReconnectPolicy,
        store: Arc<SessionStore>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        Self::with_transport(WebSocketTransport::new(), ws_url, policy, store)
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager over an explicit transport.
    pub fn with_transport(
        transport: T,
        ws_url: &str,
        policy: ReconnectPolicy,
        store: Arc<SessionStore>,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let router = Router::new(Arc::clone(&store), HandlerSlot::new());

        let manager = ConnectionManager {
            ws_url: ws_url.trim_end_matches('/').to_string(),
            policy,
            store,
            router,
            transport,
            state,
            events,
            cancel: CancellationToken::new(),
        };
        (manager, events_rx)
    }

    /// Shared slot for the delivery handler.
    pub fn handlers(&self) -> HandlerSlot {
        self.router.handlers()
    }

    /// Register the delivery handler, returning the one it replaced.
    pub fn register_handler<H: DeliveryHandler + 'static>(
        &self,
        handler: H,
    ) -> Option<Box<dyn DeliveryHandler>> {
        self.router.handlers().register(handler)
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn closer(&self) -> Closer {
        Closer::new(self.cancel.clone())
    }

    /// Close the manager. See [`Closer::close`].
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Connect and keep the channel up until closed or retries run out.
    ///
    /// Returns `Ok(())` after an explicit close and [`Error::Channel`] when
    /// the reconnect budget is exhausted.
    pub async fn run(&mut self) -> Result<()> {
        let cancel = self.cancel.clone();
        let mut failures = 0u32;
        let mut retry = 0u32;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.set_state(ConnectionState::Connecting);

            let reason = match self.establish(&cancel).await {
                Established::Cancelled => break,
                Established::Failed(reason) => {
                    failures = failures.saturating_add(1);
                    tracing::warn!("connect attempt {} failed: {}", failures, reason);
                    if self.policy.exhausted(failures) {
                        return Err(self.give_up(failures, reason).await);
                    }
                    reason
                }
                Established::Open(session) => {
                    let opened_at = Instant::now();
                    self.set_state(ConnectionState::Connected);
                    tracing::info!("channel open for session {}", session.id());
                    let reason = match self.pump(&session, &cancel).await {
                        Pumped::Cancelled => break,
                        Pumped::Dropped(reason) => reason,
                    };
                    self.store.clear();
                    if self.policy.settled(opened_at.elapsed()) {
                        failures = 0;
                        retry = 0;
                    } else {
                        failures = failures.saturating_add(1);
                        tracing::warn!("channel dropped after attempt {}: {}", failures, reason);
                        if self.policy.exhausted(failures) {
                            return Err(self.give_up(failures, reason).await);
                        }
                    }
                    reason
                }
            };

            retry = retry.saturating_add(1);
            let delay = self.policy.delay_for(retry);
            tracing::info!("reconnecting in {:?} ({})", delay, reason);
            self.set_state(ConnectionState::Reconnecting { attempt: retry });

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Obtain a fresh session and open a channel bound to it.
    async fn establish(&mut self, cancel: &CancellationToken) -> Established {
        let requested = tokio::select! {
            _ = cancel.cancelled() => return Established::Cancelled,
            result = self.store.request_session() => result,
        };
        let session = match requested {
            Ok(session) => session,
            Err(e) => return Established::Failed(e.to_string()),
        };

        self.store.install(session.clone());
        self.emit(ControllerEvent::SessionStarted(session.clone()));

        if self.transport.is_connected() {
            let _ = self.transport.disconnect().await;
        }

        let url = format!("{}/ws/{}", self.ws_url, session.id());
        tracing::debug!("opening channel {}", url);
        let opened = tokio::select! {
            _ = cancel.cancelled() => return Established::Cancelled,
            result = self.transport.connect(&url) => result,
        };
        match opened {
            Ok(()) => Established::Open(session),
            Err(e) => {
                self.store.clear();
                Established::Failed(e.to_string())
            }
        }
    }

    /// Route frames until the channel drops or the manager is closed.
    async fn pump(&mut self, session: &Session, cancel: &CancellationToken) -> Pumped {
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => return Pumped::Cancelled,
                result = self.transport.recv() => result,
            };

            let text = match received {
                Ok(Some(text)) => text,
                Ok(None) => return Pumped::Dropped("channel closed by relay".to_string()),
                Err(e) => return Pumped::Dropped(e.to_string()),
            };

            tracing::debug!("frame: {}", text);
            let routed = self.router.route(&text, session.id());
            if let Some(reply) = routed.reply() {
                if let Err(e) = self.transport.send(reply).await {
                    return Pumped::Dropped(e.to_string());
                }
            }
            if let Routed::Delivered {
                file_id,
                filename,
                size,
            } = routed
            {
                self.emit(ControllerEvent::Delivered {
                    file_id,
                    filename,
                    size,
                });
            }
        }
    }

    async fn give_up(&mut self, attempts: u32, reason: String) -> Error {
        tracing::error!(
            "giving up on relay channel after {} attempt(s): {}",
            attempts,
            reason
        );
        self.emit(ControllerEvent::Failed {
            attempts,
            reason: reason.clone(),
        });
        self.shutdown().await;
        Error::Channel { attempts, reason }
    }

    async fn shutdown(&mut self) {
        if self.transport.is_connected() {
            let _ = self.transport.disconnect().await;
        }
        self.store.clear();
        self.set_state(ConnectionState::Closed);
    }

    fn set_state(&self, next: ConnectionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!("state {} -> {}", previous, next);
            self.emit(ControllerEvent::StateChanged(next));
        }
    }

    fn emit(&self, event: ControllerEvent) {
        // Receiver may have been dropped.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
