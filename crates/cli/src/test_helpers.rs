// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a scripted mock transport and a local WebSocket
//! server for end-to-end tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use portal_core::ClientFrame;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::transport::{Transport, TransportError, TransportFuture};

/// One step of a scripted connection.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Deliver a text frame.
    Frame(String),
    /// Peer closes the channel.
    Close,
    /// Transport error while reading.
    Error,
}

struct MockConnection {
    refuse: bool,
    incoming: VecDeque<Scripted>,
}

#[derive(Default)]
struct MockState {
    connections: VecDeque<MockConnection>,
    urls: Vec<String>,
    outgoing: Vec<(usize, ClientFrame)>,
}

/// Shared script for every transport handed out by [`MockRelay::transport`].
///
/// Each `connect` consumes the next scripted connection; connects beyond the
/// script are refused. Once a connection's frames are exhausted, `recv` blocks
/// until the caller gives up, like an idle socket.
#[derive(Clone, Default)]
pub struct MockRelay {
    state: Arc<Mutex<MockState>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a connection that opens and yields the given steps.
    pub fn accept(&self, steps: Vec<Scripted>) {
        self.state.lock().unwrap().connections.push_back(MockConnection {
            refuse: false,
            incoming: steps.into(),
        });
    }

    /// Script a connection attempt that fails.
    pub fn refuse(&self) {
        self.state.lock().unwrap().connections.push_back(MockConnection {
            refuse: true,
            incoming: VecDeque::new(),
        });
    }

    /// Create a transport bound to this script.
    pub fn transport(&self) -> MockTransport {
        MockTransport {
            relay: self.clone(),
            current: None,
        }
    }

    /// URLs passed to every connect attempt, in order.
    pub fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().urls.clone()
    }

    /// Every frame sent, across all connections.
    pub fn outgoing(&self) -> Vec<ClientFrame> {
        let state = self.state.lock().unwrap();
        state.outgoing.iter().map(|(_, f)| f.clone()).collect()
    }

    /// Frames sent on the connection opened by the `n`th connect attempt.
    pub fn outgoing_on(&self, n: usize) -> Vec<ClientFrame> {
        let state = self.state.lock().unwrap();
        state
            .outgoing
            .iter()
            .filter(|(i, _)| *i == n)
            .map(|(_, f)| f.clone())
            .collect()
    }
}

/// Mock transport for testing without real sockets.
pub struct MockTransport {
    relay: MockRelay,
    current: Option<(usize, VecDeque<Scripted>)>,
}

impl Transport for MockTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let mut state = self.relay.state.lock().unwrap();
            state.urls.push(url);
            let index = state.urls.len() - 1;
            match state.connections.pop_front() {
                Some(conn) if !conn.refuse => {
                    self.current = Some((index, conn.incoming));
                    Ok(())
                }
                _ => Err(TransportError::ConnectionFailed("mock refused".into())),
            }
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.current = None;
            Ok(())
        })
    }

    fn send(&mut self, frame: ClientFrame) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let index = match &self.current {
                Some((index, _)) => *index,
                None => return Err(TransportError::ConnectionClosed),
            };
            self.relay
                .state
                .lock()
                .unwrap()
                .outgoing
                .push((index, frame));
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        Box::pin(async move {
            let next = match self.current.as_mut() {
                Some((_, incoming)) => incoming.pop_front(),
                None => return Err(TransportError::ConnectionClosed),
            };
            match next {
                Some(Scripted::Frame(text)) => Ok(Some(text)),
                Some(Scripted::Close) => {
                    self.current = None;
                    Ok(None)
                }
                Some(Scripted::Error) => {
                    self.current = None;
                    Err(TransportError::ReceiveFailed("mock reset".into()))
                }
                None => std::future::pending().await,
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.current.is_some()
    }
}

/// Relay `/connect` mock that hands out the given session ids in order.
///
/// Once the list is exhausted the last id keeps being returned.
pub async fn mount_sessions(server: &MockServer, ids: &[&str]) {
    for (i, id) in ids.iter().enumerate() {
        let mock = Mock::given(method("POST"))
            .and(path("/connect"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": id,
                "message": "connected",
                "next_step": "open the channel",
            })));
        let mock = if i + 1 < ids.len() {
            mock.up_to_n_times(1)
        } else {
            mock
        };
        server.register(mock).await;
    }
}

/// What a [`TestChannelServer`] does with each accepted connection.
#[derive(Debug, Clone, Default)]
pub struct ChannelScript {
    /// Frames sent right after the handshake.
    pub frames: Vec<String>,
    /// Close the connection once the frames are sent.
    pub close_after: bool,
}

/// A WebSocket server on a random local port that plays a script to every
/// client and records what clients send back.
pub struct TestChannelServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<String>>>,
    paths: Arc<Mutex<Vec<String>>>,
    shutdown_tx: oneshot::Sender<()>,
}

impl TestChannelServer {
    pub async fn start(script: ChannelScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let paths = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let accept_received = Arc::clone(&received);
        let accept_paths = Arc::clone(&paths);
        tokio::spawn(async move {
            tokio::select! {
                _ = accept_loop(listener, script, accept_received, accept_paths) => {}
                _ = shutdown_rx => {}
            }
        });

        TestChannelServer {
            addr,
            received,
            paths,
            shutdown_tx,
        }
    }

    /// Base URL for clients (`ws://127.0.0.1:port`).
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Text frames received from clients.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Request paths of accepted connections.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    /// Poll until at least `n` frames were received.
    pub async fn wait_for_received(&self, n: usize) -> Vec<String> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let received = self.received();
            if received.len() >= n || tokio::time::Instant::now() >= deadline {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn accept_loop(
    listener: TcpListener,
    script: ChannelScript,
    received: Arc<Mutex<Vec<String>>>,
    paths: Arc<Mutex<Vec<String>>>,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let script = script.clone();
        let received = Arc::clone(&received);
        let paths = Arc::clone(&paths);
        tokio::spawn(async move {
            let record_path = Arc::clone(&paths);
            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                record_path.lock().unwrap().push(req.uri().path().to_string());
                Ok(resp)
            };
            let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
                return;
            };
            let (mut sink, mut stream) = ws.split();
            for frame in script.frames {
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    return;
                }
            }
            if script.close_after {
                let _ = sink.close().await;
                return;
            }
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => {
                        received.lock().unwrap().push(text.as_str().to_string())
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });
    }
}
