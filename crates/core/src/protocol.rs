// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Relay protocol: channel frames and HTTP payloads.
//!
//! The relay pushes tagged JSON frames over the session channel:
//! - `file_delivery` carries a hex-encoded file and must be acknowledged
//! - `heartbeat` must be answered with `heartbeat_ack`
//!
//! Anything else is surfaced as [`Inbound::Unrecognized`] so the router can
//! log it without tearing the channel down.

use serde::{Deserialize, Serialize};

use crate::codec::{self, CodecError};
use crate::error::{Error, Result};

/// A relay session, identified by the id the backend handed out on connect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Session {
            session_id: session_id.into(),
        }
    }

    /// The session id.
    pub fn id(&self) -> &str {
        &self.session_id
    }
}

/// Body of a successful `POST /connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub next_step: String,
}

impl ConnectResponse {
    /// The session described by this response.
    pub fn session(&self) -> Session {
        Session::new(self.session_id.clone())
    }
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub message: String,
}

/// A file pushed to this client by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub file_id: String,
    pub filename: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub uploaded_at: String,
    /// Hex-encoded file bytes.
    pub file_content: String,
}

impl Delivery {
    /// Decodes the wire payload into the file's bytes.
    pub fn decode_content(&self) -> std::result::Result<Vec<u8>, CodecError> {
        codec::decode(&self.file_content)
    }
}

/// Frames sent from the relay to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    FileDelivery(Delivery),
    Heartbeat,
}

impl ServerFrame {
    /// Creates a delivery frame for the given raw bytes.
    pub fn delivery(file_id: &str, filename: &str, content: &[u8]) -> Self {
        ServerFrame::FileDelivery(Delivery {
            file_id: file_id.to_string(),
            filename: filename.to_string(),
            file_size: content.len() as u64,
            content_type: "application/octet-stream".to_string(),
            uploaded_at: String::new(),
            file_content: codec::encode(content),
        })
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frames sent from the client to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Confirms a delivery was observed.
    FileReceivedAck { file_id: String },
    /// Answers a heartbeat.
    HeartbeatAck,
}

impl ClientFrame {
    /// Creates an acknowledgment for a delivery.
    pub fn ack(file_id: impl Into<String>) -> Self {
        ClientFrame::FileReceivedAck {
            file_id: file_id.into(),
        }
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the frame from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Delivery(Delivery),
    Heartbeat,
    /// A well-formed frame whose `type` this client does not handle.
    Unrecognized(String),
}

impl Inbound {
    /// Classifies a raw text frame by its `type` tag.
    ///
    /// Fails with [`Error::MalformedFrame`] when the text is not a JSON object
    /// with a string `type`, or when a known type is missing its fields.
    pub fn parse(text: &str) -> Result<Inbound> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| Error::MalformedFrame(format!("not json: {}", e)))?;

        let tag = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| Error::MalformedFrame("missing type tag".to_string()))?;

        match tag {
            "file_delivery" => {
                let delivery: Delivery = serde_json::from_value(value.clone())
                    .map_err(|e| Error::MalformedFrame(format!("file_delivery: {}", e)))?;
                Ok(Inbound::Delivery(delivery))
            }
            "heartbeat" => Ok(Inbound::Heartbeat),
            other => Ok(Inbound::Unrecognized(other.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
