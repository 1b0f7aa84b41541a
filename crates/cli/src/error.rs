// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use portal_core::CodecError;
use thiserror::Error;

/// All possible errors that can occur in the portal library.
///
/// Each message names the failing operation and, where a backend answered,
/// its status, so a single line is enough to report the failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("session: connect failed: {reason}")]
    Session { reason: String },

    #[error("channel: gave up after {attempts} attempt(s): {reason}")]
    Channel { attempts: u32, reason: String },

    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    #[error("upload: payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("upload: no active relay session\n  hint: connect to the relay before uploading")]
    NoSession,

    #[error("upload: relay returned {status}: {body}")]
    Upload { status: u16, body: String },

    #[error("upload: request failed: {0}")]
    UploadFailed(String),

    #[error("inventory: {op} failed: {reason}")]
    Inventory { op: &'static str, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn session(reason: impl std::fmt::Display) -> Self {
        Error::Session {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn inventory(op: &'static str, reason: impl std::fmt::Display) -> Self {
        Error::Inventory {
            op,
            reason: reason.to_string(),
        }
    }
}

/// A specialized Result type for portal operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
