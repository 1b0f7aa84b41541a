// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport encoding for file payloads.
//!
//! File bytes travel inside JSON text frames as lowercase hexadecimal. The
//! alphabet is `[0-9a-f]`, so an encoded payload can never break framing.
//! Decoding accepts either case.

use thiserror::Error;

/// Errors produced when decoding a wire payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Payload length is not a multiple of two.
    #[error("odd length payload ({0} chars)")]
    OddLength(usize),

    /// Payload contains a character outside the hex alphabet.
    #[error("invalid character '{ch}' at index {index}")]
    InvalidCharacter { ch: char, index: usize },
}

/// Encodes raw bytes for the wire.
pub fn encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes a wire payload back into raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    hex::decode(text).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => {
            CodecError::InvalidCharacter { ch: c, index }
        }
        _ => CodecError::OddLength(text.len()),
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
