// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Upload coordinator: sends local files to the relay under the current
//! session.
//!
//! Preconditions are checked before any network I/O. Each upload is its own
//! request/response exchange, correlated by the `file_id` the relay echoes
//! back, so concurrent uploads from one coordinator never interfere.

use std::path::Path;
use std::sync::Arc;

use super::api::RelayApi;
use super::session::SessionStore;
use crate::error::{Error, Result};

/// Largest payload the relay accepts (100 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_id: String,
    pub filename: String,
    pub size: u64,
}

/// Rejects payloads over [`MAX_UPLOAD_BYTES`].
pub fn check_size(size: u64) -> Result<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(Error::PayloadTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

pub struct UploadCoordinator {
    api: RelayApi,
    store: Arc<SessionStore>,
}

impl UploadCoordinator {
    pub fn new(api: RelayApi, store: Arc<SessionStore>) -> Self {
        UploadCoordinator { api, store }
    }

    /// Upload `bytes` as `filename`.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<UploadResult> {
        let session = self.store.current().ok_or(Error::NoSession)?;
        check_size(bytes.len() as u64)?;

        tracing::debug!(
            "uploading {} ({} bytes) on session {}",
            filename,
            bytes.len(),
            session.id()
        );
        let response = self.api.upload(session.id(), filename, bytes).await?;
        tracing::info!(
            "uploaded {} as {} ({} bytes)",
            response.filename,
            response.file_id,
            response.size
        );

        Ok(UploadResult {
            file_id: response.file_id,
            filename: response.filename,
            size: response.size,
        })
    }

    /// Upload the file at `path` under its own file name.
    ///
    /// The size is checked from metadata so oversized files are never read.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadResult> {
        if self.store.current().is_none() {
            return Err(Error::NoSession);
        }
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file: {}", path.display()),
                ))
            })?;

        let metadata = tokio::fs::metadata(path).await?;
        check_size(metadata.len())?;

        let bytes = tokio::fs::read(path).await?;
        self.upload(bytes, &filename).await
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
