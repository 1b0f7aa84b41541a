// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the inventory backend.
//!
//! The client caches the last successfully fetched tree together with the
//! list of known file names. A failed fetch leaves the cache untouched.

use std::sync::Mutex;
use std::time::Duration;

use portal_core::codec;
use portal_core::inventory::{KnownFiles, SaveFileRequest, SaveFileResponse};
use portal_core::InventoryNode;

use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Cache {
    tree: Option<InventoryNode>,
    known: KnownFiles,
}

/// Typed client for the inventory backend's HTTP endpoints.
#[derive(Debug)]
pub struct InventoryClient {
    http: reqwest::Client,
    api_url: String,
    cache: Mutex<Cache>,
}

impl InventoryClient {
    pub fn new(api_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        InventoryClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(Cache::default()),
        }
    }

    /// `GET /api/tree`: fetch the full tree and replace the cached snapshot.
    pub async fn fetch_tree(&self) -> Result<InventoryNode> {
        let op = "fetch tree";
        let response = self
            .http
            .get(format!("{}/api/tree", self.api_url))
            .send()
            .await
            .map_err(|e| Error::inventory(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::inventory(
                op,
                format!("backend returned {}: {}", status.as_u16(), body),
            ));
        }

        let tree = response
            .json::<InventoryNode>()
            .await
            .map_err(|e| Error::inventory(op, format!("invalid response: {}", e)))?;

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.known.reconcile(tree.leaf_names());
        cache.tree = Some(tree.clone());
        tracing::debug!("inventory tree has {} known file(s)", cache.known.len());
        Ok(tree)
    }

    /// The last tree fetched successfully.
    pub fn cached_tree(&self) -> Option<InventoryNode> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.tree.clone()
    }

    /// Every file name reported so far, tree order first.
    pub fn known_files(&self) -> Vec<String> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.known.names().to_vec()
    }

    /// Record a name announced by the backend. Returns false if already known.
    pub fn record_new_file(&self, name: &str) -> bool {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.known.insert(name)
    }

    /// Download URL for `name` (`{api_url}/files/{name}`, percent-encoded).
    pub fn file_url(&self, name: &str) -> Result<String> {
        let op = "file url";
        let mut url = reqwest::Url::parse(&self.api_url).map_err(|e| Error::inventory(op, e))?;
        url.path_segments_mut()
            .map_err(|_| Error::inventory(op, format!("'{}' cannot be a base URL", self.api_url)))?
            .pop_if_empty()
            .push("files")
            .push(name);
        Ok(url.to_string())
    }

    /// `GET /files/{name}`: download a file's raw bytes.
    pub async fn fetch_file(&self, name: &str) -> Result<Vec<u8>> {
        let op = "fetch file";
        let url = self.file_url(name)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::inventory(op, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::inventory(
                op,
                format!("backend returned {} for '{}'", status.as_u16(), name),
            ));
        }

        let bytes = response.bytes().await.map_err(|e| Error::inventory(op, e))?;
        Ok(bytes.to_vec())
    }

    /// `POST /api/save-file`: store a file in the inventory.
    ///
    /// On success the name is recorded as known.
    pub async fn save_file(&self, filename: &str, bytes: &[u8]) -> Result<SaveFileResponse> {
        let op = "save file";
        let request = SaveFileRequest {
            filename: filename.to_string(),
            file_content: codec::encode(bytes),
        };
        let response = self
            .http
            .post(format!("{}/api/save-file", self.api_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::inventory(op, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::inventory(
                op,
                format!("backend returned {}: {}", status.as_u16(), body),
            ));
        }

        let saved = response
            .json::<SaveFileResponse>()
            .await
            .map_err(|e| Error::inventory(op, format!("invalid response: {}", e)))?;
        if !saved.success {
            return Err(Error::inventory(op, "backend reported failure"));
        }

        tracing::info!("saved {} to inventory ({} bytes)", saved.filename, saved.size);
        self.record_new_file(&saved.filename);
        Ok(saved)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
