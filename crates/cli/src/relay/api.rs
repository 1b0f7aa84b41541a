// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP side of the relay backend: session creation and uploads.

use std::time::Duration;

use portal_core::{ConnectResponse, UploadResponse};

use crate::error::{Error, Result};

/// Typed client for the relay's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct RelayApi {
    http: reqwest::Client,
    base_url: String,
}

impl RelayApi {
    /// Create a client for the relay at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        RelayApi {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /connect`: ask the relay for a new session.
    pub async fn connect(&self) -> Result<ConnectResponse> {
        let response = self
            .http
            .post(format!("{}/connect", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::session(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::session(format!(
                "relay returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        response
            .json::<ConnectResponse>()
            .await
            .map_err(|e| Error::session(format!("invalid response: {}", e)))
    }

    /// `POST /upload`: send a file as multipart form data.
    pub async fn upload(
        &self,
        session_id: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("session_id", session_id.to_string());

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| Error::UploadFailed(format!("invalid response: {}", e)))
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
