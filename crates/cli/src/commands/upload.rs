// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::config::Config;
use crate::display::format_upload;
use crate::error::{Error, Result};
use crate::relay::{check_size, RelayApi, SessionStore, UploadCoordinator, UploadResult};

pub async fn run(config: &Config, paths: &[PathBuf]) -> Result<()> {
    // Fail fast, before touching the network.
    for path in paths {
        check_local_file(path).await?;
    }

    let api = RelayApi::new(&config.relay.api_url, config.http.timeout());
    let store = Arc::new(SessionStore::new(api.clone()));
    let session = store.begin_session().await?;
    tracing::debug!("uploading {} file(s) on session {}", paths.len(), session.id());

    let uploads = UploadCoordinator::new(api, store);
    let results = join_all(paths.iter().map(|path| uploads.upload_path(path))).await;

    report(paths, results)
}

/// The path must be a regular file within the size limit.
pub(crate) async fn check_local_file(path: &std::path::Path) -> Result<()> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    if !metadata.is_file() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{}: not a regular file", path.display()),
        )));
    }
    check_size(metadata.len())
}

/// Print every success; report failures and return the first.
fn report(paths: &[PathBuf], results: Vec<Result<UploadResult>>) -> Result<()> {
    let mut first_error = None;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(uploaded) => println!("{}", format_upload(&uploaded)),
            Err(e) => {
                if first_error.is_some() {
                    eprintln!("error: {}: {}", path.display(), e);
                } else {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
