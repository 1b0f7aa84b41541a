// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod fetch;
pub mod listen;
pub mod tree;
pub mod upload;
pub mod watch;

use std::future::Future;
use std::path::Path;

use crate::relay::Closer;

/// Final path component of a backend-supplied name, so a remote name can
/// never escape the output directory.
pub(crate) fn local_file_name(name: &str) -> Option<String> {
    let base = Path::new(name).file_name()?.to_string_lossy().into_owned();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base)
    }
}

/// Run `task` to completion, closing it on Ctrl-C.
pub(crate) async fn until_interrupted<F: Future>(closer: Closer, task: F) -> F::Output {
    tokio::pin!(task);
    tokio::select! {
        result = &mut task => result,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, closing");
            closer.close();
            task.await
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
