// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use super::local_file_name;
use crate::config::Config;
use crate::display::format_size;
use crate::error::{Error, Result};
use crate::inventory::InventoryClient;

pub async fn run(config: &Config, name: &str, out: Option<&Path>) -> Result<()> {
    let target = output_path(name, out)?;
    let client = InventoryClient::new(&config.inventory.api_url, config.http.timeout());

    let bytes = client.fetch_file(name).await?;
    tokio::fs::write(&target, &bytes).await?;

    println!(
        "saved {} ({}) to {}",
        name,
        format_size(bytes.len() as u64),
        target.display()
    );
    Ok(())
}

/// Where a fetched file is written: `out` if given, else `./<base name>`.
pub(crate) fn output_path(name: &str, out: Option<&Path>) -> Result<PathBuf> {
    if let Some(out) = out {
        return Ok(out.to_path_buf());
    }
    local_file_name(name)
        .map(PathBuf::from)
        .ok_or_else(|| Error::inventory("fetch file", format!("'{}' is not a file name", name)))
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
