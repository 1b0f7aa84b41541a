// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use portal_core::InventoryNode;

use crate::config::Config;
use crate::display::format_tree;
use crate::error::Result;
use crate::inventory::InventoryClient;

pub async fn run(config: &Config, flat: bool) -> Result<()> {
    let client = InventoryClient::new(&config.inventory.api_url, config.http.timeout());
    let tree = client.fetch_tree().await?;
    for line in render(&tree, flat) {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn render(tree: &InventoryNode, flat: bool) -> Vec<String> {
    if flat {
        tree.leaf_names()
    } else {
        format_tree(tree)
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
