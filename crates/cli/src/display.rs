// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Display formatting for command output.

use portal_core::InventoryNode;

use crate::relay::UploadResult;

fn node_label(node: &InventoryNode) -> String {
    if node.is_dir {
        format!("{}/", node.name)
    } else {
        node.name.clone()
    }
}

/// Render an inventory tree with box-drawing connectors.
///
/// ```text
/// root/
/// ├── a.txt
/// └── docs/
///     └── b.md
/// ```
pub fn format_tree(root: &InventoryNode) -> Vec<String> {
    let mut lines = vec![node_label(root)];
    push_children(root.children(), "", &mut lines);
    lines
}

fn push_children(children: &[InventoryNode], prefix: &str, lines: &mut Vec<String>) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, node_label(child)));

        if !child.children().is_empty() {
            let child_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            push_children(child.children(), &child_prefix, lines);
        }
    }
}

/// One line per upload: `file_id  filename  size`.
pub fn format_upload(result: &UploadResult) -> String {
    format!("{}  {}  {}", result.file_id, result.filename, result.size)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
