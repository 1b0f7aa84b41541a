// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory model: the remote file tree and the flat list of known files.

use serde::{Deserialize, Serialize};

/// A node of the remote file tree, as served by `GET /api/tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryNode {
    pub name: String,
    #[serde(rename = "isDir", default)]
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<InventoryNode>>,
}

impl InventoryNode {
    /// Creates a file node.
    pub fn file(name: impl Into<String>) -> Self {
        InventoryNode {
            name: name.into(),
            is_dir: false,
            children: None,
        }
    }

    /// Creates a directory node.
    pub fn dir(name: impl Into<String>, children: Vec<InventoryNode>) -> Self {
        InventoryNode {
            name: name.into(),
            is_dir: true,
            children: Some(children),
        }
    }

    /// Child nodes, empty for files.
    pub fn children(&self) -> &[InventoryNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Names of every file (non-directory) node, in depth-first pre-order.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_leaves(&mut names);
        names
    }

    fn collect_leaves(&self, names: &mut Vec<String>) {
        if !self.is_dir {
            names.push(self.name.clone());
        }
        for child in self.children() {
            child.collect_leaves(names);
        }
    }

    /// Visits every node depth-first with its depth (root is 0).
    pub fn walk<F: FnMut(&InventoryNode, usize)>(&self, mut visit: F) {
        self.walk_inner(0, &mut visit);
    }

    fn walk_inner<F: FnMut(&InventoryNode, usize)>(&self, depth: usize, visit: &mut F) {
        visit(self, depth);
        for child in self.children() {
            child.walk_inner(depth + 1, visit);
        }
    }
}

/// Ordered, duplicate-free list of file names the backend has reported.
///
/// Entries are only ever added: a refetch reorders the list to match the tree
/// but keeps names that were announced on the push channel and are not (yet)
/// part of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownFiles {
    names: Vec<String>,
}

impl KnownFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a name. Returns false if it was already known.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Rebuilds the list from a fresh tree listing.
    ///
    /// Tree names come first in traversal order, followed by previously known
    /// names the tree did not include.
    pub fn reconcile(&mut self, tree_names: Vec<String>) {
        let previous = std::mem::take(&mut self.names);
        for name in tree_names {
            self.insert(&name);
        }
        for name in previous {
            self.insert(&name);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Body of `POST /api/save-file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileRequest {
    pub filename: String,
    /// Hex-encoded file bytes.
    #[serde(rename = "fileContent")]
    pub file_content: String,
}

/// Body of a successful `POST /api/save-file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileResponse {
    #[serde(default)]
    pub success: bool,
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
