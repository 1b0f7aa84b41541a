// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory backend client: tree snapshots, file downloads, saving
//! received files, and the new-file push channel.

mod client;
mod watch;

pub use client::InventoryClient;
pub use watch::{InventoryWatcher, WatchEvent};
