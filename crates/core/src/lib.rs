// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! portal-core: Shared wire types for the portal relay client
//!
//! This crate provides the transport encoding, protocol frames, backend
//! payloads and inventory model used by the portal controller. It performs
//! no I/O.

pub mod codec;
pub mod error;
pub mod inventory;
pub mod protocol;

pub use codec::CodecError;
pub use error::{Error, Result};
pub use inventory::InventoryNode;
pub use protocol::{
    ClientFrame, ConnectResponse, Delivery, Inbound, ServerFrame, Session, UploadResponse,
};
