// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod bridge_client;
pub mod content_store;
pub mod local_index;

// Re-export main types for convenience
pub use bridge_client::StoreBridgeClient;
pub use content_store::{ContentAddress, ContentStore, MemoryContentStore, StoreError};
pub use local_index::{IndexEntry, IndexError, LocalIndex, SqliteIndex};
