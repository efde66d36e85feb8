// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content-addressed store abstraction
//!
//! `put` hands opaque bytes to a remote store and gets back an address;
//! `get` fetches them again. Callers must be able to tell "store unreachable"
//! (`Unavailable`) apart from "store reachable, address absent" (`Miss`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backend cannot be reached or rejected our credentials
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Backend reported an error for a write
    #[error("Store write failed: {0}")]
    WriteFailure(String),
    /// Backend is reachable but has nothing at this address
    #[error("Not found in store: {0}")]
    Miss(String),
}

/// Opaque locator returned by a content store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Durably store bytes, returning their address
    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress, StoreError>;

    /// Fetch bytes previously stored at `address`
    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>, StoreError>;

    /// Probe the backend
    async fn health(&self) -> Result<(), StoreError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// In-memory content-addressed store
///
/// Addresses are `mem://` plus a prefix of the SHA-256 of the content, so
/// identical bytes share an address. Supports an offline switch, one-shot
/// error injection and in-place tampering for failure-path tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<Mutex<HashMap<ContentAddress, Vec<u8>>>>,
    injected_error: Arc<Mutex<Option<StoreError>>>,
    offline: Arc<AtomicBool>,
    puts: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn address_for(data: &[u8]) -> ContentAddress {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let hash = hex::encode(hasher.finalize());
        ContentAddress(format!("mem://{}", &hash[0..32]))
    }

    /// Simulate the backend going away (or coming back)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fail the next call with the given error
    pub async fn inject_error(&self, error: StoreError) {
        *self.injected_error.lock().await = Some(error);
    }

    /// Replace the bytes behind an existing address
    pub async fn tamper(&self, address: &ContentAddress, data: Vec<u8>) {
        self.blobs.lock().await.insert(address.clone(), data);
    }

    /// Forget an address, as if the store expired it
    pub async fn evict(&self, address: &ContentAddress) {
        self.blobs.lock().await.remove(address);
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    async fn check_available(&self) -> Result<(), StoreError> {
        if let Some(error) = self.injected_error.lock().await.take() {
            return Err(error);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress, StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;

        let address = Self::address_for(&data);
        self.blobs.lock().await.insert(address.clone(), data);
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available().await?;

        self.blobs
            .lock()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::Miss(address.to_string()))
    }

    async fn health(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
