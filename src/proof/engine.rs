// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proof engine
//!
//! Generate: `Received → Fingerprinted → Described → Recorded → Indexed → Done`.
//! A failure at any stage ends the request; nothing is written to the index
//! unless the record reached the content store first.
//!
//! Verify: `Received → Fingerprinted → Looked up → {Fetched | Missing} → Verdict`.
//! "No proof", "can't confirm" and "mismatch" are outcomes, not errors.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::{GenerateStage, ProofError};
use super::record::ProofRecord;
use crate::fingerprint::Fingerprint;
use crate::storage::{ContentAddress, ContentStore, IndexEntry, IndexError, LocalIndex, StoreError};
use crate::vision::ProviderRegistry;

/// Wall-clock source, in unix seconds
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Result of a successful generate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedProof {
    pub fingerprint: Fingerprint,
    pub description: String,
    pub model: String,
    /// Unix seconds, identical to the record's `created_at`
    pub timestamp: i64,
    pub address: ContentAddress,
}

/// Verdict of a verify request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The index has no entry for this image
    NoProofFound { fingerprint: Fingerprint },
    /// The index has an entry but the record could not be fetched, so the
    /// match is unconfirmed
    RecordUnavailable {
        fingerprint: Fingerprint,
        address: ContentAddress,
        indexed_at: i64,
        cause: StoreError,
    },
    /// The fetched record was issued for this exact image
    Confirmed {
        fingerprint: Fingerprint,
        address: ContentAddress,
        description: String,
        model: String,
        timestamp: i64,
    },
    /// The fetched record is unreadable or belongs to another image
    HashMismatch {
        fingerprint: Fingerprint,
        address: ContentAddress,
    },
}

impl VerifyOutcome {
    /// True for confirmed matches and for unconfirmed (unavailable) mappings
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            VerifyOutcome::Confirmed { .. } | VerifyOutcome::RecordUnavailable { .. }
        )
    }

    /// True only when the record was fetched and matched
    pub fn is_confirmed(&self) -> bool {
        matches!(self, VerifyOutcome::Confirmed { .. })
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            VerifyOutcome::NoProofFound { fingerprint }
            | VerifyOutcome::RecordUnavailable { fingerprint, .. }
            | VerifyOutcome::Confirmed { fingerprint, .. }
            | VerifyOutcome::HashMismatch { fingerprint, .. } => fingerprint,
        }
    }
}

/// Orchestrates generate and verify over injected collaborators
pub struct ProofEngine {
    index: Arc<dyn LocalIndex>,
    providers: Arc<ProviderRegistry>,
    store: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
}

impl ProofEngine {
    pub fn new(
        index: Arc<dyn LocalIndex>,
        providers: Arc<ProviderRegistry>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self {
            index,
            providers,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub async fn store_health(&self) -> Result<(), StoreError> {
        self.store.health().await
    }

    pub async fn index_size(&self) -> Result<u64, IndexError> {
        self.index.count().await
    }

    /// Issue a proof for an image
    pub async fn generate(
        &self,
        image: &[u8],
        selector: Option<&str>,
    ) -> Result<GeneratedProof, ProofError> {
        if image.is_empty() {
            return Err(ProofError::missing_image());
        }

        let fingerprint = Fingerprint::of(image);
        debug!(fingerprint = %fingerprint.short(), stage = ?GenerateStage::Fingerprinted, "generate");

        let description = self
            .providers
            .describe(image, selector)
            .await
            .map_err(|e| {
                warn!(fingerprint = %fingerprint.short(), stage = ?GenerateStage::Described, "description failed: {}", e);
                ProofError::from(e)
            })?;
        debug!(fingerprint = %fingerprint.short(), stage = ?GenerateStage::Described, model = %description.model, "generate");

        let record = ProofRecord::new(fingerprint.clone(), description, self.clock.now_unix());
        let bytes = record
            .to_bytes()
            .map_err(|e| ProofError::Internal(format!("failed to serialize proof record: {}", e)))?;

        let address = self.store.put(bytes).await.map_err(|e| {
            warn!(fingerprint = %fingerprint.short(), stage = ?GenerateStage::Recorded, "store write failed: {}", e);
            ProofError::from(e)
        })?;
        debug!(fingerprint = %fingerprint.short(), stage = ?GenerateStage::Recorded, address = %address, "generate");

        let entry = IndexEntry {
            fingerprint: fingerprint.clone(),
            address: address.clone(),
            created_at: record.created_at,
        };
        if let Err(e) = self.index.upsert(entry).await {
            error!(
                fingerprint = %fingerprint,
                address = %address,
                "proof record stored but index write failed, record is orphaned: {}",
                e
            );
            return Err(ProofError::IndexPersistFailure {
                fingerprint,
                address,
                cause: e.to_string(),
            });
        }

        info!(
            fingerprint = %fingerprint.short(),
            address = %address,
            model = %record.model,
            "proof generated"
        );

        Ok(GeneratedProof {
            fingerprint,
            description: record.description,
            model: record.model,
            timestamp: record.created_at,
            address,
        })
    }

    /// Check an image against its stored proof
    pub async fn verify(&self, image: &[u8]) -> Result<VerifyOutcome, ProofError> {
        if image.is_empty() {
            return Err(ProofError::missing_image());
        }

        let fingerprint = Fingerprint::of(image);

        let entry = self
            .index
            .lookup(&fingerprint)
            .await
            .map_err(|e| ProofError::Internal(format!("index lookup failed: {}", e)))?;

        let Some(entry) = entry else {
            debug!(fingerprint = %fingerprint.short(), "no proof found");
            return Ok(VerifyOutcome::NoProofFound { fingerprint });
        };

        let bytes = match self.store.get(&entry.address).await {
            Ok(bytes) => bytes,
            Err(cause) => {
                warn!(
                    fingerprint = %fingerprint.short(),
                    address = %entry.address,
                    "proof mapping found but record not retrievable: {}",
                    cause
                );
                return Ok(VerifyOutcome::RecordUnavailable {
                    fingerprint,
                    address: entry.address,
                    indexed_at: entry.created_at,
                    cause,
                });
            }
        };

        let record = match ProofRecord::from_bytes(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    fingerprint = %fingerprint.short(),
                    address = %entry.address,
                    "stored record is not a valid proof: {}",
                    e
                );
                return Ok(VerifyOutcome::HashMismatch {
                    fingerprint,
                    address: entry.address,
                });
            }
        };

        if !record.matches(&fingerprint) {
            warn!(
                fingerprint = %fingerprint.short(),
                address = %entry.address,
                record_fingerprint = %record.fingerprint,
                "stored record belongs to a different image"
            );
            return Ok(VerifyOutcome::HashMismatch {
                fingerprint,
                address: entry.address,
            });
        }

        info!(fingerprint = %fingerprint.short(), address = %entry.address, "proof confirmed");
        Ok(VerifyOutcome::Confirmed {
            fingerprint,
            address: entry.address,
            description: record.description,
            model: record.model,
            timestamp: record.created_at,
        })
    }
}
