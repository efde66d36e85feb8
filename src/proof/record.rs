// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proof record persisted to the content store
//!
//! The record is created once at generate time and never modified. It is
//! stored as pretty-printed JSON. Field aliases accept records written by
//! earlier deployments (`image_hash`, `timestamp`, `vault_version`).

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::vision::Description;

/// Schema version stamped into every new record
pub const SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    #[serde(alias = "image_hash")]
    pub fingerprint: Fingerprint,
    pub description: String,
    pub model: String,
    /// Unix seconds
    #[serde(alias = "timestamp")]
    pub created_at: i64,
    #[serde(alias = "vault_version")]
    pub schema_version: String,
}

impl ProofRecord {
    pub fn new(fingerprint: Fingerprint, description: Description, created_at: i64) -> Self {
        Self {
            fingerprint,
            description: description.description,
            model: description.model,
            created_at,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Whether this record was issued for the given fingerprint
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        &self.fingerprint == fingerprint
    }
}
