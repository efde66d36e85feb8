// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Verify proof response types

use serde::{Deserialize, Serialize};

use crate::proof::VerifyOutcome;

pub const REASON_NO_PROOF_FOUND: &str = "no_proof_found";
pub const REASON_HASH_MISMATCH: &str = "hash_mismatch";
pub const CAVEAT_RECORD_UNAVAILABLE: &str = "record_unavailable";

/// Response from proof verification
///
/// Fields not relevant to the verdict are omitted from the JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub valid: bool,
    /// Why `valid` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when `valid` is true but the record could not be fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Human-readable note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl From<VerifyOutcome> for VerifyResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        match outcome {
            VerifyOutcome::NoProofFound { .. } => VerifyResponse {
                valid: false,
                reason: Some(REASON_NO_PROOF_FOUND.to_string()),
                ..Default::default()
            },
            VerifyOutcome::RecordUnavailable {
                address,
                indexed_at,
                cause,
                ..
            } => VerifyResponse {
                valid: true,
                caveat: Some(CAVEAT_RECORD_UNAVAILABLE.to_string()),
                address: Some(address.to_string()),
                timestamp: Some(indexed_at),
                info: Some(format!(
                    "Proof is indexed locally but the stored record could not be fetched: {}",
                    cause
                )),
                ..Default::default()
            },
            VerifyOutcome::Confirmed {
                address,
                description,
                model,
                timestamp,
                ..
            } => VerifyResponse {
                valid: true,
                address: Some(address.to_string()),
                description: Some(description),
                model: Some(model),
                timestamp: Some(timestamp),
                ..Default::default()
            },
            VerifyOutcome::HashMismatch { address, .. } => VerifyResponse {
                valid: false,
                reason: Some(REASON_HASH_MISMATCH.to_string()),
                address: Some(address.to_string()),
                ..Default::default()
            },
        }
    }
}
