// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proof engine error taxonomy

use serde::Serialize;
use thiserror::Error;

use crate::fingerprint::Fingerprint;
use crate::storage::{ContentAddress, StoreError};
use crate::vision::VisionError;

/// Stages of the generate state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateStage {
    Received,
    Fingerprinted,
    Described,
    Recorded,
    Indexed,
    Done,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProofError {
    /// Caller-fixable request problem
    #[error("{0}")]
    Input(String),

    #[error("Unsupported model: {selector}")]
    UnsupportedProvider { selector: String },

    #[error("{provider} vision call failed: {cause}")]
    ProviderFailure { provider: String, cause: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store write failed: {0}")]
    StoreWriteFailure(String),

    #[error("Not found in store: {0}")]
    StoreMiss(String),

    /// The record reached the store but the local index write failed.
    /// `address` is the only reference to it.
    #[error("proof stored at {address} but index write failed: {cause}")]
    IndexPersistFailure {
        fingerprint: Fingerprint,
        address: ContentAddress,
        cause: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ProofError {
    pub fn missing_image() -> Self {
        ProofError::Input("missing image".to_string())
    }

    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            ProofError::Input(_) => "input_error",
            ProofError::UnsupportedProvider { .. } => "unsupported_provider",
            ProofError::ProviderFailure { .. } => "provider_failure",
            ProofError::StoreUnavailable(_) => "store_unavailable",
            ProofError::StoreWriteFailure(_) => "store_write_failure",
            ProofError::StoreMiss(_) => "store_miss",
            ProofError::IndexPersistFailure { .. } => "index_persist_failure",
            ProofError::Internal(_) => "internal_error",
        }
    }

    /// Generate stage at which this error stopped the request
    pub fn failed_stage(&self) -> Option<GenerateStage> {
        match self {
            ProofError::Input(_) => Some(GenerateStage::Received),
            ProofError::UnsupportedProvider { .. } | ProofError::ProviderFailure { .. } => {
                Some(GenerateStage::Described)
            }
            ProofError::StoreUnavailable(_)
            | ProofError::StoreWriteFailure(_)
            | ProofError::StoreMiss(_) => Some(GenerateStage::Recorded),
            ProofError::IndexPersistFailure { .. } => Some(GenerateStage::Indexed),
            ProofError::Internal(_) => None,
        }
    }
}

impl From<VisionError> for ProofError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::UnsupportedProvider { selector } => {
                ProofError::UnsupportedProvider { selector }
            }
            VisionError::ProviderFailure { provider, cause } => {
                ProofError::ProviderFailure { provider, cause }
            }
        }
    }
}

impl From<StoreError> for ProofError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => ProofError::StoreUnavailable(msg),
            StoreError::WriteFailure(msg) => ProofError::StoreWriteFailure(msg),
            StoreError::Miss(msg) => ProofError::StoreMiss(msg),
        }
    }
}
