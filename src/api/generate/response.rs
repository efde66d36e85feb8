// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generate proof response types

use serde::{Deserialize, Serialize};

use crate::proof::GeneratedProof;

/// Response from proof generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    /// AI description of the image
    pub description: String,
    /// Model that produced the description
    pub model: String,
    /// Unix seconds at which the proof was issued
    pub timestamp: i64,
    /// Content address of the stored proof record
    pub address: String,
}

impl From<GeneratedProof> for GenerateResponse {
    fn from(proof: GeneratedProof) -> Self {
        Self {
            description: proof.description,
            model: proof.model,
            timestamp: proof.timestamp,
            address: proof.address.to_string(),
        }
    }
}
