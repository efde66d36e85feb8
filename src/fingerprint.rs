// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image fingerprinting
//!
//! A fingerprint is the lowercase hex SHA-256 digest of the raw image bytes.
//! It keys the local index and is embedded in every proof record.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a rendered fingerprint (32 bytes as hex)
pub const FINGERPRINT_HEX_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FingerprintParseError {
    #[error("fingerprint must be {FINGERPRINT_HEX_LEN} hex characters, got {0}")]
    InvalidLength(usize),
    #[error("fingerprint must be lowercase hex")]
    InvalidCharacters,
}

/// Content fingerprint of an image
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of raw image bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != FINGERPRINT_HEX_LEN {
            return Err(FingerprintParseError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(FingerprintParseError::InvalidCharacters);
        }
        Ok(Self(s.to_string()))
    }
}
