// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AI Proof Vault
//!
//! Issues proofs that an image was described by an AI model at a point in
//! time: the image is fingerprinted, described, recorded in a
//! content-addressed store and indexed locally by fingerprint. Verification
//! recomputes the fingerprint and checks the stored record.

pub mod api;
pub mod cli;
pub mod config;
pub mod fingerprint;
pub mod proof;
pub mod storage;
pub mod version;
pub mod vision;

pub use config::VaultConfig;
pub use fingerprint::Fingerprint;
pub use proof::{GeneratedProof, ProofEngine, ProofError, ProofRecord, VerifyOutcome};
pub use storage::{ContentAddress, ContentStore, LocalIndex, SqliteIndex, StoreBridgeClient};
pub use vision::{DescriptionProvider, ProviderRegistry};
