// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Proof lifecycle: record model, error taxonomy and the generate/verify engine

pub mod engine;
pub mod error;
pub mod record;

pub use engine::{Clock, GeneratedProof, ProofEngine, SystemClock, VerifyOutcome};
pub use error::{GenerateStage, ProofError};
pub use record::{ProofRecord, SCHEMA_VERSION};
