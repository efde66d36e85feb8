// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Verify proof endpoint module
//!
//! Provides POST /api/verify for checking an image against its stored proof.

pub mod handler;
pub mod response;

pub use handler::verify_handler;
pub use response::VerifyResponse;
