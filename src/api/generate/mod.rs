// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generate proof endpoint module
//!
//! Provides POST /api/generate for issuing a proof of an uploaded image.

pub mod handler;
pub mod response;

pub use handler::generate_handler;
pub use response::GenerateResponse;
