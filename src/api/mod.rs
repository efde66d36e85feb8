// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate;
pub mod http_server;
pub mod upload;
pub mod verify;

pub use errors::{ApiError, ErrorResponse};
pub use generate::{generate_handler, GenerateResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
pub use upload::{read_upload, ImageUpload};
pub use verify::{verify_handler, VerifyResponse};
