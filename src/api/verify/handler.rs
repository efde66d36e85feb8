// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Verify proof endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::info;

use super::response::VerifyResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;

/// POST /api/verify - Check an image against the proof recorded for it
///
/// "No proof", "unconfirmed" and "mismatch" are 200 responses; only bad
/// input and unexpected faults are errors.
pub async fn verify_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VerifyResponse>, ApiError> {
    let upload = read_upload(multipart, state.max_image_bytes).await?;
    let image = upload.require_image()?;

    let outcome = state.engine.verify(image).await?;
    info!(
        fingerprint = %outcome.fingerprint().short(),
        valid = outcome.is_valid(),
        confirmed = outcome.is_confirmed(),
        "verify request"
    );

    Ok(Json(VerifyResponse::from(outcome)))
}
