// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generate proof endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::info;

use super::response::GenerateResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::read_upload;
use crate::proof::ProofError;

/// POST /api/generate - Fingerprint, describe and store a proof for an image
///
/// Multipart fields: `image` (required) and `model` (optional provider
/// selector, defaults to the configured provider).
pub async fn generate_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let upload = read_upload(multipart, state.max_image_bytes).await?;
    let image = upload.require_image()?;

    info!(
        bytes = image.len(),
        model = upload.model.as_deref().unwrap_or("default"),
        "generate request"
    );

    let proof = state
        .engine
        .generate(image, upload.model.as_deref())
        .await
        .map_err(|e| match e {
            ProofError::UnsupportedProvider { selector } => ApiError::ModelNotFound {
                model: selector,
                available_models: state.engine.providers().selectors(),
            },
            other => ApiError::from(other),
        })?;

    Ok(Json(GenerateResponse::from(proof)))
}
