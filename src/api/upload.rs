// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart image upload parsing
//!
//! Form fields: `image` (file) and an optional `model` (also accepted as
//! `provider`) naming the vision backend.

use axum::http::StatusCode;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;

use super::errors::ApiError;

/// Parsed upload form
#[derive(Debug, Default)]
pub struct ImageUpload {
    /// Raw image bytes; `None` when the part is absent or empty
    pub image: Option<Vec<u8>>,
    /// Requested provider selector
    pub model: Option<String>,
}

impl ImageUpload {
    /// The image bytes, or a 400 if none were sent
    pub fn require_image(&self) -> Result<&[u8], ApiError> {
        self.image.as_deref().ok_or_else(ApiError::missing_image)
    }
}

/// Map a multipart read failure, keeping size-limit hits distinct
fn multipart_error(e: MultipartError, context: &str, max_image_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            limit_bytes: max_image_bytes,
        }
    } else {
        ApiError::InvalidRequest(format!("{}: {}", context, e))
    }
}

/// Read the upload form, rejecting images over `max_image_bytes`
pub async fn read_upload(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<ImageUpload, ApiError> {
    let mut upload = ImageUpload::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "malformed multipart body", max_image_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, "failed to read image", max_image_bytes))?
                {
                    if bytes.len() + chunk.len() > max_image_bytes {
                        return Err(ApiError::PayloadTooLarge {
                            limit_bytes: max_image_bytes,
                        });
                    }
                    bytes.extend_from_slice(&chunk);
                }
                upload.image = Some(bytes).filter(|b| !b.is_empty());
            }
            "model" | "provider" => {
                let text = field.text().await.map_err(|e| {
                    multipart_error(e, &format!("failed to read {}", name), max_image_bytes)
                })?;
                let text = text.trim();
                if !text.is_empty() {
                    upload.model = Some(text.to_string());
                }
            }
            _ => {
                // Unknown parts are drained and ignored
                field.bytes().await.map_err(|e| {
                    multipart_error(e, &format!("failed to read {}", name), max_image_bytes)
                })?;
            }
        }
    }

    Ok(upload)
}
