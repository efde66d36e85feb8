// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{error, warn};

use crate::proof::ProofError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    PayloadTooLarge {
        limit_bytes: usize,
    },
    ModelNotFound {
        model: String,
        available_models: Vec<String>,
    },
    Proof(ProofError),
}

impl ApiError {
    pub fn missing_image() -> Self {
        ApiError::ValidationError {
            field: "image".to_string(),
            message: "image file is required".to_string(),
        }
    }

    pub fn to_response(&self, request_id: Option<String>) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest(msg) => ("input_error", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("input_error", message.clone(), Some(details))
            }
            ApiError::PayloadTooLarge { limit_bytes } => {
                let mut details = HashMap::new();
                details.insert(
                    "limit_bytes".to_string(),
                    serde_json::Value::Number((*limit_bytes as u64).into()),
                );
                (
                    "input_error",
                    format!("image exceeds maximum size of {} bytes", limit_bytes),
                    Some(details),
                )
            }
            ApiError::ModelNotFound {
                model,
                available_models,
            } => {
                let mut details = HashMap::new();
                details.insert(
                    "available_models".to_string(),
                    serde_json::Value::Array(
                        available_models
                            .iter()
                            .map(|m| serde_json::Value::String(m.clone()))
                            .collect(),
                    ),
                );
                (
                    "unsupported_provider",
                    format!("Unsupported model: {}", model),
                    Some(details),
                )
            }
            ApiError::Proof(e) => proof_error_parts(e),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            request_id,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::ModelNotFound { .. } => 400,
            ApiError::Proof(e) => match e {
                ProofError::Input(_) | ProofError::UnsupportedProvider { .. } => 400,
                _ => 500,
            },
        }
    }
}

/// Wire parts for engine errors; internal faults stay opaque
fn proof_error_parts(
    e: &ProofError,
) -> (&'static str, String, Option<HashMap<String, serde_json::Value>>) {
    let details = match e {
        ProofError::IndexPersistFailure {
            fingerprint,
            address,
            ..
        } => {
            let mut details = HashMap::new();
            details.insert(
                "address".to_string(),
                serde_json::Value::String(address.to_string()),
            );
            details.insert(
                "fingerprint".to_string(),
                serde_json::Value::String(fingerprint.to_string()),
            );
            Some(details)
        }
        ProofError::ProviderFailure { provider, .. } => {
            let mut details = HashMap::new();
            details.insert(
                "provider".to_string(),
                serde_json::Value::String(provider.clone()),
            );
            Some(details)
        }
        _ => None,
    };

    let message = match e {
        ProofError::Internal(_) => "internal error".to_string(),
        other => other.to_string(),
    };

    (e.code(), message, details)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::PayloadTooLarge { limit_bytes } => {
                write!(f, "Payload exceeds {} bytes", limit_bytes)
            }
            ApiError::ModelNotFound { model, .. } => write!(f, "Model '{}' not found", model),
            ApiError::Proof(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ProofError> for ApiError {
    fn from(e: ProofError) -> Self {
        ApiError::Proof(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4().to_string();
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(request_id = %request_id, status = status.as_u16(), "request failed: {}", self);
        } else {
            warn!(request_id = %request_id, status = status.as_u16(), "request rejected: {}", self);
        }

        (status, Json(self.to_response(Some(request_id)))).into_response()
    }
}
