// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Description provider trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A description of an image and the backend model that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    /// Natural-language description of the image content
    pub description: String,
    /// Concrete model that answered
    pub model: String,
}

/// Errors that can occur while describing an image
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VisionError {
    /// No provider is registered under the requested selector
    #[error("Unsupported model: {selector}")]
    UnsupportedProvider {
        /// The selector that was requested
        selector: String,
    },

    /// The selected backend failed (transport error, timeout, bad response)
    #[error("{provider} vision call failed: {cause}")]
    ProviderFailure {
        /// Name of the backend that failed
        provider: String,
        /// Underlying cause
        cause: String,
    },
}

impl VisionError {
    pub fn failure(provider: &str, cause: impl Into<String>) -> Self {
        VisionError::ProviderFailure {
            provider: provider.to_string(),
            cause: cause.into(),
        }
    }
}

/// Trait for implementing vision description backends
///
/// Each call makes at most one outbound request and persists nothing locally.
/// Implementations must fail within a bounded time.
#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    /// Describe the given raw image bytes
    async fn describe(&self, image: &[u8]) -> Result<Description, VisionError>;

    /// Get the provider name for logging and error reporting
    fn name(&self) -> &str;
}
