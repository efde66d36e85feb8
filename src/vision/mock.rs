// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Offline vision provider for development and tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::provider::{Description, DescriptionProvider, VisionError};

pub const MOCK_MODEL: &str = "mock-vision-1";

/// Provider that answers without any network call
#[derive(Clone)]
pub struct MockVisionProvider {
    description: String,
    model: String,
    injected_error: Arc<Mutex<Option<VisionError>>>,
    calls: Arc<AtomicUsize>,
}

impl MockVisionProvider {
    pub fn new() -> Self {
        Self::with_description("mock description of the submitted image")
    }

    pub fn with_description(description: &str) -> Self {
        Self {
            description: description.to_string(),
            model: MOCK_MODEL.to_string(),
            injected_error: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report a different model id
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Fail the next `describe` call with the given error
    pub async fn inject_error(&self, error: VisionError) {
        *self.injected_error.lock().await = Some(error);
    }

    /// Number of `describe` calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockVisionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DescriptionProvider for MockVisionProvider {
    async fn describe(&self, _image: &[u8]) -> Result<Description, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.injected_error.lock().await.take() {
            return Err(error);
        }
        Ok(Description {
            description: self.description.clone(),
            model: self.model.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
