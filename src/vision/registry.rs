// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Provider selection
//!
//! Maps case-insensitive selectors ("openai", "gpt-4o-mini", "grok", ...) to
//! provider implementations. New backends are added by registering them, the
//! proof engine never branches on provider names.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::mock::{MockVisionProvider, MOCK_MODEL};
use super::provider::{Description, DescriptionProvider, VisionError};
use super::vlm_client::{VlmClient, VlmClientConfig};
use crate::config::VisionConfig;

pub const OPENAI_SELECTORS: &[&str] = &["openai", "gpt-4o-mini"];
pub const GROK_SELECTORS: &[&str] = &["grok", "grok-2-vision"];
pub const MOCK_SELECTORS: &[&str] = &["mock", MOCK_MODEL];

/// Dispatch table from selector to provider
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn DescriptionProvider>>,
    default_selector: String,
}

impl ProviderRegistry {
    pub fn new(default_selector: &str) -> Self {
        Self {
            providers: HashMap::new(),
            default_selector: default_selector.to_lowercase(),
        }
    }

    /// Build the registry from configuration
    ///
    /// A backend is registered only when its API key is present.
    pub fn from_config(config: &VisionConfig) -> anyhow::Result<Self> {
        let mut registry = Self::new(&config.default_provider);

        if let Some(ref openai) = config.openai {
            let client = VlmClient::new(VlmClientConfig {
                provider: "openai".to_string(),
                endpoint: openai.base_url.clone(),
                api_key: openai.api_key.clone(),
                model_name: openai.model.clone(),
                timeout_secs: config.timeout_secs,
            })?;
            registry.register(OPENAI_SELECTORS, Arc::new(client));
        }

        if let Some(ref grok) = config.grok {
            let client = VlmClient::new(VlmClientConfig {
                provider: "grok".to_string(),
                endpoint: grok.base_url.clone(),
                api_key: grok.api_key.clone(),
                model_name: grok.model.clone(),
                timeout_secs: config.timeout_secs,
            })?;
            registry.register(GROK_SELECTORS, Arc::new(client));
        }

        if config.enable_mock {
            registry.register(MOCK_SELECTORS, Arc::new(MockVisionProvider::new()));
        }

        info!(
            "Vision providers registered: {:?} (default: {})",
            registry.selectors(),
            registry.default_selector
        );
        Ok(registry)
    }

    /// Register a provider under one or more selectors
    pub fn register(&mut self, selectors: &[&str], provider: Arc<dyn DescriptionProvider>) {
        for selector in selectors {
            debug!("Registering provider {} as '{}'", provider.name(), selector);
            self.providers
                .insert(selector.to_lowercase(), Arc::clone(&provider));
        }
    }

    pub fn default_selector(&self) -> &str {
        &self.default_selector
    }

    /// All registered selectors, sorted
    pub fn selectors(&self) -> Vec<String> {
        let mut selectors: Vec<String> = self.providers.keys().cloned().collect();
        selectors.sort();
        selectors
    }

    /// Look up the provider for a selector, or the default when none is given
    pub fn resolve(
        &self,
        selector: Option<&str>,
    ) -> Result<Arc<dyn DescriptionProvider>, VisionError> {
        let selector = selector
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_selector);

        self.providers
            .get(&selector.to_lowercase())
            .cloned()
            .ok_or_else(|| VisionError::UnsupportedProvider {
                selector: selector.to_string(),
            })
    }

    /// Describe an image with the selected provider
    pub async fn describe(
        &self,
        image: &[u8],
        selector: Option<&str>,
    ) -> Result<Description, VisionError> {
        let provider = self.resolve(selector)?;
        provider.describe(image).await
    }
}
