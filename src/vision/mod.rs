// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision description providers
//!
//! Turns image bytes into a natural-language description plus the id of the
//! model that produced it. Backends:
//! - OpenAI-compatible chat completions (OpenAI, xAI Grok)
//! - Offline mock provider

pub mod image_utils;
pub mod mock;
pub mod provider;
pub mod registry;
pub mod vlm_client;

pub use mock::MockVisionProvider;
pub use provider::{Description, DescriptionProvider, VisionError};
pub use registry::ProviderRegistry;
pub use vlm_client::{VlmClient, VlmClientConfig};
