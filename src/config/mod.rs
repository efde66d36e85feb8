// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! the binary first). Storage payment/account provisioning is not configured
//! here; the store is assumed to be funded before the vault starts.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default upload limit (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// File name of the local index inside the data directory
pub const INDEX_FILE_NAME: &str = "vault.db";

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub server: ServerConfig,
    /// Directory holding the local index database
    pub data_dir: PathBuf,
    pub vision: VisionConfig,
    pub store: StoreConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted image upload in bytes
    pub max_image_bytes: usize,
}

/// Vision provider configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Selector used when a request names no provider
    pub default_provider: String,
    /// Register the offline mock provider
    pub enable_mock: bool,
    pub openai: Option<BackendConfig>,
    pub grok: Option<BackendConfig>,
    /// Request timeout for every vision backend
    pub timeout_secs: u64,
}

/// One OpenAI-compatible vision backend
#[derive(Clone)]
pub struct BackendConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

/// Storage network the content-store bridge should write to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreNetwork {
    Calibration,
    Mainnet,
}

impl StoreNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreNetwork::Calibration => "calibration",
            StoreNetwork::Mainnet => "mainnet",
        }
    }
}

impl FromStr for StoreNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(StoreNetwork::Mainnet),
            "calibration" | "testnet" => Ok(StoreNetwork::Calibration),
            other => Err(format!("unknown store network '{}'", other)),
        }
    }
}

/// Content-store bridge configuration
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub network: StoreNetwork,
    pub timeout_secs: u64,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("network", &self.network)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VaultConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let openai = env_non_empty("OPENAI_API_KEY").map(|api_key| BackendConfig {
            api_key,
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        });

        let grok = env_non_empty("GROK_API_KEY")
            .or_else(|| env_non_empty("XAI_API_KEY"))
            .map(|api_key| BackendConfig {
                api_key,
                base_url: env::var("GROK_BASE_URL")
                    .unwrap_or_else(|_| "https://api.x.ai".to_string()),
                model: env::var("GROK_VISION_MODEL")
                    .unwrap_or_else(|_| "grok-2-vision".to_string()),
            });

        Self {
            server: ServerConfig {
                host: env::var("BIND_HOST").unwrap_or(defaults.server.host),
                port: env_parse("PORT", defaults.server.port),
                max_image_bytes: env_parse("MAX_IMAGE_BYTES", defaults.server.max_image_bytes),
            },
            data_dir: env::var("VAULT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            vision: VisionConfig {
                default_provider: env::var("VAULT_DEFAULT_PROVIDER")
                    .unwrap_or(defaults.vision.default_provider),
                enable_mock: env::var("VAULT_MOCK_PROVIDER")
                    .map(|v| v.to_lowercase() == "true" || v == "1")
                    .unwrap_or(false),
                openai,
                grok,
                timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", defaults.vision.timeout_secs),
            },
            store: StoreConfig {
                url: env::var("STORE_URL").unwrap_or(defaults.store.url),
                api_key: env_non_empty("STORE_API_KEY"),
                network: env::var("STORE_NETWORK")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.store.network),
                timeout_secs: env_parse("STORE_TIMEOUT_SECS", defaults.store.timeout_secs),
            },
        }
    }

    /// Path of the local index database
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILE_NAME)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_image_bytes == 0 {
            return Err("MAX_IMAGE_BYTES must be greater than 0".to_string());
        }
        if self.vision.timeout_secs == 0 {
            return Err("PROVIDER_TIMEOUT_SECS must be greater than 0".to_string());
        }
        if self.store.timeout_secs == 0 {
            return Err("STORE_TIMEOUT_SECS must be greater than 0".to_string());
        }
        if self.vision.default_provider.trim().is_empty() {
            return Err("VAULT_DEFAULT_PROVIDER must not be empty".to_string());
        }
        if !self.store.url.starts_with("http://") && !self.store.url.starts_with("https://") {
            return Err(format!("STORE_URL must be an http(s) URL, got '{}'", self.store.url));
        }
        Ok(())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
                max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            },
            data_dir: PathBuf::from("./data"),
            vision: VisionConfig {
                default_provider: "openai".to_string(),
                enable_mock: false,
                openai: None,
                grok: None,
                timeout_secs: 60,
            },
            store: StoreConfig {
                url: "http://localhost:5522".to_string(),
                api_key: None,
                network: StoreNetwork::Calibration,
                timeout_secs: 30,
            },
        }
    }
}
