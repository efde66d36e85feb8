// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{start_server, AppState};
use crate::config::VaultConfig;
use crate::proof::ProofEngine;
use crate::storage::{SqliteIndex, StoreBridgeClient};
use crate::version;
use crate::vision::ProviderRegistry;

/// Arguments for the serve command; unset flags fall back to the environment
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Directory holding vault.db
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn apply(self, config: &mut VaultConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(dir) = self.data_dir {
            config.data_dir = dir;
        }
    }
}

/// Wire the engine from configuration
///
/// Opens (and creates) the index database, builds every configured vision
/// backend and the store bridge client.
pub fn build_engine(config: &VaultConfig) -> Result<ProofEngine> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    let index = SqliteIndex::open(config.index_path())
        .with_context(|| format!("failed to open index {}", config.index_path().display()))?;
    let providers = ProviderRegistry::from_config(&config.vision)?;
    let store = StoreBridgeClient::new(&config.store)?;

    Ok(ProofEngine::new(
        Arc::new(index),
        Arc::new(providers),
        Arc::new(store),
    ))
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = VaultConfig::from_env();
    args.apply(&mut config);
    config.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;

    info!("Starting {}", version::get_version_string());
    info!(
        data_dir = %config.data_dir.display(),
        store = %config.store.url,
        network = config.store.network.as_str(),
        "Configuration loaded"
    );

    let engine = build_engine(&config)?;

    let providers = engine.providers().selectors();
    if providers.is_empty() {
        warn!("No vision providers configured; every generate request will be rejected");
    } else {
        info!(
            default = engine.providers().default_selector(),
            "Vision providers: {}",
            providers.join(", ")
        );
    }

    // Payment and account setup happen outside the service; only reachability is checked
    match engine.store_health().await {
        Ok(()) => info!("Content store reachable"),
        Err(e) => warn!("Content store not reachable at startup: {}", e),
    }

    match engine.index_size().await {
        Ok(n) => info!("Proof index holds {} entries", n),
        Err(e) => warn!("Could not count index entries: {}", e),
    }

    let state = AppState::new(Arc::new(engine), config.server.max_image_bytes);
    start_server(&config.server, state).await
}
