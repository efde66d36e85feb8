// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Operator commands for the local index
//!
//! `recover` re-links a record that reached the content store when the index
//! write failed (the address is in the `index_persist_failure` response and
//! in the error log). `lookup` shows what the index currently holds.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::VaultConfig;
use crate::fingerprint::Fingerprint;
use crate::proof::ProofRecord;
use crate::storage::{
    ContentAddress, ContentStore, IndexEntry, LocalIndex, SqliteIndex, StoreBridgeClient,
};

/// Arguments for the fingerprint command
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Image file to hash
    #[arg(long)]
    pub image: PathBuf,
}

/// Arguments for the recover command
#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// Fingerprint of the image (64 lowercase hex characters)
    #[arg(long)]
    pub fingerprint: Fingerprint,

    /// Content address reported by the failed generate
    #[arg(long)]
    pub address: String,

    /// Unix seconds; defaults to the record's own created_at
    #[arg(long)]
    pub created_at: Option<i64>,

    /// Write the entry without fetching the record first
    #[arg(long)]
    pub skip_check: bool,

    /// Directory holding vault.db
    #[arg(long, env = "VAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Arguments for the lookup command
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Fingerprint to look up
    #[arg(long)]
    pub fingerprint: Fingerprint,

    /// Directory holding vault.db
    #[arg(long, env = "VAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

fn open_index(data_dir: Option<PathBuf>) -> Result<SqliteIndex> {
    let mut config = VaultConfig::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    let path = config.index_path();
    if !path.exists() {
        bail!("no index at {}", path.display());
    }
    SqliteIndex::open(&path).with_context(|| format!("failed to open index {}", path.display()))
}

pub fn print_fingerprint(args: FingerprintArgs) -> Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    if bytes.is_empty() {
        bail!("{} is empty", args.image.display());
    }
    println!("{}", Fingerprint::of(&bytes));
    Ok(())
}

/// Build the entry to write, checking the stored record when a store is given
///
/// With a store, the record at `address` must decode and carry `fingerprint`;
/// its `created_at` is used unless one is supplied.
pub async fn prepare_recovery(
    store: Option<&dyn ContentStore>,
    fingerprint: Fingerprint,
    address: ContentAddress,
    created_at: Option<i64>,
) -> Result<IndexEntry> {
    let created_at = match store {
        Some(store) => {
            let bytes = store.get(&address).await.map_err(|e| {
                anyhow!(
                    "could not fetch {} to check it ({}); retry later or pass --skip-check",
                    address,
                    e
                )
            })?;
            let record = ProofRecord::from_bytes(&bytes)
                .with_context(|| format!("{} does not hold a proof record", address))?;
            if !record.matches(&fingerprint) {
                bail!(
                    "record at {} was issued for {}, not {}",
                    address,
                    record.fingerprint,
                    fingerprint
                );
            }
            created_at.unwrap_or(record.created_at)
        }
        None => created_at.unwrap_or_else(|| chrono::Utc::now().timestamp()),
    };

    Ok(IndexEntry {
        fingerprint,
        address,
        created_at,
    })
}

pub async fn recover(args: RecoverArgs) -> Result<()> {
    let index = open_index(args.data_dir)?;
    let address = ContentAddress::new(args.address);

    let store = if args.skip_check {
        warn!("Skipping record check for {}", address);
        None
    } else {
        Some(StoreBridgeClient::new(&VaultConfig::from_env().store)?)
    };

    let entry = prepare_recovery(
        store.as_ref().map(|s| s as &dyn ContentStore),
        args.fingerprint,
        address,
        args.created_at,
    )
    .await?;

    if let Some(previous) = index.lookup(&entry.fingerprint).await? {
        warn!(
            "Replacing existing entry {} -> {}",
            previous.fingerprint.short(),
            previous.address
        );
    }

    index.upsert(entry.clone()).await?;
    info!(
        fingerprint = %entry.fingerprint,
        address = %entry.address,
        created_at = entry.created_at,
        "Index entry recovered"
    );
    println!("{}", serde_json::to_string_pretty(&entry)?);
    Ok(())
}

pub async fn lookup(args: LookupArgs) -> Result<()> {
    let index = open_index(args.data_dir)?;
    match index.lookup(&args.fingerprint).await? {
        Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
        None => println!("no entry for {}", args.fingerprint),
    }
    Ok(())
}
