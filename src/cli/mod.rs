// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod recovery;
pub mod serve;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// AI Proof Vault
#[derive(Parser, Debug)]
#[command(name = "ai-proof-vault")]
#[command(version)]
#[command(about = "Issue and verify AI-described proofs of image content", long_about = None)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Print the fingerprint of an image file
    Fingerprint(recovery::FingerprintArgs),

    /// Write an index entry for a record already in the content store
    Recover(recovery::RecoverArgs),

    /// Show the index entry for a fingerprint
    Lookup(recovery::LookupArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        None => serve::run(serve::ServeArgs::default()).await,
        Some(Commands::Serve(args)) => serve::run(args).await,
        Some(Commands::Fingerprint(args)) => recovery::print_fingerprint(args),
        Some(Commands::Recover(args)) => recovery::recover(args).await,
        Some(Commands::Lookup(args)) => recovery::lookup(args).await,
    }
}
