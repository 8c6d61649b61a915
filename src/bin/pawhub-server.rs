// ABOUTME: PawHub API server binary
// ABOUTME: Loads configuration, migrates the database and serves HTTP until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

#![recursion_limit = "256"]

//! # PawHub Server Binary
//!
//! Configuration comes from the environment; the flags below override the
//! listen port and database location for local runs.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pawhub_server::{
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    logging,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pawhub-server")]
#[command(about = "PawHub - pet grooming marketplace API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database location (`sqlite:path` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url)?;
    }
    config.validate()?;

    logging::init_from_env()?;
    info!("Starting PawHub API");
    info!("{}", config.summary());

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database ready: {}", config.database.url);

    let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
