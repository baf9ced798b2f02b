//! CLI entry point for the docraptor tool.

use anyhow::Result;
use clap::Parser;
use docraptor::{ClientConfig, DocRaptor};
use tracing::debug;

mod cli;
mod commands;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries document bytes and JSON.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, "CLI arguments parsed");

    let config = match args.base_url.as_deref() {
        Some(base_url) => ClientConfig::new(base_url)?,
        None => ClientConfig::from_env()?,
    };
    let client = DocRaptor::new(config)?;
    if let Some(key) = args.api_key.as_deref() {
        client.api_key(Some(key))?;
    }

    match &args.command {
        Command::Create(create) => commands::run_create_command(&client, create).await,
        Command::List(list) => commands::run_list_command(&client, list).await,
        Command::Status(status) => commands::run_status_command(&client, status).await,
        Command::Download(download) => commands::run_download_command(&client, download).await,
    }
}
