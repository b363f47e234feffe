//! embed CLI - fetch, extract and cache fragments of remote HTML
//!
//! The binary in `main.rs` only calls [`run`]; argument parsing, logging
//! setup and command dispatch live here so they can be tested.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use embed_core::{Config, ContentService};
use std::io;

mod cli;
mod commands;
mod utils;

use cli::{Cli, Commands, OutputFormat};
use utils::initialize_logging;

/// Execute the embed CLI with the currently configured environment.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or resolved, the cache
/// is unusable, or writing output fails. Upstream failures are not errors.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let config = Config::load(cli.config.as_deref())?;
    let service = ContentService::from_config(config)?;

    execute_command(&service, cli.command).await
}

async fn execute_command(service: &ContentService, command: Commands) -> Result<()> {
    let stdout = io::stdout();
    match command {
        Commands::Request {
            path,
            selector,
            base_url,
            params,
            format,
        } => {
            let request = commands::build_request(&path, &selector, &base_url, &params);
            let content =
                commands::request_content(service, &request, format, stdout.lock()).await?;
            if format == OutputFormat::Text {
                for warning in &content.warnings {
                    eprintln!("{} {warning}", "warning:".yellow());
                }
            }
        },

        Commands::Forget {
            path,
            selector,
            base_url,
        } => {
            commands::forget_content(service, &path, &selector, &base_url, stdout.lock())?;
        },

        Commands::Flush { tag } => {
            commands::flush_cache(service, tag.as_deref(), stdout.lock())?;
        },
    }

    Ok(())
}
