//! CLI for the splitfetch chunked downloader.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use splitfetch_core::config;

use commands::{run_get, show_config, GetRequest};

/// Top-level CLI for splitfetch.
#[derive(Debug, Parser)]
#[command(name = "splitfetch")]
#[command(about = "splitfetch: fetch one file over HTTP in concurrent byte ranges", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a file by splitting it into concurrent range requests.
    Get {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Directory to write the file into (default: current directory).
        #[arg(long, short = 'd', value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Number of byte ranges fetched concurrently (overrides config).
        #[arg(long, short = 'n', value_name = "N")]
        parts: Option<usize>,

        /// Maximum attempts per part, including the first (overrides config).
        #[arg(long, value_name = "R")]
        retries: Option<u32>,

        /// Deadline for the whole download in seconds (overrides config).
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Extra request header, repeatable: -H "Authorization: Bearer x".
        #[arg(long = "header", short = 'H', value_name = "NAME: VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Show the config file location and effective settings.
    Config,
}

/// Splits `Name: value` into a trimmed pair.
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `NAME: VALUE`, got `{}`", raw))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("invalid header name in `{}`", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                url,
                dest,
                parts,
                retries,
                timeout,
                headers,
            } => {
                let dest = match dest {
                    Some(d) => d,
                    None => std::env::current_dir()?,
                };
                let request = GetRequest {
                    url,
                    dest,
                    parts,
                    retries,
                    timeout_secs: timeout,
                    headers,
                };
                run_get(&cfg, request).await?;
            }
            CliCommand::Config => show_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
