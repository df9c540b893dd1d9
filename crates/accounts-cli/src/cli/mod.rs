//! CLI for the accounts API client.

mod commands;

use accounts_core::config::{self, ApiConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config, run_create, run_delete, run_digest, run_fetch};

/// Top-level CLI for the accounts API client.
#[derive(Debug, Parser)]
#[command(name = "accounts")]
#[command(about = "accounts: resilient client for the accounts API", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/accounts/config.toml.
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "from_env")]
    pub config: Option<PathBuf>,

    /// Take BASE_URL and ACCOUNT_PATH from the environment.
    #[arg(long, global = true)]
    pub from_env: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch an account by ID and print it.
    Fetch {
        /// Account identifier.
        id: String,
    },

    /// Create an account from a JSON document.
    Create {
        /// Path to the JSON document.
        path: PathBuf,
    },

    /// Delete an account at a given version.
    Delete {
        /// Account identifier.
        id: String,
        /// Current version of the account (optimistic concurrency).
        #[arg(long)]
        version: u64,
    },

    /// Print the Digest header value for a file's bytes.
    Digest {
        /// Path to the file.
        path: PathBuf,
    },

    /// Show where configuration comes from and its effective values.
    Config,
}

/// Where the configuration was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Environment,
    File(PathBuf),
}

impl Cli {
    pub fn load_config(&self) -> Result<(ApiConfig, ConfigSource)> {
        if self.from_env {
            return Ok((ApiConfig::from_env()?, ConfigSource::Environment));
        }
        match &self.config {
            Some(path) => Ok((config::load_from(path)?, ConfigSource::File(path.clone()))),
            None => {
                let path = config::config_path()?;
                Ok((config::load_or_init()?, ConfigSource::File(path)))
            }
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // digest needs no API configuration
        if let CliCommand::Digest { path } = &cli.command {
            return run_digest(path).await;
        }

        let (cfg, source) = cli.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { id } => run_fetch(cfg, id).await?,
            CliCommand::Create { path } => run_create(cfg, &path).await?,
            CliCommand::Delete { id, version } => run_delete(cfg, id, version).await?,
            CliCommand::Config => run_config(&cfg, &source)?,
            CliCommand::Digest { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
