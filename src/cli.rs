//! Command-line interface for the lookup cache
//!
//! Parses arguments with clap and runs the selected command against a shared
//! [`TtlCache`] backed by the on-disk store.

use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::cache::TtlCache;
use crate::config::{Config, DEFAULT_API_URL};
use crate::consumers::{find_by_dial_code, ApiError, BankClient, CountryClient};

/// Error types for running CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// No cache directory given and none could be derived from the environment
    #[error("Cannot determine a cache directory; pass --cache-dir or set AMBUCACHE_CACHE_DIR")]
    NoCacheDir,

    /// Lookup against the backend failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Writing command output failed
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Cached bank and country lookups for the ambulance network dashboard
#[derive(Parser, Debug)]
#[command(name = "ambucache")]
#[command(about = "Cached bank and country lookups for the ambulance network dashboard")]
#[command(version)]
pub struct Cli {
    /// Base URL of the dashboard backend
    #[arg(long, global = true, env = "AMBUCACHE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory for the persistent cache (defaults to the XDG cache dir)
    #[arg(long, global = true, env = "AMBUCACHE_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List banks for a country
    Banks {
        /// Country name, e.g. "nigeria"
        country: String,

        #[command(flatten)]
        refresh: RefreshArgs,
    },

    /// List countries and their dialing codes
    Countries {
        /// Only show countries using this dialing code, e.g. "+234"
        #[arg(long, value_name = "CODE")]
        dial_code: Option<String>,

        #[command(flatten)]
        refresh: RefreshArgs,
    },

    /// Inspect or reset the cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct RefreshArgs {
    /// Ignore cached data and fetch from the backend
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Remove one cache entry by key, e.g. "bank_cache_v2_nigeria"
    Evict { key: String },

    /// Remove every cache entry
    Clear,
}

impl Cli {
    /// Derives runtime configuration from the parsed arguments
    pub fn config(&self) -> Config {
        Config {
            api_url: self.api_url.clone(),
            cache_dir: self.cache_dir.clone(),
            request_timeout: Duration::from_secs(self.timeout),
        }
    }
}

/// Runs the parsed command, writing results to `out`
pub async fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    let config = cli.config();
    let store = config.file_store().ok_or(CliError::NoCacheDir)?;
    debug!(dir = %store.dir().display(), api_url = %config.api_url, "using cache");

    let cache = Arc::new(TtlCache::new(Arc::new(store)));

    match &cli.command {
        Command::Banks { country, refresh } => {
            let client = BankClient::new(http_client(&config)?, cache, &config.api_url);
            let banks = client.fetch_banks(country, refresh.refresh).await?;
            for bank in &banks {
                writeln!(out, "{}\t{}\t{}", bank.id, bank.code, bank.name)?;
            }
        }
        Command::Countries { dial_code, refresh } => {
            let client = CountryClient::new(http_client(&config)?, cache, &config.api_url);
            let countries = client.fetch_countries(refresh.refresh).await?;
            let shown: Vec<_> = match dial_code {
                Some(code) => find_by_dial_code(&countries, code),
                None => countries.iter().collect(),
            };
            for country in shown {
                writeln!(out, "{}\t{}\t{}", country.iso2, country.dial_code, country.name)?;
            }
        }
        Command::Cache(CacheCommand::Evict { key }) => {
            cache.evict(key);
            writeln!(out, "Evicted {}", key)?;
        }
        Command::Cache(CacheCommand::Clear) => {
            cache.clear();
            writeln!(out, "Cache cleared")?;
        }
    }

    Ok(())
}

fn http_client(config: &Config) -> Result<reqwest::Client, ApiError> {
    Ok(config.http_client()?)
}
