//! Configuration for listprune

use clap::{Args, Parser, Subcommand};
use listprune_core::DEFAULT_PAGE_SIZE;
use listprune_klaviyo::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_REVISION};
use std::path::PathBuf;
use std::time::Duration;

/// listprune - reconcile Klaviyo lists and delete the leftover profiles
#[derive(Parser, Debug, Clone)]
#[command(name = "listprune")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Klaviyo private API key
    #[arg(long, env = "KLAVIYO_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Klaviyo API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Klaviyo API revision header
    #[arg(long, default_value = DEFAULT_REVISION)]
    pub api_revision: String,

    /// Directory for membership records and the work queue
    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Work queue file, relative to the data directory
    #[arg(long, default_value = "unique_master_profiles.csv")]
    pub queue_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log format (json or pretty)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch list memberships and write the work queue
    Collect(CollectArgs),
    /// Delete every profile in the work queue
    Delete(DeleteArgs),
    /// Collect, then delete
    Run {
        #[command(flatten)]
        collect: CollectArgs,
        #[command(flatten)]
        delete: DeleteArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    /// Lists whose members are deletion candidates (comma-separated)
    #[arg(long, env = "LISTPRUNE_REFERENCE_LISTS", value_delimiter = ',')]
    pub reference_lists: Vec<String>,

    /// Lists whose members must be kept (comma-separated)
    #[arg(long, env = "LISTPRUNE_EXCLUSION_LISTS", value_delimiter = ',')]
    pub exclusion_lists: Vec<String>,

    /// Profiles requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Minimum delay after each answered deletion request (milliseconds)
    #[arg(long, default_value = "1020")]
    pub min_interval_ms: u64,
}

impl DeleteArgs {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("API key cannot be empty");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!("Unknown log format '{}', expected json or pretty", self.log_format);
        }
        match &self.command {
            Command::Collect(collect) | Command::Run { collect, .. } => collect.validate(),
            Command::Delete(_) => Ok(()),
        }
    }

    /// Work queue location
    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join(&self.queue_file)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_revision(self.api_revision.clone())
    }
}

impl CollectArgs {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 || self.page_size > DEFAULT_PAGE_SIZE {
            anyhow::bail!("Page size must be between 1 and {}", DEFAULT_PAGE_SIZE);
        }
        let mut all = self.reference_lists.iter().chain(&self.exclusion_lists);
        if all.any(|id| id.trim().is_empty()) {
            anyhow::bail!("List identifiers cannot be empty");
        }
        Ok(())
    }
}
