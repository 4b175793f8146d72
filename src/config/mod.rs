pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "quote-sync")]
#[command(about = "Manage a collection of quotes and keep it in sync with a server")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding persisted quotes
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Remote endpoint used for sync
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Seconds between sync cycles
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Interactive session with periodic sync (default)
    Run {
        /// Do not start the periodic sync
        #[arg(long)]
        no_sync: bool,
    },
    /// Show a random quote
    Show {
        /// Only pick from this category ("all" for every category)
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a new quote
    Add { text: String, category: String },
    /// List categories
    Categories,
    /// Select the category used by `show` and `run`
    Filter { category: String },
    /// Write quotes.json into a directory
    Export {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Append quotes from a JSON file
    Import { file: PathBuf },
    /// Sync once with the server
    Sync {
        /// Ask before overwriting a local quote
        #[arg(long)]
        confirm: bool,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut toml_config::AppConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.sync.endpoint = endpoint.clone();
        }
        if let Some(interval) = self.interval {
            config.sync.interval_seconds = interval;
        }
    }
}
