//! CLI argument definitions for the Solace application.
//!
//! Uses `clap` with derive macros for argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use solace_core::config::SolaceConfig;
use solace_core::types::{Language, Partition};

/// Solace: scripture passages for how you feel, in your language.
#[derive(Parser, Debug)]
#[command(name = "solace", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Partition to draw passages from (e.g. mahabharata, quran, bible).
    #[arg(short = 'p', long = "partition", global = true)]
    pub partition: Option<Partition>,

    /// Reply language code (en, hi, te, ur).
    #[arg(short = 'l', long = "language", global = true)]
    pub language: Option<Language>,

    /// Data directory holding the snapshot cache.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Skip the translation service and reply untranslated.
    #[arg(long = "no-translate", global = true)]
    pub no_translate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive conversation on stdin (the default).
    Chat,
    /// Ask a single question and print the reply.
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Prime the local cache for the active partition.
    Prefetch,
    /// List the available partitions.
    Partitions,
}

impl CliArgs {
    /// Subcommand to run; `chat` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SOLACE_CONFIG env var > ~/.solace/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SOLACE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Priority: --partition flag > `chat.default_partition`.
    pub fn resolve_partition(&self, config: &SolaceConfig) -> Partition {
        self.partition.unwrap_or(config.chat.default_partition)
    }

    /// Priority: --language flag > `chat.default_language`.
    pub fn resolve_language(&self, config: &SolaceConfig) -> Language {
        self.language.unwrap_or(config.chat.default_language)
    }

    /// Resolve the data directory, expanding a leading `~`.
    ///
    /// Priority: --data-dir flag > `general.data_dir`.
    pub fn resolve_data_dir(&self, config: &SolaceConfig) -> PathBuf {
        match self.data_dir {
            Some(ref p) => expand_home(&p.to_string_lossy()),
            None => expand_home(&config.general.data_dir),
        }
    }

    /// Priority: --log-level flag > `general.log_level`.
    pub fn resolve_log_level(&self, config: &SolaceConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }
}

fn home_dir() -> Option<String> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var(var).ok()
}

/// Expand `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => PathBuf::from(home_dir().unwrap_or_else(|| ".".to_string())).join(rest),
        None => PathBuf::from(path),
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => PathBuf::from(home).join(".solace").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}
