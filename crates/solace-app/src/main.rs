//! Solace application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Open the SQLite snapshot cache
//! 3. Wire the remote content store, repository, and translator
//! 4. Run the requested subcommand against one conversation session

mod cli;
mod repl;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use solace_chat::{
    AnswerComposer, ConversationOrchestrator, HuggingFaceTranslator, PassthroughTranslator,
    Translator,
};
use solace_content::{ContentRepository, HttpContentStore};
use solace_core::config::SolaceConfig;
use solace_core::types::{Partition, SnapshotOrigin};
use solace_storage::{Database, SqliteContentCache};

use cli::{CliArgs, Command};

fn print_partitions() {
    for partition in Partition::ALL {
        println!("{:<16} {}", partition.as_str(), partition.display_name());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = SolaceConfig::load_or_default(&config_file);

    // Tracing. RUST_LOG wins over the configured level; logs go to stderr.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), path = %config_file.display(), "Starting Solace");

    let command = args.command();
    if command == Command::Partitions {
        print_partitions();
        return Ok(());
    }

    // Storage.
    let data_dir = args.resolve_data_dir(&config);
    let db_path = data_dir.join("cache.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "Snapshot cache opened");
    let cache = Arc::new(SqliteContentCache::new(db));

    // Content.
    let store = Arc::new(HttpContentStore::new(
        config.content.base_url.clone(),
        Duration::from_millis(config.content.timeout_ms),
    )?);
    if store.base_url().is_none() {
        tracing::warn!("No content.base_url configured, serving from the local cache only");
    }
    let repository = Arc::new(ContentRepository::from_config(
        store,
        cache,
        &config.content,
    ));

    // Translation.
    let translator: Arc<dyn Translator> = if args.no_translate {
        Arc::new(PassthroughTranslator)
    } else {
        let hf = HuggingFaceTranslator::from_config(&config.translation)?;
        if !hf.is_enabled() {
            tracing::info!("No translation token configured, replies stay untranslated");
        }
        Arc::new(hf)
    };
    let composer = Arc::new(AnswerComposer::new(
        translator,
        Duration::from_millis(config.translation.timeout_ms),
    ));

    let mut session = ConversationOrchestrator::new(
        repository,
        composer,
        args.resolve_partition(&config),
        args.resolve_language(&config),
    );

    match command {
        Command::Chat => repl::run(&mut session).await?,
        Command::Ask { text } => match session.submit(&text.join(" ")).await {
            Some(reply) => println!("{}", reply.text),
            None => tracing::warn!("Nothing to ask"),
        },
        Command::Prefetch => {
            let snapshot = session.prime().await;
            let origin = match snapshot.origin {
                SnapshotOrigin::Remote => "remote",
                SnapshotOrigin::Cache => "cache",
            };
            println!(
                "{}: {} passages ({})",
                snapshot.partition.display_name(),
                snapshot.passages.len(),
                origin
            );
        }
        Command::Partitions => print_partitions(),
    }

    Ok(())
}
