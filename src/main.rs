use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paydelegate::domain::ports::{AuthorizationSourceRef, EntropySourceBox};
use paydelegate::domain::registry::Registry;
use paydelegate::infrastructure::entropy::{OsEntropy, SeededEntropy};
use paydelegate::infrastructure::in_memory::{
    InMemoryDirectory, InMemoryPaymentSink, InMemoryRegistryStore,
};
#[cfg(feature = "storage-rocksdb")]
use paydelegate::infrastructure::rocksdb::RocksDBStore;
use paydelegate::interfaces::csv::event_reader::EventReader;
use paydelegate::interfaces::csv::forward_writer::ForwardWriter;
use paydelegate::interfaces::replay::Replayer;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input events CSV file
    input: PathBuf,

    /// Seed for reproducible candidate selection. Uses OS randomness if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let directory = InMemoryDirectory::new();
    let registry = Arc::new(open_registry(cli.db_path.as_deref(), &directory).await?);

    let entropy: EntropySourceBox = match cli.seed {
        Some(seed) => Box::new(SeededEntropy::new(seed)),
        None => Box::new(OsEntropy),
    };

    let replayer = Replayer::new(registry, directory, InMemoryPaymentSink::new(), entropy);
    let capabilities: Vec<&str> = replayer
        .router()
        .capabilities()
        .iter()
        .map(|c| c.as_str())
        .collect();
    info!(?capabilities, "Delegate ready");

    // Replay events
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = EventReader::new(file);
    let mut forwards = Vec::new();
    for event_result in reader.events() {
        match event_result {
            Ok(event) => match replayer.apply(event).await {
                Ok(Some(receipt)) => forwards.push(receipt),
                Ok(None) => {}
                Err(e) => error!("Error processing event: {}", e),
            },
            Err(e) => error!("Error reading event: {}", e),
        }
    }

    // Output delivered forwards
    let stdout = io::stdout();
    let mut writer = ForwardWriter::new(stdout.lock());
    writer.write_forwards(&forwards).into_diagnostic()?;

    Ok(())
}

async fn open_registry(db_path: Option<&Path>, directory: &InMemoryDirectory) -> Result<Registry> {
    let authorization: AuthorizationSourceRef = Arc::new(directory.clone());

    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Registry::restore(Box::new(store), authorization)
                .await
                .into_diagnostic()
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Registry::restore(Box::new(InMemoryRegistryStore::new()), authorization)
                .await
                .into_diagnostic()
        }
        None => Registry::restore(Box::new(InMemoryRegistryStore::new()), authorization)
            .await
            .into_diagnostic(),
    }
}
