#![allow(dead_code)]

use paydelegate::application::router::PaymentRouter;
use paydelegate::domain::identity::{Address, AssetId, ProjectId};
use paydelegate::domain::payment::{Amount, InboundPayment};
use paydelegate::domain::ports::EntropySourceBox;
use paydelegate::domain::registry::Registry;
use paydelegate::infrastructure::in_memory::{
    InMemoryDirectory, InMemoryPaymentSink, InMemoryRegistryStore,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const HEADER: &str = "type, caller, project, amount, asset, beneficiary, memo";
pub const OPERATOR: &str = "owner";

pub fn terminal_of(project: u64) -> Address {
    Address::new(format!("terminal-{}", project))
}

/// An in-memory delegate bound to `home` with `candidates` registered, each
/// candidate reachable through its own ETH terminal.
pub struct Harness {
    pub registry: Arc<Registry>,
    pub directory: InMemoryDirectory,
    pub sink: InMemoryPaymentSink,
}

impl Harness {
    pub async fn new(home: u64, candidates: &[u64]) -> Self {
        let directory = InMemoryDirectory::new();
        directory
            .approve_terminal(ProjectId::new(home), terminal_of(home))
            .await;
        directory
            .approve_operator(ProjectId::new(home), Address::from(OPERATOR))
            .await;

        let registry = Arc::new(Registry::new(Box::new(InMemoryRegistryStore::new())));
        registry
            .initialize(ProjectId::new(home), Arc::new(directory.clone()))
            .await
            .unwrap();

        let harness = Self {
            registry,
            directory,
            sink: InMemoryPaymentSink::new(),
        };
        for &candidate in candidates {
            harness.add_candidate(candidate).await;
        }
        harness
    }

    pub async fn add_candidate(&self, candidate: u64) {
        self.registry
            .add_candidate(&Address::from(OPERATOR), ProjectId::new(candidate))
            .await
            .unwrap();
        self.sink
            .set_primary(
                ProjectId::new(candidate),
                AssetId::from("ETH"),
                terminal_of(candidate),
            )
            .await;
    }

    pub fn router(&self, entropy: EntropySourceBox) -> PaymentRouter {
        PaymentRouter::new(self.registry.clone(), Box::new(self.sink.clone()), entropy)
    }
}

pub fn payment(project: u64, amount: Decimal) -> InboundPayment {
    InboundPayment {
        payer: Address::from("payer"),
        project: ProjectId::new(project),
        amount: Amount::new(amount).unwrap(),
        asset: AssetId::from("ETH"),
        beneficiary: Address::from("beneficiary"),
        memo: None,
        metadata: None,
    }
}

/// Event rows that bind a delegate to `home` and register `candidates`.
pub fn setup_rows(home: u64, candidates: &[u64]) -> Vec<String> {
    let mut rows = vec![
        format!("terminal, terminal-{home}, {home}, , ETH, , "),
        format!("operator, {OPERATOR}, {home}, , , , "),
        format!("initialize, , {home}, , , , "),
    ];
    for candidate in candidates {
        rows.push(format!("terminal, terminal-{candidate}, {candidate}, , ETH, , "));
        rows.push(format!("candidate, {OPERATOR}, {candidate}, , , , "));
    }
    rows
}

pub fn events_file(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

pub fn generate_payments(path: &Path, home: u64, candidates: &[u64], payments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["type", "caller", "project", "amount", "asset", "beneficiary", "memo"])?;
    for row in setup_rows(home, candidates) {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        wtr.write_record(&fields)?;
    }

    let terminal = format!("terminal-{}", home);
    let project = home.to_string();
    for i in 1..=payments {
        let memo = i.to_string();
        wtr.write_record([
            "pay",
            terminal.as_str(),
            project.as_str(),
            "1.0",
            "ETH",
            "payer",
            memo.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
