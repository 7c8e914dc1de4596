use crate::domain::payment::ForwardReceipt;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ForwardRow<'a> {
    recipient: u64,
    sink: &'a str,
    amount: String,
    asset: &'a str,
    beneficiary: &'a str,
    memo: &'a str,
}

impl<'a> From<&'a ForwardReceipt> for ForwardRow<'a> {
    fn from(receipt: &'a ForwardReceipt) -> Self {
        Self {
            recipient: receipt.recipient.value(),
            sink: receipt.sink.terminal().as_str(),
            amount: receipt.amount.to_string(),
            asset: receipt.asset.as_str(),
            beneficiary: receipt.beneficiary.as_str(),
            memo: receipt.memo.as_deref().unwrap_or_default(),
        }
    }
}

/// Writes delivered forwards as CSV.
pub struct ForwardWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ForwardWriter<W> {
    pub fn new(destination: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(destination);
        Self { writer }
    }

    /// Writes the header followed by one row per forward, then flushes.
    pub fn write_forwards<'a, I>(&mut self, forwards: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a ForwardReceipt>,
    {
        self.writer
            .write_record(["recipient", "sink", "amount", "asset", "beneficiary", "memo"])?;
        for receipt in forwards {
            self.writer.serialize(ForwardRow::from(receipt))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
