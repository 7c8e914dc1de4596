use crate::application::router::PaymentRouter;
use crate::domain::identity::{Address, AssetId, ProjectId};
use crate::domain::payment::{Amount, ForwardReceipt, InboundPayment};
use crate::domain::ports::EntropySourceBox;
use crate::domain::registry::Registry;
use crate::error::{DelegateError, Result};
use crate::infrastructure::in_memory::{InMemoryDirectory, InMemoryPaymentSink};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// `caller` becomes a terminal of `project` and its primary sink for `asset`.
    Terminal,
    /// `caller` may manage the candidates of `project`.
    Operator,
    Initialize,
    Candidate,
    /// `caller` is the terminal reporting the payment. Rows carry no payer
    /// column; the payer is taken to be the beneficiary, or the terminal when
    /// no beneficiary is given.
    Pay,
}

/// One row of an events file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Event {
    pub r#type: EventType,
    pub caller: Option<Address>,
    pub project: ProjectId,
    pub amount: Option<Decimal>,
    pub asset: Option<AssetId>,
    pub beneficiary: Option<Address>,
    pub memo: Option<String>,
}

/// Drives a delegate from a stream of events against in-memory collaborators.
pub struct Replayer {
    directory: InMemoryDirectory,
    sink: InMemoryPaymentSink,
    router: PaymentRouter,
}

impl Replayer {
    pub fn new(
        registry: Arc<Registry>,
        directory: InMemoryDirectory,
        sink: InMemoryPaymentSink,
        entropy: EntropySourceBox,
    ) -> Self {
        let router = PaymentRouter::new(registry, Box::new(sink.clone()), entropy);
        Self {
            directory,
            sink,
            router,
        }
    }

    pub fn router(&self) -> &PaymentRouter {
        &self.router
    }

    /// Applies one event, returning the receipt when it forwarded a payment.
    pub async fn apply(&self, event: Event) -> Result<Option<ForwardReceipt>> {
        match event.r#type {
            EventType::Terminal => {
                let terminal = required(event.caller, "caller")?;
                let asset = required(event.asset, "asset")?;
                self.directory
                    .approve_terminal(event.project, terminal.clone())
                    .await;
                self.sink.set_primary(event.project, asset, terminal).await;
                Ok(None)
            }
            EventType::Operator => {
                let operator = required(event.caller, "caller")?;
                self.directory.approve_operator(event.project, operator).await;
                Ok(None)
            }
            EventType::Initialize => {
                self.router
                    .registry()
                    .initialize(event.project, Arc::new(self.directory.clone()))
                    .await?;
                Ok(None)
            }
            EventType::Candidate => {
                let operator = required(event.caller, "caller")?;
                self.router
                    .registry()
                    .add_candidate(&operator, event.project)
                    .await?;
                Ok(None)
            }
            EventType::Pay => {
                let terminal = required(event.caller.clone(), "caller")?;
                let payment = inbound_payment(&terminal, event)?;
                let receipt = self.router.on_payment_received(&terminal, payment).await?;
                Ok(Some(receipt))
            }
        }
    }
}

fn inbound_payment(terminal: &Address, event: Event) -> Result<InboundPayment> {
    let amount = Amount::new(required(event.amount, "amount")?)?;
    let beneficiary = event.beneficiary.unwrap_or_else(|| terminal.clone());
    Ok(InboundPayment {
        payer: beneficiary.clone(),
        project: event.project,
        amount,
        asset: required(event.asset, "asset")?,
        beneficiary,
        memo: event.memo,
        metadata: None,
    })
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| DelegateError::ValidationError(format!("Missing {}", field)))
}
