use crate::domain::capability::Capability;
use crate::domain::identity::Address;
use crate::domain::payment::{ForwardInstruction, ForwardReceipt, InboundPayment};
use crate::domain::ports::{EntropySourceBox, PaymentSinkBox};
use crate::domain::registry::Registry;
use crate::error::{DelegateError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Forwards every payment received by the home project to one random candidate.
///
/// `PaymentRouter` keeps no state of its own: the candidate pool lives in the
/// shared [`Registry`], the downstream transfer in the injected sink. A call
/// either delivers the whole received amount to a single candidate or fails
/// without having changed anything.
pub struct PaymentRouter {
    registry: Arc<Registry>,
    sink: PaymentSinkBox,
    entropy: EntropySourceBox,
}

impl PaymentRouter {
    /// Creates a new `PaymentRouter`.
    ///
    /// # Arguments
    ///
    /// * `registry` - The registry holding the home identity and candidates.
    /// * `sink` - Where forwards are delivered.
    /// * `entropy` - Drives candidate selection.
    pub fn new(registry: Arc<Registry>, sink: PaymentSinkBox, entropy: EntropySourceBox) -> Self {
        Self {
            registry,
            sink,
            entropy,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Handles a payment that `caller` just received on behalf of a project.
    ///
    /// `caller` must be an approved payment channel of the home project and
    /// the payment must target the home project. The forward to the selected
    /// candidate is the last step; nothing is written after it.
    pub async fn on_payment_received(
        &self,
        caller: &Address,
        payment: InboundPayment,
    ) -> Result<ForwardReceipt> {
        let Some((home, authorization)) = self.registry.bound_home().await else {
            warn!(%caller, project = %payment.project, "Payment received before initialization");
            return Err(DelegateError::UnauthorizedPaymentEvent(
                "Delegate is not bound to a project".to_string(),
            ));
        };

        if payment.project != home {
            warn!(%caller, %home, project = %payment.project, "Payment for a foreign project");
            return Err(DelegateError::UnauthorizedPaymentEvent(format!(
                "Payment targets project {} but delegate acts for {}",
                payment.project, home
            )));
        }

        if !authorization.is_approved_sink(home, caller).await? {
            warn!(%caller, %home, "Payment from an unapproved terminal");
            return Err(DelegateError::UnauthorizedPaymentEvent(format!(
                "{} is not a terminal of project {}",
                caller, home
            )));
        }

        let candidate = self
            .registry
            .pick_random_candidate(self.entropy.as_ref())
            .await?;

        let sink = self
            .sink
            .primary_sink_of(candidate, &payment.asset)
            .await
            .map_err(into_forward_failure)?;

        let value = payment.amount;
        let instruction = ForwardInstruction::relay(payment, candidate);
        let receipt = self
            .sink
            .forward(&sink, instruction, value)
            .await
            .map_err(into_forward_failure)?;

        info!(
            %home,
            recipient = %receipt.recipient,
            sink = %receipt.sink,
            amount = %receipt.amount,
            asset = %receipt.asset,
            "Payment forwarded"
        );
        Ok(receipt)
    }

    /// Whether this instance implements `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        &Capability::ALL
    }
}

fn into_forward_failure(error: DelegateError) -> DelegateError {
    match error {
        DelegateError::ForwardFailed(_) => error,
        other => DelegateError::ForwardFailed(other.to_string()),
    }
}
