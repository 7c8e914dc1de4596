use super::identity::{Address, AssetId, ProjectId, SinkHandle};
use crate::error::DelegateError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A non-negative amount of some asset.
///
/// Zero is allowed: the upstream protocol notifies delegates of zero-value
/// payments too, and they are forwarded like any other.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, DelegateError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(DelegateError::ValidationError(
                "Amount must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DelegateError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

// Sums of non-negative amounts stay non-negative.
impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Notification of a payment that was received on behalf of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundPayment {
    /// Account that made the payment.
    pub payer: Address,
    /// Project the payment was made on behalf of.
    pub project: ProjectId,
    pub amount: Amount,
    pub asset: AssetId,
    /// Account credited with whatever the recipient issues in return.
    pub beneficiary: Address,
    pub memo: Option<String>,
    pub metadata: Option<Vec<u8>>,
}

/// Outbound request relaying an [`InboundPayment`] to a selected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardInstruction {
    pub recipient: ProjectId,
    pub amount: Amount,
    pub asset: AssetId,
    pub beneficiary: Address,
    pub memo: Option<String>,
    pub metadata: Option<Vec<u8>>,
}

impl ForwardInstruction {
    /// Readdresses a payment to `recipient`, carrying the full amount.
    pub fn relay(payment: InboundPayment, recipient: ProjectId) -> Self {
        Self {
            recipient,
            amount: payment.amount,
            asset: payment.asset,
            beneficiary: payment.beneficiary,
            memo: payment.memo,
            metadata: payment.metadata,
        }
    }
}

/// Proof of a delivered forward, as reported by the payment sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardReceipt {
    pub recipient: ProjectId,
    pub sink: SinkHandle,
    pub amount: Amount,
    pub asset: AssetId,
    pub beneficiary: Address,
    pub memo: Option<String>,
}
