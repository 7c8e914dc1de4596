//! Data-source hooks consulted by the upstream protocol before it records a
//! payment or a redemption.

use super::router::PaymentRouter;
use crate::domain::identity::{Address, AssetId, ProjectId};
use crate::domain::payment::Amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What the protocol knows about a payment it is about to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayParamsRequest {
    pub terminal: Address,
    pub payer: Address,
    pub project: ProjectId,
    pub amount: Amount,
    pub asset: AssetId,
    /// Issuance weight of the current funding cycle.
    pub weight: Decimal,
    pub beneficiary: Address,
    pub memo: Option<String>,
    pub metadata: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayParams {
    pub weight: Decimal,
    pub memo: Option<String>,
    /// Whether the protocol should notify this instance once the payment
    /// is recorded.
    pub delegate: bool,
}

/// What the protocol knows about a redemption it is about to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemParamsRequest {
    pub terminal: Address,
    pub holder: Address,
    pub project: ProjectId,
    pub token_count: Decimal,
    pub reclaim_amount: Amount,
    pub asset: AssetId,
    pub beneficiary: Address,
    pub memo: Option<String>,
    pub metadata: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemParams {
    pub reclaim_amount: Amount,
    pub memo: Option<String>,
    pub delegate: bool,
}

impl PaymentRouter {
    /// Leaves weight and memo untouched and registers this instance as the
    /// payment's delegate.
    pub fn pay_params(&self, request: &PayParamsRequest) -> PayParams {
        PayParams {
            weight: request.weight,
            memo: request.memo.clone(),
            delegate: true,
        }
    }

    /// Redemptions pass through unchanged and are never delegated.
    pub fn redeem_params(&self, request: &RedeemParamsRequest) -> RedeemParams {
        RedeemParams {
            reclaim_amount: request.reclaim_amount,
            memo: request.memo.clone(),
            delegate: false,
        }
    }
}
