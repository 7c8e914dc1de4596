use super::identity::{Address, AssetId, ProjectId, SinkHandle};
use super::payment::{Amount, ForwardInstruction, ForwardReceipt};
use super::registry::RegistrySnapshot;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Decides which callers are trusted to act for a project.
#[async_trait]
pub trait AuthorizationSource: Send + Sync {
    /// Whether `caller` is a legitimate payment channel for `project`.
    async fn is_approved_sink(&self, project: ProjectId, caller: &Address) -> Result<bool>;

    /// Whether `caller` may alter the candidate pool of `project`.
    async fn can_manage_candidates(&self, project: ProjectId, caller: &Address) -> Result<bool>;
}

/// Locates and invokes the downstream transfer of a forward.
#[async_trait]
pub trait PaymentSink: Send + Sync {
    /// Returns the terminal `project` accepts `asset` through.
    async fn primary_sink_of(&self, project: ProjectId, asset: &AssetId) -> Result<SinkHandle>;

    /// Delivers `value` to `sink` along with `instruction`.
    async fn forward(
        &self,
        sink: &SinkHandle,
        instruction: ForwardInstruction,
        value: Amount,
    ) -> Result<ForwardReceipt>;
}

/// Supplies the values random selection is driven by.
pub trait EntropySource: Send + Sync {
    fn value(&self) -> u64;
}

impl<T: EntropySource + ?Sized> EntropySource for Arc<T> {
    fn value(&self) -> u64 {
        (**self).value()
    }
}

/// Durable backing for a registry's state.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Loads everything written so far; an empty snapshot if nothing was.
    async fn load(&self) -> Result<RegistrySnapshot>;
    async fn bind_home(&self, home: ProjectId) -> Result<()>;
    async fn append_candidate(&self, index: usize, candidate: ProjectId) -> Result<()>;
}

pub type AuthorizationSourceRef = Arc<dyn AuthorizationSource>;
pub type PaymentSinkBox = Box<dyn PaymentSink>;
pub type EntropySourceBox = Box<dyn EntropySource>;
pub type RegistryStoreBox = Box<dyn RegistryStore>;
