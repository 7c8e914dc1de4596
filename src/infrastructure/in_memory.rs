use crate::domain::identity::{Address, AssetId, ProjectId, SinkHandle};
use crate::domain::payment::{Amount, ForwardInstruction, ForwardReceipt};
use crate::domain::ports::{AuthorizationSource, PaymentSink, RegistryStore};
use crate::domain::registry::RegistrySnapshot;
use crate::error::{DelegateError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct DirectoryState {
    terminals: HashMap<ProjectId, HashSet<Address>>,
    operators: HashMap<ProjectId, HashSet<Address>>,
}

/// A thread-safe in-memory project directory.
///
/// Records which terminals are payment channels of a project and which
/// accounts operate its delegate. `Clone` shares the underlying state.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn approve_terminal(&self, project: ProjectId, terminal: Address) {
        let mut state = self.state.write().await;
        state.terminals.entry(project).or_default().insert(terminal);
    }

    pub async fn revoke_terminal(&self, project: ProjectId, terminal: &Address) {
        let mut state = self.state.write().await;
        if let Some(terminals) = state.terminals.get_mut(&project) {
            terminals.remove(terminal);
        }
    }

    pub async fn approve_operator(&self, project: ProjectId, operator: Address) {
        let mut state = self.state.write().await;
        state.operators.entry(project).or_default().insert(operator);
    }
}

#[async_trait]
impl AuthorizationSource for InMemoryDirectory {
    async fn is_approved_sink(&self, project: ProjectId, caller: &Address) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .terminals
            .get(&project)
            .is_some_and(|terminals| terminals.contains(caller)))
    }

    async fn can_manage_candidates(&self, project: ProjectId, caller: &Address) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .operators
            .get(&project)
            .is_some_and(|operators| operators.contains(caller)))
    }
}

#[derive(Default)]
struct SinkState {
    primaries: HashMap<(ProjectId, AssetId), SinkHandle>,
    disabled: HashSet<SinkHandle>,
    delivered: Vec<ForwardReceipt>,
}

/// A thread-safe in-memory payment sink.
///
/// Resolves each project's primary terminal per asset and keeps a ledger of
/// every forward it accepted. Disabled terminals reject forwards, which is
/// how tests and replays model a failing downstream transfer.
#[derive(Default, Clone)]
pub struct InMemoryPaymentSink {
    state: Arc<RwLock<SinkState>>,
}

impl InMemoryPaymentSink {
    /// Creates a sink with no terminals configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_primary(&self, project: ProjectId, asset: AssetId, terminal: Address) {
        let mut state = self.state.write().await;
        state.primaries.insert((project, asset), SinkHandle(terminal));
    }

    pub async fn disable(&self, terminal: Address) {
        let mut state = self.state.write().await;
        state.disabled.insert(SinkHandle(terminal));
    }

    /// Every forward delivered so far, oldest first.
    pub async fn delivered(&self) -> Vec<ForwardReceipt> {
        self.state.read().await.delivered.clone()
    }

    /// Sum of everything delivered to `project`.
    pub async fn received_by(&self, project: ProjectId) -> Amount {
        let state = self.state.read().await;
        state
            .delivered
            .iter()
            .filter(|receipt| receipt.recipient == project)
            .map(|receipt| receipt.amount)
            .sum()
    }
}

#[async_trait]
impl PaymentSink for InMemoryPaymentSink {
    async fn primary_sink_of(&self, project: ProjectId, asset: &AssetId) -> Result<SinkHandle> {
        let state = self.state.read().await;
        state
            .primaries
            .get(&(project, asset.clone()))
            .cloned()
            .ok_or_else(|| {
                DelegateError::ForwardFailed(format!(
                    "Project {} has no terminal for {}",
                    project, asset
                ))
            })
    }

    async fn forward(
        &self,
        sink: &SinkHandle,
        instruction: ForwardInstruction,
        value: Amount,
    ) -> Result<ForwardReceipt> {
        let mut state = self.state.write().await;
        if state.disabled.contains(sink) {
            return Err(DelegateError::ForwardFailed(format!(
                "Terminal {} rejected the payment",
                sink
            )));
        }
        if value != instruction.amount {
            return Err(DelegateError::ForwardFailed(format!(
                "Attached value {} does not match instructed amount {}",
                value, instruction.amount
            )));
        }

        let receipt = ForwardReceipt {
            recipient: instruction.recipient,
            sink: sink.clone(),
            amount: value,
            asset: instruction.asset,
            beneficiary: instruction.beneficiary,
            memo: instruction.memo,
        };
        state.delivered.push(receipt.clone());
        Ok(receipt)
    }
}

/// A thread-safe in-memory registry store.
///
/// `Clone` shares the underlying snapshot, so a registry can be reopened from
/// a clone of the store it wrote to.
#[derive(Default, Clone)]
pub struct InMemoryRegistryStore {
    snapshot: Arc<RwLock<RegistrySnapshot>>,
}

impl InMemoryRegistryStore {
    /// Creates a new, empty in-memory registry store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn load(&self) -> Result<RegistrySnapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn bind_home(&self, home: ProjectId) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        if !snapshot.home.is_unset() {
            return Err(DelegateError::AlreadyInitialized(snapshot.home));
        }
        snapshot.home = home;
        Ok(())
    }

    async fn append_candidate(&self, index: usize, candidate: ProjectId) -> Result<()> {
        let mut snapshot = self.snapshot.write().await;
        if index != snapshot.candidates.len() {
            return Err(DelegateError::InternalError(Box::new(std::io::Error::other(
                format!(
                    "Candidate index {} out of sequence (stored {})",
                    index,
                    snapshot.candidates.len()
                ),
            ))));
        }
        snapshot.candidates.push(candidate);
        Ok(())
    }
}
