use super::identity::{Address, ProjectId};
use super::ports::{AuthorizationSourceRef, EntropySource, RegistryStoreBox};
use crate::error::{DelegateError, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Persisted form of a registry: the home binding and the candidate sequence.
///
/// An unset `home` with no candidates is the state of a fresh instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub home: ProjectId,
    pub candidates: Vec<ProjectId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryStatus {
    Uninitialized,
    Initialized,
}

#[derive(Clone)]
struct Binding {
    home: ProjectId,
    authorization: AuthorizationSourceRef,
}

#[derive(Default)]
struct RegistryState {
    binding: Option<Binding>,
    candidates: Vec<ProjectId>,
}

/// Maps an entropy value onto an index of a sequence of `len` entries.
///
/// Returns `None` for an empty sequence. Every entry is equally likely for a
/// uniform `value`, so a candidate registered twice is twice as likely.
pub fn select_index(value: u64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((value % len as u64) as usize)
}

/// Owns the home identity of a delegate instance and its candidate pool.
///
/// The instance is created unbound and bound exactly once through
/// [`Registry::initialize`]. All state sits behind one lock: appends are
/// exclusive, selections shared, so a selection never sees a partial append.
/// Writes go through the [`RegistryStore`](super::ports::RegistryStore)
/// first and are committed in memory only once the store accepted them.
pub struct Registry {
    state: RwLock<RegistryState>,
    store: RegistryStoreBox,
}

impl Registry {
    /// Creates an uninitialized registry writing through `store`.
    pub fn new(store: RegistryStoreBox) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            store,
        }
    }

    /// Reopens a registry from whatever `store` holds.
    ///
    /// Authorization sources are runtime collaborators rather than state, so a
    /// previously initialized instance is rebound to `authorization`. A store
    /// that was never initialized yields an uninitialized registry.
    pub async fn restore(store: RegistryStoreBox, authorization: AuthorizationSourceRef) -> Result<Self> {
        let snapshot = store.load().await?;

        let binding = if snapshot.home.is_unset() {
            if !snapshot.candidates.is_empty() {
                return Err(DelegateError::InternalError(Box::new(std::io::Error::other(
                    "Stored candidates without a home identity",
                ))));
            }
            None
        } else {
            info!(
                home = %snapshot.home,
                candidates = snapshot.candidates.len(),
                "Restored delegate registry"
            );
            Some(Binding {
                home: snapshot.home,
                authorization,
            })
        };

        Ok(Self {
            state: RwLock::new(RegistryState {
                binding,
                candidates: snapshot.candidates,
            }),
            store,
        })
    }

    /// Binds this instance to `home`, trusting `authorization` from now on.
    ///
    /// Fails with `AlreadyInitialized` on any call after the first successful
    /// one, whatever the arguments.
    pub async fn initialize(&self, home: ProjectId, authorization: AuthorizationSourceRef) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(binding) = &state.binding {
            return Err(DelegateError::AlreadyInitialized(binding.home));
        }
        if home.is_unset() {
            return Err(DelegateError::InvalidHomeIdentity(home));
        }

        self.store.bind_home(home).await?;
        state.binding = Some(Binding {
            home,
            authorization,
        });

        info!(%home, "Delegate initialized");
        Ok(())
    }

    /// Appends `candidate` to the pool on behalf of `caller`.
    ///
    /// Any identifier is accepted, including duplicates and the home identity
    /// itself. `caller` must be a candidate operator of the home project.
    pub async fn add_candidate(&self, caller: &Address, candidate: ProjectId) -> Result<()> {
        let Binding {
            home,
            authorization,
        } = self.binding().await.ok_or(DelegateError::NotInitialized)?;

        if !authorization.can_manage_candidates(home, caller).await? {
            return Err(DelegateError::UnauthorizedOperator {
                caller: caller.clone(),
                project: home,
            });
        }

        let mut state = self.state.write().await;
        let index = state.candidates.len();
        self.store.append_candidate(index, candidate).await?;
        state.candidates.push(candidate);

        info!(%home, %candidate, index, %caller, "Candidate added");
        Ok(())
    }

    /// Picks one candidate, uniformly over the entries of the pool.
    ///
    /// `entropy` is only consulted when there is something to pick from.
    pub async fn pick_random_candidate(&self, entropy: &dyn EntropySource) -> Result<ProjectId> {
        let state = self.state.read().await;
        if state.candidates.is_empty() {
            return Err(DelegateError::EmptyCandidateSet);
        }

        let value = entropy.value();
        let index =
            select_index(value, state.candidates.len()).ok_or(DelegateError::EmptyCandidateSet)?;
        let candidate = state.candidates[index];

        debug!(value, index, %candidate, "Candidate selected");
        Ok(candidate)
    }

    pub async fn status(&self) -> RegistryStatus {
        if self.state.read().await.binding.is_some() {
            RegistryStatus::Initialized
        } else {
            RegistryStatus::Uninitialized
        }
    }

    pub async fn is_initialized(&self) -> bool {
        self.status().await == RegistryStatus::Initialized
    }

    /// The home identity, once bound.
    pub async fn home(&self) -> Option<ProjectId> {
        self.state.read().await.binding.as_ref().map(|b| b.home)
    }

    pub async fn authorization(&self) -> Option<AuthorizationSourceRef> {
        self.binding().await.map(|b| b.authorization)
    }

    /// A copy of the candidate sequence, in registration order.
    pub async fn candidates(&self) -> Vec<ProjectId> {
        self.state.read().await.candidates.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.candidates.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub(crate) async fn bound_home(&self) -> Option<(ProjectId, AuthorizationSourceRef)> {
        self.binding().await.map(|b| (b.home, b.authorization))
    }

    async fn binding(&self) -> Option<Binding> {
        self.state.read().await.binding.clone()
    }
}
