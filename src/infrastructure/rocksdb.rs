use crate::domain::identity::ProjectId;
use crate::domain::ports::RegistryStore;
use crate::domain::registry::RegistrySnapshot;
use crate::error::{DelegateError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the home binding.
pub const CF_META: &str = "meta";
/// Column Family holding the candidate sequence, keyed by position.
pub const CF_CANDIDATES: &str = "candidates";

const HOME_KEY: &[u8] = b"home";

/// A persistent registry store backed by RocksDB.
///
/// Candidates are keyed by their big-endian position so that iteration order
/// is registration order. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "meta" and "candidates" column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());
        let cf_candidates = ColumnFamilyDescriptor::new(CF_CANDIDATES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_meta, cf_candidates])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            DelegateError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }
}

fn encode(project: ProjectId) -> Result<Vec<u8>> {
    serde_json::to_vec(&project).map_err(|e| {
        DelegateError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode(bytes: &[u8]) -> Result<ProjectId> {
    serde_json::from_slice(bytes).map_err(|e| {
        DelegateError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl RegistryStore for RocksDBStore {
    async fn load(&self) -> Result<RegistrySnapshot> {
        let meta = self.cf(CF_META)?;
        let home = match self.db.get_cf(meta, HOME_KEY)? {
            Some(bytes) => decode(&bytes)?,
            None => ProjectId::UNSET,
        };

        let candidates_cf = self.cf(CF_CANDIDATES)?;
        let mut candidates = Vec::new();
        for item in self.db.iterator_cf(candidates_cf, IteratorMode::Start) {
            let (_key, value) = item?;
            candidates.push(decode(&value)?);
        }

        Ok(RegistrySnapshot { home, candidates })
    }

    async fn bind_home(&self, home: ProjectId) -> Result<()> {
        let meta = self.cf(CF_META)?;
        if let Some(bytes) = self.db.get_cf(meta, HOME_KEY)? {
            let existing = decode(&bytes)?;
            if !existing.is_unset() {
                return Err(DelegateError::AlreadyInitialized(existing));
            }
        }
        self.db.put_cf(meta, HOME_KEY, encode(home)?)?;
        Ok(())
    }

    async fn append_candidate(&self, index: usize, candidate: ProjectId) -> Result<()> {
        let cf = self.cf(CF_CANDIDATES)?;
        let key = (index as u64).to_be_bytes();
        if self.db.get_pinned_cf(cf, key)?.is_some() {
            return Err(DelegateError::InternalError(Box::new(std::io::Error::other(
                format!("Candidate index {} is already stored", index),
            ))));
        }
        self.db.put_cf(cf, key, encode(candidate)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_registry_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry_db");

        {
            let store = RocksDBStore::open(&path).unwrap();
            assert_eq!(store.load().await.unwrap(), RegistrySnapshot::default());

            store.bind_home(ProjectId::new(42)).await.unwrap();
            for (index, id) in [7, 9, 7].into_iter().enumerate() {
                store.append_candidate(index, ProjectId::new(id)).await.unwrap();
            }
        }

        let reopened = RocksDBStore::open(&path).unwrap();
        let snapshot = reopened.load().await.unwrap();
        assert_eq!(snapshot.home, ProjectId::new(42));
        assert_eq!(
            snapshot.candidates,
            vec![ProjectId::new(7), ProjectId::new(9), ProjectId::new(7)]
        );
    }

    #[tokio::test]
    async fn test_candidate_order_survives_many_entries() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path().join("order_db")).unwrap();

        // Crosses a byte boundary so lexicographic key order is exercised.
        for index in 0..300usize {
            store
                .append_candidate(index, ProjectId::new(index as u64 + 1))
                .await
                .unwrap();
        }

        let snapshot = store.load().await.unwrap();
        let expected: Vec<ProjectId> = (1..=300).map(ProjectId::new).collect();
        assert_eq!(snapshot.candidates, expected);
    }

    #[tokio::test]
    async fn test_stored_home_and_candidates_are_never_overwritten() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path().join("guard_db")).unwrap();
        store.bind_home(ProjectId::new(42)).await.unwrap();
        store.append_candidate(0, ProjectId::new(7)).await.unwrap();

        let rebind = store.bind_home(ProjectId::new(99)).await;
        assert!(matches!(
            rebind,
            Err(DelegateError::AlreadyInitialized(home)) if home == ProjectId::new(42)
        ));

        let overwrite = store.append_candidate(0, ProjectId::new(9)).await;
        assert!(matches!(overwrite, Err(DelegateError::InternalError(_))));

        let snapshot = store.load().await.unwrap();
        assert_eq!(snapshot.home, ProjectId::new(42));
        assert_eq!(snapshot.candidates, vec![ProjectId::new(7)]);
    }
}
