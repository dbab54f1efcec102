//! Key-value persistence used by the ledger, with optimistic versioning.

use std::collections::HashMap;

/// Value stored under a key together with the version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub value: Vec<u8>,
    pub version: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write expected `expected` (`None` = key absent) but the store holds `actual`.
    #[error("Version mismatch on {key}: expected {expected:?}, found {actual:?}")]
    VersionMismatch {
        key: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Storage collaborator of the ledger. Every write names the version observed at read time so
/// that two overlapping read-modify-write cycles on one key can never both succeed.
pub trait ReportStore {
    fn get_state(&self, key: &str) -> Result<Option<StateEntry>, StoreError>;

    /// Writes `value` under `key` if the current version equals `expected_version`
    /// (`None` requires the key to be absent) and returns the new version.
    fn put_state(
        &mut self,
        key: &str,
        value: Vec<u8>,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError>;
}

/// In-process store, used by tests and single-node tooling.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, StateEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReportStore for MemoryStore {
    fn get_state(&self, key: &str) -> Result<Option<StateEntry>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_state(
        &mut self,
        key: &str,
        value: Vec<u8>,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let actual = self.entries.get(key).map(|entry| entry.version);
        if actual != expected_version {
            return Err(StoreError::VersionMismatch {
                key: key.to_string(),
                expected: expected_version,
                actual,
            });
        }

        let version = actual.map_or(1, |v| v + 1);
        self.entries
            .insert(key.to_string(), StateEntry { value, version });

        Ok(version)
    }
}
