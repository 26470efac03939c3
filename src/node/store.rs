//! Persistent node store boundary.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::record::NodeRecord;

/// Failures at the storage boundary.
///
/// Store errors never corrupt the in-memory registry; callers log them
/// and carry on with the state they have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Underlying storage failed
    #[error("store io failed: {0}")]
    Io(String),

    /// Record bytes could not be written or read back
    #[error("record serialization failed: {0}")]
    Serialization(String),
}

/// Persistent store for node records.
///
/// The network registry treats the store as authoritative across
/// restarts: whatever `load_all` returns is the network.
pub trait NodeStore: Send + Sync {
    /// Load every stored record.
    fn load_all(&self) -> Result<Vec<NodeRecord>, StoreError>;

    /// Insert or update the record for its node id.
    fn save(&self, record: &NodeRecord) -> Result<(), StoreError>;

    /// Delete the record for a node id, if present.
    fn delete(&self, node_id: u8) -> Result<(), StoreError>;
}

/// In-memory store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    records: Mutex<HashMap<u8, NodeRecord>>,
}

impl MemoryNodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record for a node id, if any.
    pub fn get(&self, node_id: u8) -> Option<NodeRecord> {
        self.records().get(&node_id).cloned()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<u8, NodeRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NodeStore for MemoryNodeStore {
    fn load_all(&self) -> Result<Vec<NodeRecord>, StoreError> {
        Ok(self.records().values().cloned().collect())
    }

    fn save(&self, record: &NodeRecord) -> Result<(), StoreError> {
        self.records().insert(record.node_id, record.clone());
        Ok(())
    }

    fn delete(&self, node_id: u8) -> Result<(), StoreError> {
        self.records().remove(&node_id);
        Ok(())
    }
}
