//! Persistent snapshot of a node for the store boundary.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use super::store::StoreError;

/// Stored form of one node: identity plus the health settings worth
/// keeping across restarts.
///
/// Runtime health (strike count, last call time) is deliberately
/// absent; a loaded node starts fresh. Partial nodes are stored too,
/// so an interrupted pairing survives a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRecord {
    /// Node id on the network
    pub node_id: u8,

    /// Home id of the network
    pub home_id: u32,

    /// Basic device type, if discovered
    pub basic_device_type: Option<u8>,

    /// Generic device type, if discovered
    pub generic_device_type: Option<u8>,

    /// Specific device type, if discovered
    pub specific_device_type: Option<u8>,

    /// Vendor id, if discovered
    pub manufacturer_id: Option<u16>,

    /// Product type id, if discovered
    pub product_type_id: Option<u16>,

    /// Product id, if discovered
    pub product_id: Option<u16>,

    /// Supported command classes, sorted
    pub command_classes: Vec<u16>,

    /// Online flag at the time of the snapshot
    pub is_online: bool,

    /// Configured offline timeout, zero if unset
    pub offline_timeout_secs: u32,
}

#[cfg(feature = "serde")]
impl NodeRecord {
    /// Serialize for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|err| StoreError::Serialization(err.to_string()))
    }

    /// Deserialize from storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        bincode::deserialize(bytes).map_err(|err| StoreError::Serialization(err.to_string()))
    }
}
