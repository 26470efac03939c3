//! Network-wide node registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::error;

use crate::events::{EventDispatcher, NodeEvent};

use super::model::ZWaveNode;
use super::store::{NodeStore, StoreError};
use super::GATEWAY_NODE_ID;

#[derive(Default)]
struct Indexes {
    by_node_id: HashMap<u8, Arc<ZWaveNode>>,
    by_device_id: HashMap<String, Arc<ZWaveNode>>,
}

/// Registry of every node on the Z-Wave network.
///
/// Nodes are indexed both by node id (the radio side) and by platform
/// device id (the platform side). The registry keeps the backing store
/// in step with its in-memory state and announces membership changes
/// through the event dispatcher.
///
/// Shared by handle across the inbound I/O path, the health monitor,
/// and application code; per-node health updates synchronize on the
/// node's own lock, so holding the registry lock across them is never
/// required.
pub struct ZWaveNetwork {
    home_id: Mutex<Option<u32>>,
    indexes: RwLock<Indexes>,
    store: Arc<dyn NodeStore>,
    dispatcher: Arc<EventDispatcher>,
}

impl ZWaveNetwork {
    /// Create an empty registry over a store and a dispatcher.
    pub fn new(store: Arc<dyn NodeStore>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            home_id: Mutex::new(None),
            indexes: RwLock::new(Indexes::default()),
            store,
            dispatcher,
        }
    }

    /// Adopt the controller's home id and load every stored node.
    ///
    /// Returns the number of nodes loaded. Partial records come back
    /// as partial nodes, ready for pairing to resume.
    pub fn initialize(&self, home_id: u32) -> Result<usize, StoreError> {
        self.adopt_home_id(home_id);

        let records = self.store.load_all()?;
        let count = records.len();

        let mut indexes = self.write();
        for record in records {
            let node = Arc::new(ZWaveNode::from_record(record));
            indexes
                .by_device_id
                .insert(node.device_id().to_string(), Arc::clone(&node));
            indexes.by_node_id.insert(node.node_id(), node);
        }

        Ok(count)
    }

    /// Register a node seen during pairing.
    ///
    /// The first registration adopts the network home id. A new node
    /// id gets a partial node, indexed and persisted; an existing id
    /// is left alone.
    pub fn register_node(&self, node_id: u8, home_id: u32) -> Arc<ZWaveNode> {
        if self.home_id().is_none() {
            self.adopt_home_id(home_id);
        }
        let network_home = self.home_id().unwrap_or(home_id);

        let (node, created) = {
            let mut indexes = self.write();
            match indexes.by_node_id.get(&node_id) {
                Some(existing) => (Arc::clone(existing), false),
                None => {
                    let node = Arc::new(ZWaveNode::create_partial(node_id, network_home));
                    indexes.by_node_id.insert(node_id, Arc::clone(&node));
                    indexes
                        .by_device_id
                        .insert(node.device_id().to_string(), Arc::clone(&node));
                    (node, true)
                }
            }
        };

        if created {
            self.persist(&node);
        }
        node
    }

    /// Insert a fully paired node, persist it, and announce it.
    ///
    /// Replaces any partial node under the same id.
    pub fn add_node(&self, node: ZWaveNode) -> Arc<ZWaveNode> {
        let node = Arc::new(node);

        {
            let mut indexes = self.write();
            indexes.by_node_id.insert(node.node_id(), Arc::clone(&node));
            indexes
                .by_device_id
                .insert(node.device_id().to_string(), Arc::clone(&node));
        }

        self.persist(&node);
        self.dispatcher.dispatch(&NodeEvent::NodeAdded {
            node_id: node.node_id(),
        });
        node
    }

    /// Remove a node from the registry and the store, announcing the
    /// removal. An unknown id is logged and otherwise ignored.
    pub fn deregister_node(&self, node_id: u8) {
        let removed = {
            let mut indexes = self.write();
            match indexes.by_node_id.remove(&node_id) {
                Some(node) => {
                    indexes.by_device_id.remove(node.device_id());
                    true
                }
                None => false,
            }
        };

        if removed {
            if let Err(err) = self.store.delete(node_id) {
                error!("failed to delete node {} from the store: {}", node_id, err);
            }
            self.dispatcher
                .dispatch(&NodeEvent::NodeRemoved { node_id });
        } else {
            error!("unable to find node {} to deregister", node_id);
        }
    }

    /// Node for a node id, if registered.
    pub fn node(&self, node_id: u8) -> Option<Arc<ZWaveNode>> {
        self.read().by_node_id.get(&node_id).cloned()
    }

    /// Node for a platform device id, if registered.
    pub fn node_by_device_id(&self, device_id: &str) -> Option<Arc<ZWaveNode>> {
        self.read().by_device_id.get(device_id).cloned()
    }

    /// Snapshot of every registered node.
    pub fn nodes(&self) -> Vec<Arc<ZWaveNode>> {
        self.read().by_node_id.values().cloned().collect()
    }

    /// Record traffic from a node: refresh its last call time, clear
    /// its strikes, and mark it online.
    pub fn node_heard_from(&self, node_id: u8) {
        if let Some(node) = self.node(node_id) {
            node.set_last_call(Utc::now());
            node.set_online(true, &self.dispatcher);
        }
    }

    /// Apply a new offline timeout to a node and persist it.
    pub fn set_offline_timeout(&self, node_id: u8, seconds: u32) {
        if let Some(node) = self.node(node_id) {
            node.set_offline_timeout_secs(seconds);
            self.persist(&node);
        }
    }

    /// Home id of the network, once known.
    pub fn home_id(&self) -> Option<u32> {
        *self.home_id_slot()
    }

    /// Platform device id for a node id under this network's home id.
    pub fn device_id(&self, node_id: u8) -> Option<String> {
        self.home_id().map(|home_id| super::device_id(home_id, node_id))
    }

    /// Node id of the network controller.
    pub fn controller_node_id(&self) -> u8 {
        GATEWAY_NODE_ID
    }

    /// Number of devices on the network, not counting the controller.
    pub fn device_count(&self) -> usize {
        self.read().by_node_id.len().saturating_sub(1)
    }

    /// Dispatcher this registry announces through.
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    fn adopt_home_id(&self, home_id: u32) {
        let changed = {
            let mut slot = self.home_id_slot();
            if *slot == Some(home_id) {
                false
            } else {
                *slot = Some(home_id);
                true
            }
        };

        if changed {
            self.dispatcher
                .dispatch(&NodeEvent::HomeIdChanged { home_id });
        }
    }

    fn persist(&self, node: &ZWaveNode) {
        if let Err(err) = self.store.save(&node.to_record()) {
            error!("failed to save node {} to the store: {}", node.node_id(), err);
        }
    }

    fn home_id_slot(&self) -> MutexGuard<'_, Option<u32>> {
        self.home_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, Indexes> {
        self.indexes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes> {
        self.indexes.write().unwrap_or_else(PoisonError::into_inner)
    }
}
