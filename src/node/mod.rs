//! Z-Wave node lifecycle and network registry
//!
//! Models one physical device per node: immutable identity discovered
//! during pairing, plus mutable health state the hub updates as traffic
//! arrives and liveness probes succeed or fail.
//!
//! # Architecture
//!
//! - [`ZWaveNode`]: identity + capability + health record for one node
//! - [`ZWaveNodeBuilder`]: accumulates identity fields as discovery
//!   queries complete during pairing
//! - [`ZWaveNetwork`]: network-wide registry indexing nodes by node id
//!   and by platform device id, backed by a [`NodeStore`]
//! - [`NodeRecord`]: persistent snapshot crossing the store boundary
//!
//! # Node Lifecycle
//!
//! ```text
//!              build() + first response
//!   Partial  ---------------------------->  Online
//!                                          ^      |
//!                        set_online(true)  |      |  health monitor
//!                                          |      v
//!                                           Offline
//! ```
//!
//! A partial node carries only its node id and home id; the rest of its
//! identity arrives over several discovery replies. Partial nodes are
//! persisted so an interrupted pairing survives a restart.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zwave_rs::events::EventDispatcher;
//! use zwave_rs::node::{MemoryNodeStore, ZWaveNetwork, ZWaveNode};
//!
//! let store = Arc::new(MemoryNodeStore::new());
//! let dispatcher = Arc::new(EventDispatcher::new());
//! let network = ZWaveNetwork::new(store, dispatcher);
//!
//! network.initialize(0x00C0FFEE)?;
//!
//! let node = ZWaveNode::builder(5)
//!     .home_id(0x00C0FFEE)
//!     .basic_device_type(0x04)
//!     .generic_device_type(0x10)
//!     .specific_device_type(0x01)
//!     .manufacturer_id(0x0063)
//!     .product_type_id(0x4952)
//!     .product_id(0x3130)
//!     .add_command_classes(&[0x20, 0x25, 0x72, 0x86])
//!     .build()?;
//! let node = network.add_node(node);
//!
//! network.node_heard_from(5);
//! assert!(node.is_online());
//! ```

mod builder;
mod model;
mod network;
mod record;
mod store;

pub use builder::{BuilderIncompleteError, ZWaveNodeBuilder};
pub use model::ZWaveNode;
pub use network::ZWaveNetwork;
pub use record::NodeRecord;
pub use store::{MemoryNodeStore, NodeStore, StoreError};

/// Node id reserved for the network controller.
pub const GATEWAY_NODE_ID: u8 = 1;

/// Lowest valid node id.
pub const MIN_NODE_ID: u8 = 1;

/// Highest valid node id.
pub const MAX_NODE_ID: u8 = 232;

/// Protocol tag used in platform-facing addresses.
pub const PROTOCOL_NAME: &str = "ZWAV";

/// Whether a node id falls in the addressable range.
pub fn is_valid_node_id(node_id: u8) -> bool {
    (MIN_NODE_ID..=MAX_NODE_ID).contains(&node_id)
}

/// Platform device id for a home id / node id pair.
///
/// Rendered as uppercase hex, home id first, so ids sort by network
/// and stay unique per node.
pub fn device_id(home_id: u32, node_id: u8) -> String {
    format!("{home_id:08X}{node_id:02X}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_range() {
        assert!(is_valid_node_id(MIN_NODE_ID));
        assert!(is_valid_node_id(MAX_NODE_ID));
        assert!(is_valid_node_id(GATEWAY_NODE_ID));
        assert!(!is_valid_node_id(0));
        assert!(!is_valid_node_id(233));
    }

    #[test]
    fn test_device_id_rendering() {
        assert_eq!(device_id(0x00C0FFEE, 5), "00C0FFEE05");
        assert_eq!(device_id(0xDEADBEEF, 232), "DEADBEEFE8");
    }
}
