//! Identity, capability, and health record for one Z-Wave node.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::cmdclass;
use crate::events::{EventDispatcher, NodeEvent};

use super::builder::ZWaveNodeBuilder;
use super::record::NodeRecord;
use super::{GATEWAY_NODE_ID, PROTOCOL_NAME};

/// Field bundle the builder, partial creation, and record loading all
/// assemble nodes from.
pub(crate) struct NodeParts {
    pub(crate) node_id: u8,
    pub(crate) home_id: u32,
    pub(crate) basic_device_type: Option<u8>,
    pub(crate) generic_device_type: Option<u8>,
    pub(crate) specific_device_type: Option<u8>,
    pub(crate) manufacturer_id: Option<u16>,
    pub(crate) product_type_id: Option<u16>,
    pub(crate) product_id: Option<u16>,
    pub(crate) command_classes: BTreeSet<u16>,
    pub(crate) is_online: bool,
    pub(crate) offline_timeout_secs: u32,
}

/// Mutable health fields, guarded by one per-node lock.
#[derive(Debug)]
struct Health {
    is_online: bool,
    offline_timeout_secs: u32,
    strikes: u32,
    last_call: DateTime<Utc>,
}

/// One physical device on the Z-Wave network.
///
/// Identity is fixed at construction; health fields change as traffic
/// arrives and liveness probes run, always under the per-node lock so
/// concurrent updates never tear.
#[derive(Debug)]
pub struct ZWaveNode {
    // The node id on the network, 1 - 232
    node_id: u8,

    // Home id of the network the node is on
    home_id: u32,

    // Platform-facing id derived from home id and node id
    device_id: String,

    // Basic device type (controller, static controller, slave, ...)
    basic_device_type: Option<u8>,

    // Generic device type, used to match a generic driver
    generic_device_type: Option<u8>,

    // Specific device type, used to match a generic driver
    specific_device_type: Option<u8>,

    // Vendor id
    manufacturer_id: Option<u16>,

    // Manufacturer specific product type id
    product_type_id: Option<u16>,

    // Manufacturer specific product id
    product_id: Option<u16>,

    // Command classes the device reported during discovery
    command_classes: BTreeSet<u16>,

    // Whether pairing finished with every identity field known.
    // Computed once at construction.
    complete: bool,

    health: Mutex<Health>,
}

impl ZWaveNode {
    pub(crate) fn from_parts(parts: NodeParts) -> Self {
        let complete = parts.basic_device_type.is_some()
            && parts.generic_device_type.is_some()
            && parts.specific_device_type.is_some()
            && parts.manufacturer_id.is_some()
            && parts.product_type_id.is_some()
            && parts.product_id.is_some();

        Self {
            node_id: parts.node_id,
            home_id: parts.home_id,
            device_id: super::device_id(parts.home_id, parts.node_id),
            basic_device_type: parts.basic_device_type,
            generic_device_type: parts.generic_device_type,
            specific_device_type: parts.specific_device_type,
            manufacturer_id: parts.manufacturer_id,
            product_type_id: parts.product_type_id,
            product_id: parts.product_id,
            command_classes: parts.command_classes,
            complete,
            health: Mutex::new(Health {
                is_online: parts.is_online,
                offline_timeout_secs: parts.offline_timeout_secs,
                strikes: 0,
                last_call: Utc::now(),
            }),
        }
    }

    /// Create a node known only by its address, as it is first seen
    /// during pairing. Every other identity field is unset.
    pub fn create_partial(node_id: u8, home_id: u32) -> Self {
        Self::from_parts(NodeParts {
            node_id,
            home_id,
            basic_device_type: None,
            generic_device_type: None,
            specific_device_type: None,
            manufacturer_id: None,
            product_type_id: None,
            product_id: None,
            command_classes: BTreeSet::new(),
            is_online: true,
            offline_timeout_secs: 0,
        })
    }

    /// Builder accumulating identity fields as discovery replies come
    /// in.
    pub fn builder(node_id: u8) -> ZWaveNodeBuilder {
        ZWaveNodeBuilder::new(node_id)
    }

    /// Rebuild a node from its stored record.
    ///
    /// Runtime health starts fresh: zero strikes, last call now.
    pub fn from_record(record: NodeRecord) -> Self {
        Self::from_parts(NodeParts {
            node_id: record.node_id,
            home_id: record.home_id,
            basic_device_type: record.basic_device_type,
            generic_device_type: record.generic_device_type,
            specific_device_type: record.specific_device_type,
            manufacturer_id: record.manufacturer_id,
            product_type_id: record.product_type_id,
            product_id: record.product_id,
            command_classes: record.command_classes.into_iter().collect(),
            is_online: record.is_online,
            offline_timeout_secs: record.offline_timeout_secs,
        })
    }

    /// Snapshot this node for the store boundary.
    pub fn to_record(&self) -> NodeRecord {
        let health = self.health();
        NodeRecord {
            node_id: self.node_id,
            home_id: self.home_id,
            basic_device_type: self.basic_device_type,
            generic_device_type: self.generic_device_type,
            specific_device_type: self.specific_device_type,
            manufacturer_id: self.manufacturer_id,
            product_type_id: self.product_type_id,
            product_id: self.product_id,
            command_classes: self.command_classes.iter().copied().collect(),
            is_online: health.is_online,
            offline_timeout_secs: health.offline_timeout_secs,
        }
    }

    /// The node id on the network, 1 - 232. One byte on the wire.
    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    /// Home id of the network this node is on.
    pub fn home_id(&self) -> u32 {
        self.home_id
    }

    /// Platform-facing device id.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Basic device type reported during discovery.
    pub fn basic_device_type(&self) -> Option<u8> {
        self.basic_device_type
    }

    /// Generic device type reported during discovery.
    pub fn generic_device_type(&self) -> Option<u8> {
        self.generic_device_type
    }

    /// Specific device type reported during discovery.
    pub fn specific_device_type(&self) -> Option<u8> {
        self.specific_device_type
    }

    /// Vendor id.
    pub fn manufacturer_id(&self) -> Option<u16> {
        self.manufacturer_id
    }

    /// Manufacturer specific product type id.
    pub fn product_type_id(&self) -> Option<u16> {
        self.product_type_id
    }

    /// Manufacturer specific product id.
    pub fn product_id(&self) -> Option<u16> {
        self.product_id
    }

    /// Command classes the device supports.
    pub fn command_classes(&self) -> &BTreeSet<u16> {
        &self.command_classes
    }

    /// Whether the device reported support for a command class.
    pub fn supports_command_class(&self, command_class_id: u16) -> bool {
        self.command_classes.contains(&command_class_id)
    }

    /// Supported command classes exported one byte each, for the
    /// platform-facing capability record.
    pub fn command_class_bytes(&self) -> Vec<u8> {
        self.command_classes.iter().map(|c| *c as u8).collect()
    }

    /// Whether every identity field was known when this node was
    /// constructed.
    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Inverse of [`complete`](Self::complete).
    pub fn is_partial(&self) -> bool {
        !self.complete
    }

    /// Whether this node is the network controller.
    pub fn is_gateway(&self) -> bool {
        self.node_id == GATEWAY_NODE_ID
    }

    /// Whether the device supports the wakeup command class. Wakeup
    /// devices sleep between check-ins and cannot be probed on demand.
    pub fn is_wakeup_device(&self) -> bool {
        cmdclass::supports_wakeup(&self.command_classes)
    }

    /// Platform address for this node under the owning hub.
    pub fn protocol_address(&self, hub_id: &str) -> String {
        format!("PROT:{PROTOCOL_NAME}-{hub_id}:{}", self.device_id)
    }

    /// Whether the device is currently considered online.
    pub fn is_online(&self) -> bool {
        self.health().is_online
    }

    /// Set the online state, announcing an actual flip through the
    /// dispatcher. Unchanged state is a no-op and announces nothing.
    pub fn set_online(&self, online: bool, dispatcher: &EventDispatcher) {
        let flipped = {
            let mut health = self.health();
            if health.is_online == online {
                false
            } else {
                health.is_online = online;
                true
            }
        };

        // Dispatch with the health lock released so a listener may
        // re-enter this node or the registry.
        if flipped {
            let event = if online {
                NodeEvent::NodeOnline {
                    node_id: self.node_id,
                }
            } else {
                NodeEvent::NodeOffline {
                    node_id: self.node_id,
                }
            };
            dispatcher.dispatch(&event);
        }
    }

    /// Seconds a device may stay silent before the health monitor
    /// probes it. Zero means the policy is not configured.
    pub fn offline_timeout_secs(&self) -> u32 {
        self.health().offline_timeout_secs
    }

    /// Set the offline timeout in seconds, zero to disable.
    pub fn set_offline_timeout_secs(&self, seconds: u32) {
        self.health().offline_timeout_secs = seconds;
    }

    /// Failed probe count since the node was last heard from.
    pub fn strikes(&self) -> u32 {
        self.health().strikes
    }

    /// Overwrite the failed probe count.
    pub fn set_strikes(&self, strikes: u32) {
        self.health().strikes = strikes;
    }

    /// Record one failed probe and return the new count. Runs under a
    /// single lock acquisition so concurrent probes never lose an
    /// increment.
    pub fn record_strike(&self) -> u32 {
        let mut health = self.health();
        health.strikes = health.strikes.saturating_add(1);
        health.strikes
    }

    /// When the hub last received communication from this node.
    pub fn last_call(&self) -> DateTime<Utc> {
        self.health().last_call
    }

    /// Record communication from the node. Any traffic is proof of
    /// liveness, so the strike count resets with the timestamp under
    /// the same lock acquisition.
    pub fn set_last_call(&self, last_call: DateTime<Utc>) {
        let mut health = self.health();
        health.strikes = 0;
        health.last_call = last_call;
    }

    fn health(&self) -> MutexGuard<'_, Health> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn complete_node(node_id: u8) -> ZWaveNode {
        ZWaveNode::builder(node_id)
            .home_id(0x00C0FFEE)
            .basic_device_type(0x04)
            .generic_device_type(0x10)
            .specific_device_type(0x01)
            .manufacturer_id(0x0063)
            .product_type_id(0x4952)
            .product_id(0x3130)
            .add_command_classes(&[0x20, 0x25, 0x84])
            .build()
            .unwrap()
    }

    #[test]
    fn test_partial_node_is_incomplete() {
        let node = ZWaveNode::create_partial(12, 0x00C0FFEE);

        assert!(!node.complete());
        assert!(node.is_partial());
        assert!(node.is_online());
        assert_eq!(node.offline_timeout_secs(), 0);
        assert_eq!(node.strikes(), 0);
        assert_eq!(node.basic_device_type(), None);
        assert_eq!(node.manufacturer_id(), None);
    }

    #[test]
    fn test_complete_node() {
        let node = complete_node(5);

        assert!(node.complete());
        assert!(!node.is_partial());
        assert_eq!(node.device_id(), "00C0FFEE05");
        assert_eq!(node.generic_device_type(), Some(0x10));
        assert!(node.supports_command_class(0x25));
        assert!(!node.supports_command_class(0x71));
    }

    #[test]
    fn test_gateway_detection() {
        assert!(ZWaveNode::create_partial(GATEWAY_NODE_ID, 1).is_gateway());
        assert!(!ZWaveNode::create_partial(2, 1).is_gateway());
    }

    #[test]
    fn test_wakeup_detection() {
        let node = complete_node(5);
        assert!(node.is_wakeup_device());

        let mute = ZWaveNode::create_partial(6, 0x00C0FFEE);
        assert!(!mute.is_wakeup_device());
    }

    #[test]
    fn test_protocol_address() {
        let node = complete_node(5);
        assert_eq!(node.protocol_address("ABC-1234"), "PROT:ZWAV-ABC-1234:00C0FFEE05");
    }

    #[test]
    fn test_command_class_bytes() {
        let node = complete_node(5);
        assert_eq!(node.command_class_bytes(), vec![0x20, 0x25, 0x84]);
    }

    #[test]
    fn test_last_call_resets_strikes() {
        let node = complete_node(5);

        node.set_strikes(4);
        assert_eq!(node.strikes(), 4);

        node.set_last_call(Utc::now());
        assert_eq!(node.strikes(), 0);
    }

    #[test]
    fn test_record_strike_increments() {
        let node = complete_node(5);

        assert_eq!(node.record_strike(), 1);
        assert_eq!(node.record_strike(), 2);
        assert_eq!(node.strikes(), 2);
    }

    #[test]
    fn test_online_flip_dispatches_once() {
        let node = complete_node(5);
        let dispatcher = EventDispatcher::new();

        let online_events = Arc::new(AtomicUsize::new(0));
        let offline_events = Arc::new(AtomicUsize::new(0));
        let online_count = Arc::clone(&online_events);
        let offline_count = Arc::clone(&offline_events);
        dispatcher.register_fn(move |event| {
            match event {
                NodeEvent::NodeOnline { .. } => {
                    online_count.fetch_add(1, Ordering::SeqCst);
                }
                NodeEvent::NodeOffline { .. } => {
                    offline_count.fetch_add(1, Ordering::SeqCst);
                }
                _ => {}
            }
            Ok(())
        });

        // Already online, so no event
        node.set_online(true, &dispatcher);
        assert_eq!(online_events.load(Ordering::SeqCst), 0);

        node.set_online(false, &dispatcher);
        assert_eq!(offline_events.load(Ordering::SeqCst), 1);
        assert!(!node.is_online());

        node.set_online(true, &dispatcher);
        node.set_online(true, &dispatcher);
        assert_eq!(online_events.load(Ordering::SeqCst), 1);
        assert!(node.is_online());
    }

    #[test]
    fn test_record_round_trip() {
        let node = complete_node(5);
        node.set_offline_timeout_secs(120);
        node.set_strikes(3);

        let record = node.to_record();
        assert_eq!(record.node_id, 5);
        assert_eq!(record.offline_timeout_secs, 120);
        assert_eq!(record.command_classes, vec![0x20, 0x25, 0x84]);

        let restored = ZWaveNode::from_record(record);
        assert!(restored.complete());
        assert_eq!(restored.device_id(), "00C0FFEE05");
        assert_eq!(restored.offline_timeout_secs(), 120);
        // Runtime health starts fresh
        assert_eq!(restored.strikes(), 0);
    }

    #[test]
    fn test_partial_record_reloads_partial() {
        let partial = ZWaveNode::create_partial(9, 0x00C0FFEE);
        let restored = ZWaveNode::from_record(partial.to_record());

        assert!(restored.is_partial());
        assert_eq!(restored.node_id(), 9);
        assert_eq!(restored.home_id(), 0x00C0FFEE);
    }
}
