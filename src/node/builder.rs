//! Incremental node construction during pairing.

use std::collections::BTreeSet;

use thiserror::Error;

use super::model::{NodeParts, ZWaveNode};

/// Error returned when [`ZWaveNodeBuilder::build`] is called before
/// every required identity field is set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("node {node_id} is missing identity fields: {}", .missing.join(", "))]
pub struct BuilderIncompleteError {
    /// Node the builder was accumulating
    pub node_id: u8,
    /// Identity fields still unset
    pub missing: Vec<&'static str>,
}

/// Accumulates a node's identity across discovery replies.
///
/// Pairing yields identity in pieces over several exchanges: the node
/// id first, device types from the protocol info reply, vendor and
/// product ids from the manufacturer specific report. The builder
/// holds whatever has arrived so far and only
/// [`build`](Self::build)s once everything required is present.
#[derive(Debug, Clone)]
pub struct ZWaveNodeBuilder {
    node_id: u8,
    home_id: Option<u32>,
    basic_device_type: Option<u8>,
    generic_device_type: Option<u8>,
    specific_device_type: Option<u8>,
    manufacturer_id: Option<u16>,
    product_type_id: Option<u16>,
    product_id: Option<u16>,
    command_classes: BTreeSet<u16>,
    is_online: bool,
    offline_timeout_secs: u32,
}

impl ZWaveNodeBuilder {
    /// Start a builder for a node id.
    pub fn new(node_id: u8) -> Self {
        Self {
            node_id,
            home_id: None,
            basic_device_type: None,
            generic_device_type: None,
            specific_device_type: None,
            manufacturer_id: None,
            product_type_id: None,
            product_id: None,
            command_classes: BTreeSet::new(),
            is_online: true,
            offline_timeout_secs: 0,
        }
    }

    /// Home id of the network the node is joining.
    pub fn home_id(mut self, home_id: u32) -> Self {
        self.home_id = Some(home_id);
        self
    }

    /// Basic device type from the protocol info reply.
    pub fn basic_device_type(mut self, basic_device_type: u8) -> Self {
        self.basic_device_type = Some(basic_device_type);
        self
    }

    /// Generic device type from the protocol info reply.
    pub fn generic_device_type(mut self, generic_device_type: u8) -> Self {
        self.generic_device_type = Some(generic_device_type);
        self
    }

    /// Specific device type from the protocol info reply.
    pub fn specific_device_type(mut self, specific_device_type: u8) -> Self {
        self.specific_device_type = Some(specific_device_type);
        self
    }

    /// Vendor id from the manufacturer specific report.
    pub fn manufacturer_id(mut self, manufacturer_id: u16) -> Self {
        self.manufacturer_id = Some(manufacturer_id);
        self
    }

    /// Product type id from the manufacturer specific report.
    pub fn product_type_id(mut self, product_type_id: u16) -> Self {
        self.product_type_id = Some(product_type_id);
        self
    }

    /// Product id from the manufacturer specific report.
    pub fn product_id(mut self, product_id: u16) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Add one supported command class.
    pub fn add_command_class(mut self, command_class_id: u16) -> Self {
        self.command_classes.insert(command_class_id);
        self
    }

    /// Add supported command classes from a node info frame, one class
    /// id per byte.
    pub fn add_command_classes(mut self, command_class_ids: &[u8]) -> Self {
        for id in command_class_ids {
            self.command_classes.insert(u16::from(*id));
        }
        self
    }

    /// Carry over a stored online flag when rebuilding from a record.
    pub fn online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// Carry over a stored offline timeout when rebuilding from a
    /// record.
    pub fn offline_timeout_secs(mut self, seconds: u32) -> Self {
        self.offline_timeout_secs = seconds;
        self
    }

    /// Whether every required identity field has been set.
    pub fn is_ready_to_build(&self) -> bool {
        self.home_id.is_some()
            && self.basic_device_type.is_some()
            && self.generic_device_type.is_some()
            && self.specific_device_type.is_some()
            && self.manufacturer_id.is_some()
            && self.product_type_id.is_some()
            && self.product_id.is_some()
    }

    /// Build the node, or report which identity fields are still
    /// missing. An incomplete node is never constructed silently.
    pub fn build(self) -> Result<ZWaveNode, BuilderIncompleteError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(BuilderIncompleteError {
                node_id: self.node_id,
                missing,
            });
        }

        Ok(ZWaveNode::from_parts(NodeParts {
            node_id: self.node_id,
            home_id: self.home_id.unwrap_or_default(),
            basic_device_type: self.basic_device_type,
            generic_device_type: self.generic_device_type,
            specific_device_type: self.specific_device_type,
            manufacturer_id: self.manufacturer_id,
            product_type_id: self.product_type_id,
            product_id: self.product_id,
            command_classes: self.command_classes,
            is_online: self.is_online,
            offline_timeout_secs: self.offline_timeout_secs,
        }))
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.home_id.is_none() {
            missing.push("home_id");
        }
        if self.basic_device_type.is_none() {
            missing.push("basic_device_type");
        }
        if self.generic_device_type.is_none() {
            missing.push("generic_device_type");
        }
        if self.specific_device_type.is_none() {
            missing.push("specific_device_type");
        }
        if self.manufacturer_id.is_none() {
            missing.push("manufacturer_id");
        }
        if self.product_type_id.is_none() {
            missing.push("product_type_id");
        }
        if self.product_id.is_none() {
            missing.push("product_id");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_builder(node_id: u8) -> ZWaveNodeBuilder {
        ZWaveNodeBuilder::new(node_id)
            .home_id(0x00C0FFEE)
            .basic_device_type(0x04)
            .generic_device_type(0x10)
            .specific_device_type(0x01)
            .manufacturer_id(0x0063)
            .product_type_id(0x4952)
            .product_id(0x3130)
    }

    #[test]
    fn test_empty_builder_is_rejected() {
        let err = ZWaveNodeBuilder::new(7).build().unwrap_err();

        assert_eq!(err.node_id, 7);
        assert_eq!(err.missing.len(), 7);
        assert!(err.missing.contains(&"home_id"));
        assert!(err.missing.contains(&"product_id"));
    }

    #[test]
    fn test_full_builder_builds_complete_node() {
        let builder = full_builder(5).add_command_classes(&[0x20, 0x72]);
        assert!(builder.is_ready_to_build());

        let node = builder.build().unwrap();
        assert!(node.complete());
        assert_eq!(node.node_id(), 5);
        assert_eq!(node.home_id(), 0x00C0FFEE);
        assert_eq!(node.manufacturer_id(), Some(0x0063));
        assert!(node.supports_command_class(0x72));
    }

    #[test]
    fn test_each_missing_field_blocks_build() {
        let cases: [(&str, ZWaveNodeBuilder); 7] = [
            (
                "home_id",
                ZWaveNodeBuilder::new(9)
                    .basic_device_type(0x04)
                    .generic_device_type(0x10)
                    .specific_device_type(0x01)
                    .manufacturer_id(0x0063)
                    .product_type_id(0x4952)
                    .product_id(0x3130),
            ),
            (
                "basic_device_type",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .generic_device_type(0x10)
                    .specific_device_type(0x01)
                    .manufacturer_id(0x0063)
                    .product_type_id(0x4952)
                    .product_id(0x3130),
            ),
            (
                "generic_device_type",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .basic_device_type(0x04)
                    .specific_device_type(0x01)
                    .manufacturer_id(0x0063)
                    .product_type_id(0x4952)
                    .product_id(0x3130),
            ),
            (
                "specific_device_type",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .basic_device_type(0x04)
                    .generic_device_type(0x10)
                    .manufacturer_id(0x0063)
                    .product_type_id(0x4952)
                    .product_id(0x3130),
            ),
            (
                "manufacturer_id",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .basic_device_type(0x04)
                    .generic_device_type(0x10)
                    .specific_device_type(0x01)
                    .product_type_id(0x4952)
                    .product_id(0x3130),
            ),
            (
                "product_type_id",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .basic_device_type(0x04)
                    .generic_device_type(0x10)
                    .specific_device_type(0x01)
                    .manufacturer_id(0x0063)
                    .product_id(0x3130),
            ),
            (
                "product_id",
                ZWaveNodeBuilder::new(9)
                    .home_id(0x00C0FFEE)
                    .basic_device_type(0x04)
                    .generic_device_type(0x10)
                    .specific_device_type(0x01)
                    .manufacturer_id(0x0063)
                    .product_type_id(0x4952),
            ),
        ];

        for (field, builder) in cases {
            assert!(!builder.is_ready_to_build(), "{field} should block build");
            let err = builder.build().unwrap_err();
            assert_eq!(err.missing, vec![field]);
        }
    }

    #[test]
    fn test_command_classes_from_bytes() {
        let node = full_builder(5)
            .add_command_classes(&[0x20, 0x25, 0x20])
            .add_command_class(0x86)
            .build()
            .unwrap();

        assert_eq!(node.command_class_bytes(), vec![0x20, 0x25, 0x86]);
    }

    #[test]
    fn test_stored_health_carryover() {
        let node = full_builder(5)
            .online(false)
            .offline_timeout_secs(3600)
            .build()
            .unwrap();

        assert!(!node.is_online());
        assert_eq!(node.offline_timeout_secs(), 3600);
    }

    #[test]
    fn test_error_message_lists_fields() {
        let err = ZWaveNodeBuilder::new(7)
            .home_id(1)
            .basic_device_type(0x04)
            .generic_device_type(0x10)
            .specific_device_type(0x01)
            .manufacturer_id(0x0063)
            .product_type_id(0x4952)
            .build()
            .unwrap_err();

        assert_eq!(err.to_string(), "node 7 is missing identity fields: product_id");
    }
}
