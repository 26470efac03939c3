//! Z-Wave Command Class Registry
//!
//! Command classes group related device commands under a one-byte class
//! id (Basic is 0x20, Battery is 0x80, and so on). The registry maps
//! class and command ids to descriptors that can name a command and
//! validate its raw payload.
//!
//! The registry is built once at startup with
//! [`CommandClassRegistry::standard`] and shared read-only afterwards,
//! typically behind an `Arc` handed to the protocol multiplexer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use zwave_rs::cmdclass::{class_id, CommandClassRegistry};
//!
//! let registry = CommandClassRegistry::standard();
//! let basic = registry.lookup(class_id::BASIC).unwrap();
//! let report = basic.get(0x03).unwrap();
//! let parsed = report.parse_payload(&[0xFF]).unwrap();
//! assert_eq!(parsed.get("value"), Some(0xFF));
//! ```

use std::collections::BTreeSet;

mod registry;

pub use registry::{
    CommandClass, CommandClassRegistry, CommandDescriptor, CommandParseError, ParsedCommand,
};

/// Well-known Z-Wave command class identifiers.
pub mod class_id {
    /// Basic
    pub const BASIC: u8 = 0x20;
    /// Binary Switch
    pub const SWITCH_BINARY: u8 = 0x25;
    /// Multilevel Switch
    pub const SWITCH_MULTILEVEL: u8 = 0x26;
    /// Binary Sensor
    pub const SENSOR_BINARY: u8 = 0x30;
    /// Multilevel Sensor
    pub const SENSOR_MULTILEVEL: u8 = 0x31;
    /// Meter
    pub const METER: u8 = 0x32;
    /// Configuration
    pub const CONFIGURATION: u8 = 0x70;
    /// Notification (Alarm in early revisions)
    pub const NOTIFICATION: u8 = 0x71;
    /// Manufacturer Specific
    pub const MANUFACTURER_SPECIFIC: u8 = 0x72;
    /// Battery
    pub const BATTERY: u8 = 0x80;
    /// Wake Up
    pub const WAKE_UP: u8 = 0x84;
    /// Association
    pub const ASSOCIATION: u8 = 0x85;
    /// Version
    pub const VERSION: u8 = 0x86;
}

/// Whether a node's supported command classes include Wake Up.
///
/// Battery devices that sleep between wake windows advertise this class;
/// the node model uses it to tell always-listening devices apart from
/// wakeup devices.
pub fn supports_wakeup(classes: &BTreeSet<u16>) -> bool {
    classes.contains(&u16::from(class_id::WAKE_UP))
}
