//! # zwave-rs
//!
//! A Z-Wave hub protocol stack: the binary control protocol spoken
//! with the radio controller, a command class table for resolving and
//! validating device commands, and the node lifecycle model a hub
//! agent keeps for every paired device.
//!
//! # Architecture
//!
//! - [`protocol`]: wire envelope codec and the tag-driven multiplexer
//!   over the typed message set, including recursive command batches
//! - [`cmdclass`]: immutable command class registry mapping numeric
//!   class/command ids to payload descriptors
//! - [`node`]: per-device identity, capability, and health record;
//!   pairing builder; network registry backed by a persistent store
//! - [`events`]: synchronous pub/sub for node lifecycle transitions
//! - [`health`]: periodic liveness sweep flipping silent nodes offline
//!   (feature `async`)
//!
//! Inbound bytes flow through the protocol layer into typed messages,
//! command payloads are validated against the registry, node liveness
//! is refreshed as traffic arrives, and state transitions fan out to
//! event listeners.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zwave_rs::events::EventDispatcher;
//! use zwave_rs::node::{MemoryNodeStore, ZWaveNetwork};
//! use zwave_rs::protocol::{ZWaveMessage, ZWaveProtocol};
//!
//! // Wire codec
//! let protocol = ZWaveProtocol::standard();
//! let message = ZWaveMessage::Command {
//!     node_id: 5,
//!     command_class_id: 0x20,
//!     command_id: 0x01,
//!     payload: vec![0xFF],
//! };
//! let wire = protocol.serialize(&message)?;
//!
//! // Node registry
//! let dispatcher = Arc::new(EventDispatcher::new());
//! let network = ZWaveNetwork::new(Arc::new(MemoryNodeStore::new()), dispatcher);
//! network.initialize(0x00C0FFEE)?;
//! network.node_heard_from(5);
//! ```
//!
//! # Features
//!
//! - `std` (default): standard library support
//! - `async` (default): tokio-based health monitor
//! - `serde` (default): node record serialization for the store
//!   boundary

pub mod cmdclass;
pub mod events;
#[cfg(feature = "async")]
pub mod health;
pub mod node;
pub mod protocol;

pub use cmdclass::CommandClassRegistry;
pub use events::{EventDispatcher, NodeEvent};
pub use node::{ZWaveNetwork, ZWaveNode, ZWaveNodeBuilder};
pub use protocol::{Message, ZWaveMessage, ZWaveProtocol};

#[cfg(feature = "async")]
pub use health::{HealthConfig, HealthMonitor, NodeProbe};
