//! Z-Wave hub wire protocol
//!
//! Implements the binary control protocol spoken between the hub agent
//! and the Z-Wave radio controller: an outer envelope codec and a
//! tag-driven multiplexer over the typed message set.
//!
//! # Architecture
//!
//! The protocol is layered:
//! - **Envelope** ([`Message`]): type tag plus length-prefixed payload,
//!   all numeric fields big-endian
//! - **Multiplexer** ([`ZWaveProtocol`]): selects the payload codec by
//!   type tag, producing a typed [`ZWaveMessage`]
//! - **Batches**: `OrderedCommands` and `DelayedCommands` nest full
//!   envelopes recursively, decoded fail-fast in order
//!
//! Inbound `Command` payloads are validated against the command class
//! table before they are handed to drivers; outbound encoding never
//! consults the table, so the hub can address classes it does not
//! parse.
//!
//! # Protocol Details
//!
//! A `Command` envelope has the following layout:
//!
//! ```text
//! +--------+-----------+--------+--------+--------+------------+-----------+
//! | Byte 0 | Bytes 1-4 | Byte 5 | Byte 6 | Byte 7 | Bytes 8-11 | Bytes 12..|
//! +--------+-----------+--------+--------+--------+------------+-----------+
//! | Type   | Length    | Node   | Class  | Cmd    | Payload Len| Payload   |
//! +--------+-----------+--------+--------+--------+------------+-----------+
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use zwave_rs::protocol::{ZWaveMessage, ZWaveProtocol};
//!
//! let protocol = ZWaveProtocol::standard();
//!
//! // Encode a Basic Set for node 5
//! let message = ZWaveMessage::Command {
//!     node_id: 5,
//!     command_class_id: 0x20,
//!     command_id: 0x01,
//!     payload: vec![0xFF],
//! };
//! let wire = protocol.serialize(&message)?;
//!
//! // Decode whatever the controller sent back
//! let mut inbound = wire.freeze();
//! let decoded = protocol.deserialize(&mut inbound)?;
//! ```
//!
//! # Message Flow
//!
//! 1. **Inbound**: transport bytes are framed into [`Message`]
//!    envelopes, demultiplexed into [`ZWaveMessage`] values, and routed
//!    to drivers; node liveness is updated along the way
//! 2. **Outbound**: driver messages are multiplexed into envelopes and
//!    written to the transport
//! 3. **Errors**: a bad frame or command fails only that message; the
//!    channel and the node registry are unaffected

mod frame;
mod message;

pub use frame::{FrameError, Message};
pub use message::{DecodeError, EncodeError, ZWaveMessage, ZWaveProtocol};
