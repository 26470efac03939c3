//! Typed control messages and the tag-driven multiplexer.

use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::cmdclass::{CommandClassRegistry, CommandParseError};

use super::frame::{FrameError, Message};

/// Errors raised while encoding a typed message to the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Envelope framing failed
    #[error("framing failed: {0}")]
    Frame(#[from] FrameError),

    /// An embedded byte sequence does not fit its four byte length prefix
    #[error("embedded payload of {0} bytes exceeds the length field")]
    PayloadTooLarge(usize),
}

/// Errors raised while decoding wire bytes into a typed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Envelope truncated or garbled
    #[error("malformed frame: {0}")]
    Frame(#[from] FrameError),

    /// Type tag not assigned to any message
    #[error("unknown message type 0x{0:02X}")]
    UnknownMessageType(u8),

    /// Payload ended before a fixed field
    #[error("message payload truncated: need {expected} bytes, got {actual}")]
    PayloadTruncated {
        /// Bytes the current field requires
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Command class id absent from the registry
    #[error("unknown command class 0x{0:02X}")]
    UnknownCommandClass(u8),

    /// Command id absent from its command class
    #[error("unknown command 0x{command_id:02X} for class 0x{command_class_id:02X}")]
    UnknownCommand {
        /// Class the command was looked up in
        command_class_id: u8,
        /// Command id that failed the lookup
        command_id: u8,
    },

    /// Resolved command rejected its payload
    #[error("command payload parse failed: {0}")]
    CommandPayload(#[from] CommandParseError),

    /// Schedule messages are outbound only
    #[error("schedule messages are sent by the hub, never received")]
    ScheduleNotReceivable,
}

/// Control messages exchanged with the radio controller, one wire tag
/// per variant.
///
/// Batch wrappers carry no address of their own; each nested `Command`
/// addresses its own node. This asymmetry is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZWaveMessage {
    /// One command-class command addressed to one node
    Command {
        /// Target node
        node_id: u8,
        /// Command class selecting the command set
        command_class_id: u8,
        /// Command within the class
        command_id: u8,
        /// Command-specific bytes
        payload: Vec<u8>,
    },

    /// Commands the device executes strictly in order
    OrderedCommands {
        /// Nested messages, executed first to last
        commands: Vec<ZWaveMessage>,
    },

    /// Commands the device executes after a fixed delay
    DelayedCommands {
        /// Seconds to wait before executing
        delay_seconds: u32,
        /// Nested messages, executed first to last
        commands: Vec<ZWaveMessage>,
    },

    /// Node protocol information reported during discovery
    NodeInfo {
        /// Reporting node
        node_id: u8,
        /// Protocol status byte
        status: u8,
        /// Basic device type
        basic_type: u8,
        /// Generic device type
        generic_type: u8,
        /// Specific device type
        specific_type: u8,
    },

    /// Configure how long a node may stay silent before probing
    SetOfflineTimeout {
        /// Target node
        node_id: u8,
        /// Timeout in seconds, 0 disables the policy
        seconds: u32,
    },

    /// Install a recurring command schedule on a node (outbound only)
    SetSchedule {
        /// Target node
        node_id: u8,
        /// Schedule period in seconds
        seconds: u32,
        /// Raw command payloads the node replays each period
        schedule: Vec<Vec<u8>>,
    },
}

impl ZWaveMessage {
    /// Wire tag for `Command`
    pub const COMMAND: u8 = 0x01;

    /// Wire tag for `OrderedCommands`
    pub const ORDERED_COMMANDS: u8 = 0x02;

    /// Wire tag for `DelayedCommands`
    pub const DELAYED_COMMANDS: u8 = 0x03;

    /// Wire tag for `NodeInfo`
    pub const NODE_INFO: u8 = 0x04;

    /// Wire tag for `SetOfflineTimeout`
    pub const SET_OFFLINE_TIMEOUT: u8 = 0x05;

    /// Wire tag for `SetSchedule`
    pub const SET_SCHEDULE: u8 = 0x06;

    /// Wire tag this variant encodes under.
    pub fn wire_type(&self) -> u8 {
        match self {
            Self::Command { .. } => Self::COMMAND,
            Self::OrderedCommands { .. } => Self::ORDERED_COMMANDS,
            Self::DelayedCommands { .. } => Self::DELAYED_COMMANDS,
            Self::NodeInfo { .. } => Self::NODE_INFO,
            Self::SetOfflineTimeout { .. } => Self::SET_OFFLINE_TIMEOUT,
            Self::SetSchedule { .. } => Self::SET_SCHEDULE,
        }
    }

    /// Node this message addresses, if the variant carries one.
    ///
    /// Batch wrappers return `None`; their nested commands each carry
    /// their own address.
    pub fn node_id(&self) -> Option<u8> {
        match self {
            Self::Command { node_id, .. }
            | Self::NodeInfo { node_id, .. }
            | Self::SetOfflineTimeout { node_id, .. }
            | Self::SetSchedule { node_id, .. } => Some(*node_id),
            Self::OrderedCommands { .. } | Self::DelayedCommands { .. } => None,
        }
    }
}

/// Tag-driven codec between [`Message`] envelopes and [`ZWaveMessage`]
/// values.
///
/// Constructed explicitly and shared by handle; command payload
/// validation runs against the command class table the protocol owns.
#[derive(Debug, Clone)]
pub struct ZWaveProtocol {
    registry: Arc<CommandClassRegistry>,
}

impl ZWaveProtocol {
    /// Command payload fixed fields: node, class, command, length prefix
    const COMMAND_FIXED_SIZE: usize = 7;

    /// Create a protocol codec over an explicit command class table.
    pub fn new(registry: Arc<CommandClassRegistry>) -> Self {
        Self { registry }
    }

    /// Create a protocol codec over the standard command class table.
    pub fn standard() -> Self {
        Self::new(Arc::new(CommandClassRegistry::standard()))
    }

    /// Command class table this codec validates against.
    pub fn registry(&self) -> &CommandClassRegistry {
        &self.registry
    }

    /// Shared handle to the command class table.
    pub fn registry_handle(&self) -> Arc<CommandClassRegistry> {
        Arc::clone(&self.registry)
    }

    /// Encode a typed message into a wire envelope.
    pub fn mux(&self, message: &ZWaveMessage) -> Result<Message, EncodeError> {
        let payload = match message {
            ZWaveMessage::Command {
                node_id,
                command_class_id,
                command_id,
                payload,
            } => Self::encode_command(*node_id, *command_class_id, *command_id, payload)?,
            ZWaveMessage::OrderedCommands { commands } => self.encode_ordered(commands)?,
            ZWaveMessage::DelayedCommands {
                delay_seconds,
                commands,
            } => self.encode_delayed(*delay_seconds, commands)?,
            ZWaveMessage::NodeInfo {
                node_id,
                status,
                basic_type,
                generic_type,
                specific_type,
            } => vec![*node_id, *status, *basic_type, *generic_type, *specific_type],
            ZWaveMessage::SetOfflineTimeout { node_id, seconds } => {
                let mut buf = BytesMut::with_capacity(5);
                buf.put_u8(*node_id);
                buf.put_u32(*seconds);
                buf.to_vec()
            }
            ZWaveMessage::SetSchedule {
                node_id,
                seconds,
                schedule,
            } => Self::encode_schedule(*node_id, *seconds, schedule)?,
        };

        Ok(Message::new(message.wire_type(), payload))
    }

    /// Decode a wire envelope into a typed message.
    ///
    /// `Command` payloads are validated against the command class table;
    /// batch tags recurse into their nested envelopes and fail as a
    /// whole if any nested message fails.
    pub fn demux(&self, message: &Message) -> Result<ZWaveMessage, DecodeError> {
        match message.message_type {
            ZWaveMessage::COMMAND => self.decode_command(&message.payload),
            ZWaveMessage::ORDERED_COMMANDS => self.decode_ordered(&message.payload),
            ZWaveMessage::DELAYED_COMMANDS => self.decode_delayed(&message.payload),
            ZWaveMessage::NODE_INFO => Self::decode_node_info(&message.payload),
            ZWaveMessage::SET_OFFLINE_TIMEOUT => Self::decode_offline_timeout(&message.payload),
            ZWaveMessage::SET_SCHEDULE => Err(DecodeError::ScheduleNotReceivable),
            other => Err(DecodeError::UnknownMessageType(other)),
        }
    }

    /// Encode a typed message all the way to wire bytes.
    pub fn serialize(&self, message: &ZWaveMessage) -> Result<BytesMut, EncodeError> {
        Ok(self.mux(message)?.encode()?)
    }

    /// Decode one typed message from the front of the buffer, advancing
    /// it.
    pub fn deserialize(&self, buf: &mut Bytes) -> Result<ZWaveMessage, DecodeError> {
        let envelope = Message::decode(buf)?;
        self.demux(&envelope)
    }

    fn encode_command(
        node_id: u8,
        command_class_id: u8,
        command_id: u8,
        payload: &[u8],
    ) -> Result<Vec<u8>, EncodeError> {
        let length =
            u32::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLarge(payload.len()))?;

        let mut buf = BytesMut::with_capacity(Self::COMMAND_FIXED_SIZE + payload.len());

        // Node address and command selector
        buf.put_u8(node_id);
        buf.put_u8(command_class_id);
        buf.put_u8(command_id);

        // Command payload, length prefixed
        buf.put_u32(length);
        buf.put_slice(payload);

        Ok(buf.to_vec())
    }

    fn encode_ordered(&self, commands: &[ZWaveMessage]) -> Result<Vec<u8>, EncodeError> {
        let mut buf = BytesMut::new();

        // Nested message count
        buf.put_u32(Self::nested_count(commands)?);

        // Each nested message as a full envelope
        for command in commands {
            self.mux(command)?.encode_into(&mut buf)?;
        }

        Ok(buf.to_vec())
    }

    fn encode_delayed(
        &self,
        delay_seconds: u32,
        commands: &[ZWaveMessage],
    ) -> Result<Vec<u8>, EncodeError> {
        let mut buf = BytesMut::new();

        // Delay before execution
        buf.put_u32(delay_seconds);

        // Nested message count
        buf.put_u32(Self::nested_count(commands)?);

        // Each nested message as a full envelope
        for command in commands {
            self.mux(command)?.encode_into(&mut buf)?;
        }

        Ok(buf.to_vec())
    }

    fn encode_schedule(
        node_id: u8,
        seconds: u32,
        schedule: &[Vec<u8>],
    ) -> Result<Vec<u8>, EncodeError> {
        let count = u32::try_from(schedule.len())
            .map_err(|_| EncodeError::PayloadTooLarge(schedule.len()))?;

        let mut buf = BytesMut::new();

        // Target node and period
        buf.put_u8(node_id);
        buf.put_u32(seconds);

        // Schedule entries, each length prefixed
        buf.put_u32(count);
        for entry in schedule {
            let length = u32::try_from(entry.len())
                .map_err(|_| EncodeError::PayloadTooLarge(entry.len()))?;
            buf.put_u32(length);
            buf.put_slice(entry);
        }

        Ok(buf.to_vec())
    }

    fn nested_count(commands: &[ZWaveMessage]) -> Result<u32, EncodeError> {
        u32::try_from(commands.len()).map_err(|_| EncodeError::PayloadTooLarge(commands.len()))
    }

    fn decode_command(&self, payload: &[u8]) -> Result<ZWaveMessage, DecodeError> {
        let mut buf = Bytes::copy_from_slice(payload);
        if buf.len() < Self::COMMAND_FIXED_SIZE {
            return Err(DecodeError::PayloadTruncated {
                expected: Self::COMMAND_FIXED_SIZE,
                actual: buf.len(),
            });
        }

        // Node address and command selector
        let node_id = buf.get_u8();
        let command_class_id = buf.get_u8();
        let command_id = buf.get_u8();

        // Command payload, length prefixed; trailing bytes are tolerated
        let declared = buf.get_u32() as usize;
        if buf.len() < declared {
            return Err(DecodeError::PayloadTruncated {
                expected: declared,
                actual: buf.len(),
            });
        }
        let command_payload = buf.split_to(declared).to_vec();

        // Resolve and validate against the command class table
        let class = self
            .registry
            .lookup(command_class_id)
            .ok_or(DecodeError::UnknownCommandClass(command_class_id))?;
        let descriptor = class.get(command_id).ok_or(DecodeError::UnknownCommand {
            command_class_id,
            command_id,
        })?;
        descriptor.parse_payload(&command_payload)?;

        Ok(ZWaveMessage::Command {
            node_id,
            command_class_id,
            command_id,
            payload: command_payload,
        })
    }

    fn decode_ordered(&self, payload: &[u8]) -> Result<ZWaveMessage, DecodeError> {
        let mut buf = Bytes::copy_from_slice(payload);
        if buf.len() < 4 {
            return Err(DecodeError::PayloadTruncated {
                expected: 4,
                actual: buf.len(),
            });
        }

        let count = buf.get_u32();
        let commands = self.decode_nested(&mut buf, count)?;

        Ok(ZWaveMessage::OrderedCommands { commands })
    }

    fn decode_delayed(&self, payload: &[u8]) -> Result<ZWaveMessage, DecodeError> {
        let mut buf = Bytes::copy_from_slice(payload);
        if buf.len() < 8 {
            return Err(DecodeError::PayloadTruncated {
                expected: 8,
                actual: buf.len(),
            });
        }

        let delay_seconds = buf.get_u32();
        let count = buf.get_u32();
        let commands = self.decode_nested(&mut buf, count)?;

        Ok(ZWaveMessage::DelayedCommands {
            delay_seconds,
            commands,
        })
    }

    /// Decode `count` nested envelopes in order, failing the whole
    /// batch on the first bad entry.
    fn decode_nested(&self, buf: &mut Bytes, count: u32) -> Result<Vec<ZWaveMessage>, DecodeError> {
        let mut commands = Vec::new();
        for _ in 0..count {
            let envelope = Message::decode(buf)?;
            commands.push(self.demux(&envelope)?);
        }
        Ok(commands)
    }

    fn decode_node_info(payload: &[u8]) -> Result<ZWaveMessage, DecodeError> {
        if payload.len() < 5 {
            return Err(DecodeError::PayloadTruncated {
                expected: 5,
                actual: payload.len(),
            });
        }

        Ok(ZWaveMessage::NodeInfo {
            node_id: payload[0],
            status: payload[1],
            basic_type: payload[2],
            generic_type: payload[3],
            specific_type: payload[4],
        })
    }

    fn decode_offline_timeout(payload: &[u8]) -> Result<ZWaveMessage, DecodeError> {
        let mut buf = Bytes::copy_from_slice(payload);
        if buf.len() < 5 {
            return Err(DecodeError::PayloadTruncated {
                expected: 5,
                actual: buf.len(),
            });
        }

        let node_id = buf.get_u8();
        let seconds = buf.get_u32();

        Ok(ZWaveMessage::SetOfflineTimeout { node_id, seconds })
    }
}

impl Default for ZWaveProtocol {
    fn default() -> Self {
        Self::standard()
    }
}
