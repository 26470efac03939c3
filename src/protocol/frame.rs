//! Outer wire envelope: type tag plus length-prefixed payload.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Envelope framing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Buffer shorter than the fixed five byte header
    #[error("frame header truncated: need {expected} bytes, got {actual}")]
    HeaderTruncated {
        /// Header size the codec requires
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Declared payload length exceeds the bytes that follow the header
    #[error("frame payload truncated: declared {declared} bytes, {available} available")]
    PayloadTruncated {
        /// Payload length the header declares
        declared: usize,
        /// Bytes actually available after the header
        available: usize,
    },

    /// Payload does not fit the four byte length field
    #[error("payload of {0} bytes exceeds the length field")]
    PayloadTooLarge(usize),
}

/// Wire envelope carrying one message.
///
/// Layout, all numeric fields big-endian:
///
/// ```text
/// +--------+-----------+-------------+
/// | Byte 0 | Bytes 1-4 | Bytes 5..   |
/// +--------+-----------+-------------+
/// | Type   | Length    | Payload     |
/// +--------+-----------+-------------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Type tag selecting the payload codec
    pub message_type: u8,

    /// Raw payload bytes, interpreted per the type tag
    pub payload: Vec<u8>,
}

impl Message {
    /// Fixed header size: type tag plus four length bytes
    pub const HEADER_SIZE: usize = 5;

    /// Create a new envelope.
    pub fn new(message_type: u8, payload: Vec<u8>) -> Self {
        Self {
            message_type,
            payload,
        }
    }

    /// Total size of the encoded envelope.
    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    /// Encode to a fresh buffer.
    pub fn encode(&self) -> Result<BytesMut, FrameError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Append the encoded envelope to an existing buffer.
    pub fn encode_into(&self, buf: &mut BytesMut) -> Result<(), FrameError> {
        let length = u32::try_from(self.payload.len())
            .map_err(|_| FrameError::PayloadTooLarge(self.payload.len()))?;

        // Type tag
        buf.put_u8(self.message_type);

        // Payload length
        buf.put_u32(length);

        // Payload
        buf.put_slice(&self.payload);

        Ok(())
    }

    /// Decode one envelope from the front of the buffer, advancing it.
    ///
    /// The cursor stops right after this envelope's payload, so nested
    /// message lists decode sequentially from one buffer.
    pub fn decode(buf: &mut Bytes) -> Result<Self, FrameError> {
        if buf.len() < Self::HEADER_SIZE {
            return Err(FrameError::HeaderTruncated {
                expected: Self::HEADER_SIZE,
                actual: buf.len(),
            });
        }

        // Type tag
        let message_type = buf.get_u8();

        // Payload length
        let declared = buf.get_u32() as usize;
        if buf.len() < declared {
            return Err(FrameError::PayloadTruncated {
                declared,
                available: buf.len(),
            });
        }

        // Payload
        let payload = buf.split_to(declared).to_vec();

        Ok(Self {
            message_type,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let message = Message::new(0x01, vec![0xDE, 0xAD, 0xBE, 0xEF]);

        let encoded = message.encode().unwrap();
        assert_eq!(encoded.len(), message.encoded_len());
        assert_eq!(&encoded[..5], &[0x01, 0x00, 0x00, 0x00, 0x04]);

        let mut bytes = encoded.freeze();
        let decoded = Message::decode(&mut bytes).unwrap();
        assert_eq!(decoded, message);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_decode_empty_payload() {
        let message = Message::new(0x04, Vec::new());

        let mut bytes = message.encode().unwrap().freeze();
        let decoded = Message::decode(&mut bytes).unwrap();
        assert_eq!(decoded.payload, Vec::<u8>::new());
    }

    #[test]
    fn test_decode_leaves_following_bytes() {
        let first = Message::new(0x01, vec![0xAA]);
        let second = Message::new(0x02, vec![0xBB, 0xCC]);

        let mut buf = first.encode().unwrap();
        second.encode_into(&mut buf).unwrap();

        let mut bytes = buf.freeze();
        assert_eq!(Message::decode(&mut bytes).unwrap(), first);
        assert_eq!(Message::decode(&mut bytes).unwrap(), second);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_decode_rejects_short_header() {
        let mut bytes = Bytes::from_static(&[0x01, 0x00, 0x00]);

        let err = Message::decode(&mut bytes).unwrap_err();
        assert_eq!(
            err,
            FrameError::HeaderTruncated {
                expected: Message::HEADER_SIZE,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let mut bytes = Bytes::from_static(&[0x01, 0x00, 0x00, 0x00, 0x04, 0xAA, 0xBB]);

        let err = Message::decode(&mut bytes).unwrap_err();
        assert_eq!(
            err,
            FrameError::PayloadTruncated {
                declared: 4,
                available: 2,
            }
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_envelope_round_trip(
                message_type in any::<u8>(),
                payload in proptest::collection::vec(any::<u8>(), 0..512),
            ) {
                let message = Message::new(message_type, payload);
                let mut bytes = message.encode().unwrap().freeze();
                let decoded = Message::decode(&mut bytes).unwrap();
                prop_assert_eq!(decoded, message);
                prop_assert!(bytes.is_empty());
            }
        }
    }
}
