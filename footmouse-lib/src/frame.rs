//! # Footmouse wire framing
//!
//! Two firmware generations exist and each speaks exactly one framing:
//!
//! - **Structured** (115200 baud): a fixed 16-byte little-endian header
//!   followed by the payload.
//!
//!   ```text
//!   offset 0  : u32 start_of_frame = 0xFFFFFFFF
//!   offset 4  : u32 payload_length
//!   offset 8  : u32 integrity (reserved, never verified)
//!   offset 12 : u32 command_code
//!   offset 16 : payload
//!   ```
//!
//! - **Legacy** (9600 baud): `0x10, command, payload.., 0x11`. There is no
//!   length field and payload bytes equal to either marker are not escaped,
//!   so a payload containing 16 or 17 is ambiguous on the wire.
//!
//! Both sit behind [`FrameCodec`]; pick one with [`ProtocolVersion::codec`].

use crate::constants::{
    HEADER_SIZE, INTEGRITY_PLACEHOLDER, LEGACY_BAUD_RATE, LEGACY_MAX_MESSAGE, LEGACY_START_MARKER, LEGACY_STOP_MARKER,
    MAX_PAYLOAD_SIZE, START_OF_FRAME, STRUCTURED_BAUD_RATE,
};
use crate::error::{FootMouseError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use strum_macros::Display;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw structured header exactly as it sits on the wire.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameHeaderRaw {
    pub start_of_frame: U32,
    pub payload_length: U32,
    pub integrity: U32,
    pub command: U32,
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u32,
    /// Only the structured framing carries this field
    pub integrity: Option<u32>,
    pub payload: Bytes,
}

impl Frame {
    /// True when the integrity field holds the CRC-32 of the payload.
    ///
    /// Decoding never enforces this; callers that opted into checksums can.
    pub fn checksum_matches(&self) -> bool {
        self.integrity == Some(crc32fast::hash(&self.payload))
    }
}

/// Turns a command code and payload into wire bytes, and back.
pub trait FrameCodec: Send + Sync + fmt::Debug {
    fn encode(&self, command: u32, payload: &[u8]) -> Result<Bytes>;

    fn decode(&self, bytes: &[u8]) -> Result<Frame>;

    /// Largest payload `encode` accepts
    fn max_payload(&self) -> usize;
}

/// Which firmware generation we are talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtocolVersion {
    #[default]
    #[strum(to_string = "structured")]
    Structured,
    #[strum(to_string = "legacy")]
    Legacy,
}

impl ProtocolVersion {
    pub fn codec(&self) -> Box<dyn FrameCodec> {
        match self {
            ProtocolVersion::Structured => Box::new(StructuredCodec::new()),
            ProtocolVersion::Legacy => Box::new(LegacyCodec),
        }
    }

    /// The baud rate firmware of this generation listens at
    pub fn baud_rate(&self) -> u32 {
        match self {
            ProtocolVersion::Structured => STRUCTURED_BAUD_RATE,
            ProtocolVersion::Legacy => LEGACY_BAUD_RATE,
        }
    }
}

/// Length-prefixed framing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredCodec {
    checksum: bool,
}

impl StructuredCodec {
    pub fn new() -> Self {
        Self { checksum: false }
    }

    /// Fill the integrity field with the payload's CRC-32 instead of the placeholder.
    pub fn with_checksum(mut self) -> Self {
        self.checksum = true;
        self
    }
}

impl FrameCodec for StructuredCodec {
    fn encode(&self, command: u32, payload: &[u8]) -> Result<Bytes> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FootMouseError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let integrity = if self.checksum {
            crc32fast::hash(payload)
        } else {
            INTEGRITY_PLACEHOLDER
        };
        let header = FrameHeaderRaw {
            start_of_frame: START_OF_FRAME.into(),
            payload_length: (payload.len() as u32).into(),
            integrity: integrity.into(),
            command: command.into(),
        };

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        frame.put_slice(header.as_bytes());
        frame.put_slice(payload);
        Ok(frame.freeze())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        let insufficient = FootMouseError::InsufficientData {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        };
        if bytes.len() < HEADER_SIZE {
            return Err(insufficient);
        }
        let (header, rest) = FrameHeaderRaw::ref_from_prefix(bytes).map_err(|_| insufficient)?;

        let sof = header.start_of_frame.get();
        if sof != START_OF_FRAME {
            return Err(FootMouseError::BadStartOfFrame(sof));
        }

        let declared = header.payload_length.get() as usize;
        if declared > MAX_PAYLOAD_SIZE {
            return Err(FootMouseError::PayloadTooLarge {
                len: declared,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        if rest.len() != declared {
            return Err(FootMouseError::PayloadLengthMismatch {
                declared,
                actual: rest.len(),
            });
        }

        Ok(Frame {
            command: header.command.get(),
            integrity: Some(header.integrity.get()),
            payload: Bytes::copy_from_slice(rest),
        })
    }

    fn max_payload(&self) -> usize {
        MAX_PAYLOAD_SIZE
    }
}

/// Delimiter framing spoken by the 9600 baud firmware.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyCodec;

impl FrameCodec for LegacyCodec {
    fn encode(&self, command: u32, payload: &[u8]) -> Result<Bytes> {
        let command = u8::try_from(command).map_err(|_| FootMouseError::CommandCodeOutOfRange(command))?;
        if payload.len() > self.max_payload() {
            return Err(FootMouseError::PayloadTooLarge {
                len: payload.len(),
                max: self.max_payload(),
            });
        }

        let mut frame = BytesMut::with_capacity(payload.len() + 3);
        frame.put_u8(LEGACY_START_MARKER);
        frame.put_u8(command);
        frame.put_slice(payload);
        frame.put_u8(LEGACY_STOP_MARKER);
        Ok(frame.freeze())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Frame> {
        if bytes.len() < 3 {
            return Err(FootMouseError::InsufficientData {
                expected: 3,
                actual: bytes.len(),
            });
        }
        if bytes[0] != LEGACY_START_MARKER {
            return Err(FootMouseError::MissingMarker("start"));
        }
        if bytes[bytes.len() - 1] != LEGACY_STOP_MARKER {
            return Err(FootMouseError::MissingMarker("stop"));
        }

        Ok(Frame {
            command: bytes[1] as u32,
            integrity: None,
            payload: Bytes::copy_from_slice(&bytes[2..bytes.len() - 1]),
        })
    }

    fn max_payload(&self) -> usize {
        // the command byte shares the firmware buffer
        LEGACY_MAX_MESSAGE - 1
    }
}
