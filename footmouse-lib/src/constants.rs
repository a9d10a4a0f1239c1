// Protocol constants for the footmouse serial link

/// Start-of-frame marker for the length-prefixed protocol
pub const START_OF_FRAME: u32 = 0xFFFF_FFFF;

/// Size of the structured frame header (sof, length, integrity, command)
pub const HEADER_SIZE: usize = 16;

/// Largest payload the firmware's receive buffer accepts
pub const MAX_PAYLOAD_SIZE: usize = 512;

/// Value the firmware leaves in the integrity field when nothing is computed
pub const INTEGRITY_PLACEHOLDER: u32 = 0xDEAD_BEEF;

/// Legacy delimiter framing: start byte
pub const LEGACY_START_MARKER: u8 = 16;

/// Legacy delimiter framing: stop byte
pub const LEGACY_STOP_MARKER: u8 = 17;

/// Legacy firmware buffer, command byte included
pub const LEGACY_MAX_MESSAGE: usize = 256;

/// Baud rate spoken by length-prefixed firmware
pub const STRUCTURED_BAUD_RATE: u32 = 115_200;

/// Baud rate spoken by delimiter-framed firmware
pub const LEGACY_BAUD_RATE: u32 = 9_600;

/// What the device answers to an identify command
pub const DEVICE_ID_RESPONSE: &[u8] = b"footmouse\n";

/// Most keys a single combo can carry (count travels in one byte)
pub const MAX_KEYS_PER_COMBO: usize = u8::MAX as usize;
