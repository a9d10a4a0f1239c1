//! The footmouse instruction set.
//!
//! Every [`Command`] is a pure mapping to a command code and payload bytes;
//! nothing here touches the port. Layouts:
//!
//! | command                  | payload                                         |
//! |--------------------------|-------------------------------------------------|
//! | `Identify`               | empty                                           |
//! | `Echo`                   | ASCII text, NUL terminated                      |
//! | `ResetButtonsToDefault`  | `[0, 0, 0]`                                     |
//! | `SetButtonFunction`      | `[button, mode, inverted]`                      |
//! | `SetButtonFunctionEx`    | `[button, inverted, count, u16le keys..]`       |
//! | `TypeAsciiString`        | ASCII text, NUL terminated                      |
//! | `SetSavedAsciiString`    | ASCII text, NUL terminated                      |
//! | `TypeSavedAsciiString`   | empty                                           |

use crate::error::{FootMouseError, Result};
use crate::frame::FrameCodec;
use crate::keycode::KeyCombo;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum CommandCode {
    Identify = 4,
    SetButtonFunction = 5,
    ResetButtonsToDefault = 6,
    Echo = 7,
    TypeAsciiString = 8,
    SetSavedAsciiString = 10,
    TypeSavedAsciiString = 11,
    // not present in the firmware's message table yet
    SetButtonFunctionEx = 12,
}

/// Behaviour assigned to a pedal.
///
/// Values track the latest firmware. Control-click moved from 16 to 15 at
/// some point; older boards may still expect 16, send it as `Other(16)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ButtonMode {
    None = 0,
    Left = 1,
    Right = 2,
    Middle = 4,
    Double = 8,
    ControlClick = 15,
    ShiftClick = 18,
    ShiftMiddleClick = 19,
    Alternate = 32,
    Anywhere = 64,
    Function = 65,
    Orbit = 67,
    KeyCombo = 68,

    #[num_enum(catch_all)]
    Other(u8),
}

impl ButtonMode {
    pub const ALL: [ButtonMode; 13] = [
        ButtonMode::None,
        ButtonMode::Left,
        ButtonMode::Right,
        ButtonMode::Middle,
        ButtonMode::Double,
        ButtonMode::ControlClick,
        ButtonMode::ShiftClick,
        ButtonMode::ShiftMiddleClick,
        ButtonMode::Alternate,
        ButtonMode::Anywhere,
        ButtonMode::Function,
        ButtonMode::Orbit,
        ButtonMode::KeyCombo,
    ];

    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            ButtonMode::None => "none",
            ButtonMode::Left => "left",
            ButtonMode::Right => "right",
            ButtonMode::Middle => "middle",
            ButtonMode::Double => "double",
            ButtonMode::ControlClick => "control-click",
            ButtonMode::ShiftClick => "shift-click",
            ButtonMode::ShiftMiddleClick => "shift-middle-click",
            ButtonMode::Alternate => "alternate",
            ButtonMode::Anywhere => "anywhere",
            ButtonMode::Function => "function",
            ButtonMode::Orbit => "orbit",
            ButtonMode::KeyCombo => "keycombo",
            ButtonMode::Other(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for ButtonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "mode {}", u8::from(*self)),
        }
    }
}

impl FromStr for ButtonMode {
    type Err = FootMouseError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(value) = s.parse::<u8>() {
            return Ok(ButtonMode::from_primitive(value));
        }
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        ButtonMode::ALL
            .into_iter()
            .find(|mode| mode.name() == Some(wanted.as_str()))
            .ok_or_else(|| FootMouseError::UnknownButtonMode(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Identify,
    Echo(String),
    ResetButtonsToDefault,
    SetButtonFunction {
        button: u8,
        mode: ButtonMode,
        inverted: bool,
    },
    SetButtonFunctionEx {
        button: u8,
        inverted: bool,
        combo: KeyCombo,
    },
    TypeAsciiString(String),
    SetSavedAsciiString(String),
    TypeSavedAsciiString,
}

impl Command {
    pub fn code(&self) -> CommandCode {
        match self {
            Command::Identify => CommandCode::Identify,
            Command::Echo(_) => CommandCode::Echo,
            Command::ResetButtonsToDefault => CommandCode::ResetButtonsToDefault,
            Command::SetButtonFunction { .. } => CommandCode::SetButtonFunction,
            Command::SetButtonFunctionEx { .. } => CommandCode::SetButtonFunctionEx,
            Command::TypeAsciiString(_) => CommandCode::TypeAsciiString,
            Command::SetSavedAsciiString(_) => CommandCode::SetSavedAsciiString,
            Command::TypeSavedAsciiString => CommandCode::TypeSavedAsciiString,
        }
    }

    /// Whether the device answers this command with a line of output
    pub fn expects_response(&self) -> bool {
        matches!(self, Command::Identify | Command::Echo(_))
    }

    pub fn payload(&self) -> Result<Bytes> {
        match self {
            Command::Identify | Command::TypeSavedAsciiString => Ok(Bytes::new()),
            Command::ResetButtonsToDefault => Ok(Bytes::from_static(&[0, 0, 0])),
            Command::Echo(text) | Command::TypeAsciiString(text) | Command::SetSavedAsciiString(text) => {
                ascii_payload(text)
            }
            Command::SetButtonFunction { button, mode, inverted } => {
                Ok(Bytes::copy_from_slice(&[*button, u8::from(*mode), *inverted as u8]))
            }
            Command::SetButtonFunctionEx { button, inverted, combo } => {
                let keys = combo.encode()?;
                // KeyCombo guarantees 1..=255 keys, each two bytes
                debug_assert_eq!(keys.len(), combo.len() * 2);
                let mut payload = BytesMut::with_capacity(3 + keys.len());
                payload.put_u8(*button);
                payload.put_u8(*inverted as u8);
                payload.put_u8(combo.len() as u8);
                payload.put_slice(&keys);
                Ok(payload.freeze())
            }
        }
    }

    /// Payload wrapped in `codec`'s framing, ready for the wire
    pub fn encode(&self, codec: &dyn FrameCodec) -> Result<Bytes> {
        codec.encode(self.code().into(), &self.payload()?)
    }
}

/// Strict 7-bit ASCII copy of `text` with a trailing NUL.
pub fn ascii_payload(text: &str) -> Result<Bytes> {
    if let Some((index, ch)) = text.char_indices().find(|(_, ch)| !ch.is_ascii()) {
        return Err(FootMouseError::NonAsciiText { index, ch });
    }
    let mut payload = BytesMut::with_capacity(text.len() + 1);
    payload.put_slice(text.as_bytes());
    payload.put_u8(0x00);
    Ok(payload.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::{Key, MODIFIERKEY_CTRL};

    #[test]
    fn test_mode_values() {
        assert_eq!(u8::from(ButtonMode::Left), 1);
        assert_eq!(u8::from(ButtonMode::Right), 2);
        assert_eq!(u8::from(ButtonMode::Middle), 4);
        assert_eq!(u8::from(ButtonMode::Double), 8);
        assert_eq!(u8::from(ButtonMode::ControlClick), 15);
        assert_eq!(u8::from(ButtonMode::Alternate), 32);
        assert_eq!(u8::from(ButtonMode::Orbit), 67);
        assert_eq!(u8::from(ButtonMode::KeyCombo), 68);
        assert_eq!(ButtonMode::from_primitive(16), ButtonMode::Other(16));
        assert_eq!(u8::from(ButtonMode::Other(16)), 16);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("double".parse::<ButtonMode>().unwrap(), ButtonMode::Double);
        assert_eq!("Control Click".parse::<ButtonMode>().unwrap(), ButtonMode::ControlClick);
        assert_eq!("shift_middle_click".parse::<ButtonMode>().unwrap(), ButtonMode::ShiftMiddleClick);
        assert_eq!("8".parse::<ButtonMode>().unwrap(), ButtonMode::Double);
        assert_eq!("99".parse::<ButtonMode>().unwrap(), ButtonMode::Other(99));
        assert!(matches!(
            "sideways".parse::<ButtonMode>(),
            Err(FootMouseError::UnknownButtonMode(_))
        ));
        for mode in ButtonMode::ALL {
            assert_eq!(mode.to_string().parse::<ButtonMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_ascii_payload() {
        assert_eq!(ascii_payload("hi").unwrap().as_ref(), b"hi\0");
        assert_eq!(ascii_payload("").unwrap().as_ref(), b"\0");
        assert!(matches!(
            ascii_payload("naïve"),
            Err(FootMouseError::NonAsciiText { index: 2, ch: 'ï' })
        ));
    }

    #[test]
    fn test_keycombo_payload() {
        let combo = KeyCombo::new([Key::Code(MODIFIERKEY_CTRL), Key::Char('v')]).unwrap();
        let cmd = Command::SetButtonFunctionEx {
            button: 1,
            inverted: true,
            combo,
        };
        assert_eq!(cmd.code(), CommandCode::SetButtonFunctionEx);
        assert_eq!(cmd.payload().unwrap().as_ref(), &[1, 1, 2, 0x01, 0xE0, b'v', 0x00]);
    }

    #[test]
    fn test_response_expectations() {
        assert!(Command::Identify.expects_response());
        assert!(Command::Echo("x".into()).expects_response());
        assert!(!Command::TypeSavedAsciiString.expects_response());
        assert!(!Command::TypeAsciiString("x".into()).expects_response());
    }
}
