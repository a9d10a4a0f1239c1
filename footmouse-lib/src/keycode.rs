//! Key identifiers for combo macros.
//!
//! The firmware's keyboard shim takes 16-bit codes: modifiers live at
//! `0xE0xx`, HID usages at `0xF0xx`, and anything below that is typed as
//! the ASCII character with the same value. Keys are sent as consecutive
//! little-endian `u16`s, in order, so `[ctrl, 'v']` is "hold ctrl, press v".

use crate::constants::MAX_KEYS_PER_COMBO;
use crate::error::{FootMouseError, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::str::FromStr;

pub const MODIFIERKEY_CTRL: u16 = 0x01 | 0xE000;
pub const MODIFIERKEY_SHIFT: u16 = 0x02 | 0xE000;
pub const MODIFIERKEY_ALT: u16 = 0x04 | 0xE000;
pub const MODIFIERKEY_GUI: u16 = 0x08 | 0xE000;
pub const MODIFIERKEY_RIGHT_CTRL: u16 = 0x10 | 0xE000;
pub const MODIFIERKEY_RIGHT_SHIFT: u16 = 0x20 | 0xE000;
pub const MODIFIERKEY_RIGHT_ALT: u16 = 0x40 | 0xE000;
pub const MODIFIERKEY_RIGHT_GUI: u16 = 0x80 | 0xE000;

const HID_USAGE_MASK: u16 = 0xF000;

pub const KEY_ENTER: u16 = 40 | HID_USAGE_MASK;
pub const KEY_ESC: u16 = 41 | HID_USAGE_MASK;
pub const KEY_BACKSPACE: u16 = 42 | HID_USAGE_MASK;
pub const KEY_TAB: u16 = 43 | HID_USAGE_MASK;
pub const KEY_SPACE: u16 = 44 | HID_USAGE_MASK;
pub const KEY_F1: u16 = 58 | HID_USAGE_MASK;
pub const KEY_HOME: u16 = 74 | HID_USAGE_MASK;
pub const KEY_DELETE: u16 = 76 | HID_USAGE_MASK;
pub const KEY_RIGHT: u16 = 79 | HID_USAGE_MASK;
pub const KEY_LEFT: u16 = 80 | HID_USAGE_MASK;
pub const KEY_DOWN: u16 = 81 | HID_USAGE_MASK;
pub const KEY_UP: u16 = 82 | HID_USAGE_MASK;
pub const KEY_F13: u16 = 104 | HID_USAGE_MASK;

const NAMED_KEYS: &[(&str, u16)] = &[
    ("ctrl", MODIFIERKEY_CTRL),
    ("control", MODIFIERKEY_CTRL),
    ("shift", MODIFIERKEY_SHIFT),
    ("alt", MODIFIERKEY_ALT),
    ("gui", MODIFIERKEY_GUI),
    ("win", MODIFIERKEY_GUI),
    ("rctrl", MODIFIERKEY_RIGHT_CTRL),
    ("rshift", MODIFIERKEY_RIGHT_SHIFT),
    ("ralt", MODIFIERKEY_RIGHT_ALT),
    ("rgui", MODIFIERKEY_RIGHT_GUI),
    ("enter", KEY_ENTER),
    ("esc", KEY_ESC),
    ("backspace", KEY_BACKSPACE),
    ("tab", KEY_TAB),
    ("space", KEY_SPACE),
    ("home", KEY_HOME),
    ("delete", KEY_DELETE),
    ("right", KEY_RIGHT),
    ("left", KEY_LEFT),
    ("down", KEY_DOWN),
    ("up", KEY_UP),
];

/// F1..F12 and F13..F24 sit in two contiguous usage ranges.
fn function_key(n: u16) -> Option<u16> {
    match n {
        1..=12 => Some(KEY_F1 + n - 1),
        13..=24 => Some(KEY_F13 + n - 13),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Code(u16),
    Char(char),
}

impl Key {
    /// The 16-bit value sent to the device. Characters become their ordinal.
    ///
    /// Only ASCII characters are accepted; anything else would alias the
    /// device's modifier and special-key ranges. Use [`Key::Code`] for those.
    pub fn code(&self) -> Result<u16> {
        match *self {
            Key::Code(code) => Ok(code),
            Key::Char(ch) if ch.is_ascii() => Ok(ch as u16),
            Key::Char(ch) => Err(FootMouseError::NonAsciiKey(ch)),
        }
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key::Code(code)
    }
}

impl From<char> for Key {
    fn from(ch: char) -> Self {
        Key::Char(ch)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Code(code) => match NAMED_KEYS.iter().find(|(_, c)| c == code) {
                Some((name, _)) => write!(f, "{}", name),
                None => write!(f, "{:#06x}", code),
            },
            Key::Char(ch) => write!(f, "{}", ch),
        }
    }
}

impl FromStr for Key {
    type Err = FootMouseError;

    /// Accepts a key name (`ctrl`, `f13`), a number (`0xE001`, `57345`) or a single character.
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if !ch.is_ascii() {
                return Err(FootMouseError::NonAsciiKey(ch));
            }
            return Ok(Key::Char(ch));
        }

        let lower = s.to_ascii_lowercase();
        if let Some((_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == lower) {
            return Ok(Key::Code(*code));
        }
        if let Some(code) = lower
            .strip_prefix('f')
            .and_then(|n| n.parse::<u16>().ok())
            .and_then(function_key)
        {
            return Ok(Key::Code(code));
        }
        let numeric = match lower.strip_prefix("0x") {
            Some(hex) => u16::from_str_radix(hex, 16).ok(),
            None => lower.parse::<u16>().ok(),
        };
        numeric.map(Key::Code).ok_or_else(|| FootMouseError::UnknownKey(s.to_string()))
    }
}

/// Concatenate the little-endian codes of `keys`. An empty slice encodes to nothing.
pub fn encode_keys(keys: &[Key]) -> Result<Bytes> {
    let mut out = BytesMut::with_capacity(keys.len() * 2);
    for key in keys {
        out.put_u16_le(key.code()?);
    }
    Ok(out.freeze())
}

/// An ordered macro of 1 to 255 keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    keys: Vec<Key>,
}

impl KeyCombo {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Result<Self> {
        let keys: Vec<Key> = keys.into_iter().collect();
        if keys.is_empty() || keys.len() > MAX_KEYS_PER_COMBO {
            return Err(FootMouseError::InvalidKeyCount(keys.len()));
        }
        // reject unencodable keys up front rather than at send time
        for key in &keys {
            key.code()?;
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn encode(&self) -> Result<Bytes> {
        encode_keys(&self.keys)
    }
}

impl FromStr for KeyCombo {
    type Err = FootMouseError;

    /// Parses `ctrl+v` style combos. A lone `+` is the plus key.
    fn from_str(s: &str) -> Result<Self> {
        if s == "+" {
            return KeyCombo::new([Key::Char('+')]);
        }
        let keys = s
            .split('+')
            .map(str::trim)
            .map(Key::from_str)
            .collect::<Result<Vec<_>>>()?;
        KeyCombo::new(keys)
    }
}
