use std::io;
use thiserror::Error;

/// The primary error type for the `footmouse-lib` library.
#[derive(Error, Debug)]
pub enum FootMouseError {
    #[error("Payload too large: {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Text is not 7-bit ASCII: {ch:?} at index {index}")]
    NonAsciiText { index: usize, ch: char },

    #[error("Key {0:?} is not an ASCII character, use a raw keycode instead")]
    NonAsciiKey(char),

    #[error("Unknown key name: {0}")]
    UnknownKey(String),

    #[error("Key combo must hold 1 to 255 keys, got {0}")]
    InvalidKeyCount(usize),

    #[error("Unknown button mode: {0}")]
    UnknownButtonMode(String),

    #[error("Command code {0} does not fit this protocol's frame")]
    CommandCodeOutOfRange(u32),

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Bad start-of-frame marker: {0:#010x}")]
    BadStartOfFrame(u32),

    #[error("Payload length mismatch: header says {declared}, buffer holds {actual}")]
    PayloadLengthMismatch { declared: usize, actual: usize },

    #[error("Frame is missing its {0} marker")]
    MissingMarker(&'static str),

    #[error("Endpoint {endpoint} unavailable: {source}")]
    EndpointUnavailable {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("No footmouse found after probing {probed} port(s). Is it plugged in?")]
    NoDeviceFound { probed: usize },

    #[error("Timeout during serial exchange: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Serial I/O error: {0}")]
    Transport(#[from] io::Error),

    #[error("Serial worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl FootMouseError {
    /// Conditions a port scan logs and moves past instead of aborting on.
    pub fn is_recoverable_during_scan(&self) -> bool {
        matches!(
            self,
            FootMouseError::EndpointUnavailable { .. } | FootMouseError::Timeout(_) | FootMouseError::Transport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FootMouseError>;
