use crate::frame::ProtocolVersion;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_GUARD_MARGIN: Duration = Duration::from_millis(500);

/// Serial settings for talking to one footmouse.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    pub protocol: ProtocolVersion,
    pub baud_rate: u32,
    pub write_timeout: Duration,
    /// How long to keep draining response lines
    pub read_timeout: Duration,
    /// Read window while probing candidate ports
    pub probe_timeout: Duration,
    /// Slack on top of write + read before an exchange is abandoned
    pub guard_margin: Duration,
}

impl DeviceConfig {
    /// Length-prefixed firmware at 115200 baud
    pub fn structured() -> Self {
        Self::for_protocol(ProtocolVersion::Structured)
    }

    /// Delimiter-framed firmware at 9600 baud
    pub fn legacy() -> Self {
        Self::for_protocol(ProtocolVersion::Legacy)
    }

    pub fn for_protocol(protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            baud_rate: protocol.baud_rate(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            probe_timeout: DEFAULT_READ_TIMEOUT,
            guard_margin: DEFAULT_GUARD_MARGIN,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_guard_margin(mut self, margin: Duration) -> Self {
        self.guard_margin = margin;
        self
    }

    /// Settings used for an identify probe: same port setup, probe read window.
    pub(crate) fn probing(&self) -> Self {
        Self {
            read_timeout: self.probe_timeout,
            ..self.clone()
        }
    }

    /// Upper bound on one open, write, read, close cycle
    pub fn exchange_deadline(&self) -> Duration {
        self.write_timeout + self.read_timeout + self.guard_margin
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::structured()
    }
}
