//! The serial seam.
//!
//! [`Transport`] enumerates and opens ports; an opened port is a boxed
//! [`SerialLink`] that closes when dropped. The real implementation sits on
//! the `serialport` crate; tests swap in a scripted one.

use crate::config::DeviceConfig;
use bytes::{Bytes, BytesMut};
use serialport::SerialPort;
use std::fmt;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Quiet gap that ends a drain once the device has started talking
const IDLE_GAP: Duration = Duration::from_millis(50);

/// A named serial port the host can try to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Endpoint {
    name: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Endpoint::new(name)
    }
}

/// An open port. Dropping it closes the port.
pub trait SerialLink: Send {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Collect whatever lines arrive within `window`. Empty when the device stays quiet.
    fn read_available_lines(&mut self, window: Duration) -> io::Result<Vec<Bytes>>;
}

pub trait Transport: Send + Sync {
    /// Candidate ports in the order they should be probed
    fn list_endpoints(&self) -> io::Result<Vec<Endpoint>>;

    fn open(&self, endpoint: &Endpoint, config: &DeviceConfig) -> io::Result<Box<dyn SerialLink>>;
}

/// Host serial ports via the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortTransport;

impl Transport for SerialPortTransport {
    fn list_endpoints(&self) -> io::Result<Vec<Endpoint>> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| Endpoint::new(p.port_name)).collect())
    }

    fn open(&self, endpoint: &Endpoint, config: &DeviceConfig) -> io::Result<Box<dyn SerialLink>> {
        let port = serialport::new(endpoint.name(), config.baud_rate)
            .timeout(config.write_timeout)
            .open()?;
        debug!(port = %endpoint, baud = config.baud_rate, "Serial port opened");
        Ok(Box::new(SerialPortLink {
            port,
            write_timeout: config.write_timeout,
        }))
    }
}

struct SerialPortLink {
    port: Box<dyn SerialPort>,
    write_timeout: Duration,
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.set_timeout(self.write_timeout)?;
        self.port.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }

    fn read_available_lines(&mut self, window: Duration) -> io::Result<Vec<Bytes>> {
        drain_lines(&mut self.port, window)
    }
}

/// A port read bounded by a per-call timeout.
trait TimedRead {
    fn read_within(&mut self, wait: Duration, buf: &mut [u8]) -> io::Result<usize>;
}

impl TimedRead for Box<dyn SerialPort> {
    fn read_within(&mut self, wait: Duration, buf: &mut [u8]) -> io::Result<usize> {
        self.set_timeout(wait)?;
        self.read(buf)
    }
}

/// Read until the device goes quiet or `window` runs out, then split into lines.
///
/// The first read may wait the whole window. Once bytes have arrived, a single
/// read timing out after [`IDLE_GAP`] ends the drain.
fn drain_lines<R: TimedRead>(reader: &mut R, window: Duration) -> io::Result<Vec<Bytes>> {
    let deadline = Instant::now() + window;
    let mut received = BytesMut::new();
    let mut chunk = [0u8; 256];

    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let wait = if received.is_empty() {
            deadline - now
        } else {
            IDLE_GAP.min(deadline - now)
        };

        match reader.read_within(wait, &mut chunk) {
            Ok(0) => {}
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                if !received.is_empty() {
                    break;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(split_lines(received.freeze()))
}

/// Split on `\n`, keeping the terminator. A trailing partial line is kept too.
pub fn split_lines(mut bytes: Bytes) -> Vec<Bytes> {
    let mut lines = Vec::new();
    while let Some(pos) = bytes.iter().position(|&b| b == b'\n') {
        lines.push(bytes.split_to(pos + 1));
    }
    if !bytes.is_empty() {
        lines.push(bytes);
    }
    lines
}
