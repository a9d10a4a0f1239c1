//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use footmouse_lib::{
    ButtonMode, Command, CommandCode, DeviceConfig, DeviceLocator, Endpoint, FootMouse, FootMouseError, Key, KeyCombo,
    LocatorState, ProtocolVersion, Response, SerialLink, Transport,
};
#[allow(unused_imports)]
pub use footmouse_lib::correlator::Correlator;
#[allow(unused_imports)]
pub use footmouse_lib::frame::{FrameCodec, LegacyCodec, StructuredCodec};
#[allow(unused_imports)]
pub use std::sync::Arc;

use std::io;
use std::sync::Mutex;
use std::time::Duration;

/// How a scripted port behaves once opened.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum PortBehavior {
    /// open() fails, like a port held by another program
    Unavailable,
    /// Opens, accepts writes, never answers
    Silent,
    /// Answers every request with these lines
    Replies(Vec<&'static [u8]>),
    /// Opens but every write fails
    BrokenWrite,
    /// Blocks inside the read for this long, then answers nothing
    Hangs(Duration),
}

#[derive(Debug, Default)]
pub struct Record {
    pub opens: Vec<String>,
    pub writes: Vec<(String, Vec<u8>)>,
    pub closes: usize,
}

/// In-memory stand-in for the host's serial ports.
#[derive(Clone, Default)]
pub struct MockTransport {
    ports: Arc<Mutex<Vec<(String, PortBehavior)>>>,
    record: Arc<Mutex<Record>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(self, name: &str, behavior: PortBehavior) -> Self {
        self.plug_in(name, behavior);
        self
    }

    pub fn plug_in(&self, name: &str, behavior: PortBehavior) {
        self.ports.lock().unwrap().push((name.to_string(), behavior));
    }

    pub fn unplug(&self, name: &str) {
        self.ports.lock().unwrap().retain(|(n, _)| n != name);
    }

    pub fn opens(&self) -> Vec<String> {
        self.record.lock().unwrap().opens.clone()
    }

    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.record.lock().unwrap().writes.clone()
    }

    pub fn closes(&self) -> usize {
        self.record.lock().unwrap().closes
    }

    pub fn shared(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

impl Transport for MockTransport {
    fn list_endpoints(&self) -> io::Result<Vec<Endpoint>> {
        Ok(self
            .ports
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| Endpoint::new(name.as_str()))
            .collect())
    }

    fn open(&self, endpoint: &Endpoint, _config: &DeviceConfig) -> io::Result<Box<dyn SerialLink>> {
        self.record.lock().unwrap().opens.push(endpoint.name().to_string());
        let behavior = self
            .ports
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == endpoint.name())
            .map(|(_, behavior)| behavior.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such port"))?;

        match behavior {
            PortBehavior::Unavailable => Err(io::Error::new(io::ErrorKind::PermissionDenied, "port busy")),
            behavior => Ok(Box::new(MockLink {
                name: endpoint.name().to_string(),
                behavior,
                record: Arc::clone(&self.record),
            })),
        }
    }
}

struct MockLink {
    name: String,
    behavior: PortBehavior,
    record: Arc<Mutex<Record>>,
}

impl SerialLink for MockLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let PortBehavior::BrokenWrite = self.behavior {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device went away"));
        }
        self.record
            .lock()
            .unwrap()
            .writes
            .push((self.name.clone(), bytes.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_available_lines(&mut self, _window: Duration) -> io::Result<Vec<Bytes>> {
        match &self.behavior {
            PortBehavior::Replies(lines) => Ok(lines.iter().map(|&l| Bytes::from_static(l)).collect()),
            PortBehavior::Hangs(duration) => {
                std::thread::sleep(*duration);
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }
}

impl Drop for MockLink {
    fn drop(&mut self) {
        self.record.lock().unwrap().closes += 1;
    }
}

/// Route library logs to the test harness. Set `RUST_LOG=footmouse_lib=debug` to see frames.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Short timeouts so scripted exchanges finish quickly
#[allow(dead_code)]
pub fn fast_config() -> DeviceConfig {
    DeviceConfig::structured()
        .with_write_timeout(Duration::from_millis(50))
        .with_read_timeout(Duration::from_millis(50))
        .with_probe_timeout(Duration::from_millis(50))
        .with_guard_margin(Duration::from_millis(200))
}

/// The identify frame in structured framing
#[allow(dead_code)]
pub const IDENTIFY_FRAME: &[u8] = &[
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xEF, 0xBE, 0xAD, 0xDE, 0x04, 0x00, 0x00, 0x00,
];

#[allow(dead_code)]
pub const FOOTMOUSE: &[u8] = b"footmouse\n";
