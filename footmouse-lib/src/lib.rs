pub mod command;
pub mod config;
pub mod constants;
pub mod correlator;
pub mod device;
pub mod error;
pub mod frame;
pub mod keycode;
pub mod locator;
pub mod transport;

// Re-export the main types for easy access
pub use command::{ButtonMode, Command, CommandCode};
pub use config::DeviceConfig;
pub use correlator::{Correlator, Response};
pub use device::FootMouse;
pub use error::{FootMouseError, Result};
pub use frame::{Frame, FrameCodec, LegacyCodec, ProtocolVersion, StructuredCodec};
pub use keycode::{Key, KeyCombo};
pub use locator::{DeviceLocator, LocatorState};
pub use transport::{Endpoint, SerialLink, SerialPortTransport, Transport};
