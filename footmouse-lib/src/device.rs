use crate::command::{ButtonMode, Command};
use crate::config::DeviceConfig;
use crate::constants::DEVICE_ID_RESPONSE;
use crate::correlator::{Correlator, Response};
use crate::error::Result;
use crate::frame::FrameCodec;
use crate::keycode::KeyCombo;
use crate::locator::DeviceLocator;
use crate::transport::{SerialPortTransport, Transport};
use std::sync::Arc;
use tracing::{info, warn};

/// Represents a connection to a footmouse pedal controller.
///
/// The port is found lazily on the first command and reused after that.
pub struct FootMouse {
    config: DeviceConfig,
    codec: Box<dyn FrameCodec>,
    correlator: Arc<Correlator>,
    locator: DeviceLocator,
}

impl FootMouse {
    /// Talk to the pedal over the host's real serial ports.
    pub fn new(config: DeviceConfig) -> Self {
        Self::with_transport(config, Arc::new(SerialPortTransport))
    }

    pub fn with_transport(config: DeviceConfig, transport: Arc<dyn Transport>) -> Self {
        let correlator = Arc::new(Correlator::new(transport));
        let locator = DeviceLocator::new(Arc::clone(&correlator), config.clone());
        Self {
            codec: config.protocol.codec(),
            config,
            correlator,
            locator,
        }
    }

    /// Replace the frame codec, e.g. a checksumming `StructuredCodec`.
    pub fn with_codec(mut self, codec: Box<dyn FrameCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn locator(&self) -> &DeviceLocator {
        &self.locator
    }

    /// Encode `command`, then send it to the located pedal.
    ///
    /// Encoding happens first so a bad payload never triggers a port scan.
    pub async fn send_command(&self, command: &Command) -> Result<Response> {
        let frame = command.encode(self.codec.as_ref())?;
        let endpoint = self.locator.endpoint().await?;
        info!("Sending {} to {}", command.code(), endpoint);
        self.correlator
            .send(&endpoint, frame, command.expects_response(), &self.config)
            .await
    }

    /// Ask the located port to identify itself again.
    pub async fn identify(&self) -> Result<bool> {
        let response = self.send_command(&Command::Identify).await?;
        let matched = response.contains_line(DEVICE_ID_RESPONSE);
        if !matched {
            warn!("Identify answered {:?}", response.text());
        }
        Ok(matched)
    }

    pub async fn echo(&self, text: &str) -> Result<Response> {
        self.send_command(&Command::Echo(text.to_string())).await
    }

    pub async fn set_button_mode(&self, button: u8, mode: ButtonMode, inverted: bool) -> Result<Response> {
        self.send_command(&Command::SetButtonFunction { button, mode, inverted })
            .await
    }

    pub async fn set_button_keycombo(&self, button: u8, combo: KeyCombo, inverted: bool) -> Result<Response> {
        self.send_command(&Command::SetButtonFunctionEx {
            button,
            inverted,
            combo,
        })
        .await
    }

    pub async fn reset_buttons(&self) -> Result<Response> {
        self.send_command(&Command::ResetButtonsToDefault).await
    }

    /// Have the pedal type `text` as keystrokes. ASCII only.
    pub async fn type_text(&self, text: &str) -> Result<Response> {
        self.send_command(&Command::TypeAsciiString(text.to_string())).await
    }

    /// Store `text` on the pedal for later replay.
    pub async fn set_stored_string(&self, text: &str) -> Result<Response> {
        self.send_command(&Command::SetSavedAsciiString(text.to_string()))
            .await
    }

    pub async fn type_stored_string(&self) -> Result<Response> {
        self.send_command(&Command::TypeSavedAsciiString).await
    }
}
