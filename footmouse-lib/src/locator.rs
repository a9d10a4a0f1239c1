//! Finding the footmouse among the host's serial ports.
//!
//! Nothing on the bus says which port is ours, so every candidate gets an
//! identify frame and the first one that answers `footmouse\n` wins. The
//! result is kept until [`DeviceLocator::invalidate`] or
//! [`DeviceLocator::discover`] is called. A failed scan is not remembered:
//! the next call scans again, since the pedal may have been plugged in since.

use crate::command::Command;
use crate::config::DeviceConfig;
use crate::constants::DEVICE_ID_RESPONSE;
use crate::correlator::{Correlator, Response};
use crate::error::{FootMouseError, Result};
use crate::transport::Endpoint;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorState {
    Unresolved,
    Resolved(Endpoint),
}

pub struct DeviceLocator {
    correlator: Arc<Correlator>,
    config: DeviceConfig,
    // held for the duration of a scan, so readers never see a half-finished one
    state: Mutex<LocatorState>,
}

impl DeviceLocator {
    pub fn new(correlator: Arc<Correlator>, config: DeviceConfig) -> Self {
        Self {
            correlator,
            config,
            state: Mutex::new(LocatorState::Unresolved),
        }
    }

    pub async fn state(&self) -> LocatorState {
        self.state.lock().await.clone()
    }

    /// The cached endpoint, scanning first if nothing is cached.
    pub async fn endpoint(&self) -> Result<Endpoint> {
        let mut state = self.state.lock().await;
        if let LocatorState::Resolved(endpoint) = &*state {
            return Ok(endpoint.clone());
        }
        let endpoint = self.scan().await?;
        *state = LocatorState::Resolved(endpoint.clone());
        Ok(endpoint)
    }

    /// Forget any cached endpoint and scan again.
    pub async fn discover(&self) -> Result<Endpoint> {
        let mut state = self.state.lock().await;
        *state = LocatorState::Unresolved;
        let endpoint = self.scan().await?;
        *state = LocatorState::Resolved(endpoint.clone());
        Ok(endpoint)
    }

    /// Use `endpoint` without probing it.
    pub async fn pin(&self, endpoint: Endpoint) {
        info!("Using {} without discovery", endpoint);
        *self.state.lock().await = LocatorState::Resolved(endpoint);
    }

    pub async fn invalidate(&self) {
        *self.state.lock().await = LocatorState::Unresolved;
    }

    async fn scan(&self) -> Result<Endpoint> {
        let transport = self.correlator.transport();
        let candidates = tokio::task::spawn_blocking(move || transport.list_endpoints()).await??;
        info!("Searching {} serial port(s) for a footmouse...", candidates.len());

        let probe = Command::Identify.encode(self.config.protocol.codec().as_ref())?;
        let probe_config = self.config.probing();

        for candidate in &candidates {
            match self.correlator.send(candidate, probe.clone(), true, &probe_config).await {
                Ok(response) if response.contains_line(DEVICE_ID_RESPONSE) => {
                    info!("Found footmouse on {}", candidate);
                    return Ok(candidate.clone());
                }
                Ok(Response::NoResponse) => {
                    info!("'{}' stayed silent, not the port we're looking for", candidate);
                }
                Ok(response) => {
                    info!(
                        "'{}' answered {:?}, not the port we're looking for",
                        candidate,
                        response.text()
                    );
                }
                Err(e) if e.is_recoverable_during_scan() => {
                    warn!("{} not available: {}", candidate, e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(FootMouseError::NoDeviceFound {
            probed: candidates.len(),
        })
    }
}
