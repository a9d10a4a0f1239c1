use crate::config::DeviceConfig;
use crate::error::{FootMouseError, Result};
use crate::transport::{Endpoint, Transport};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

/// Outcome of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Written and flushed; no answer was requested
    Sent,
    /// Every line the device printed within the read window, log noise included
    Lines(Vec<Bytes>),
    /// An answer was requested but nothing arrived before the window closed
    NoResponse,
}

impl Response {
    pub fn lines(&self) -> &[Bytes] {
        match self {
            Response::Lines(lines) => lines,
            _ => &[],
        }
    }

    pub fn contains_line(&self, expected: &[u8]) -> bool {
        self.lines().iter().any(|line| line.as_ref() == expected)
    }

    /// Lines joined as lossy UTF-8
    pub fn text(&self) -> String {
        self.lines()
            .iter()
            .map(|line| String::from_utf8_lossy(line))
            .collect()
    }
}

/// Drives write, flush and optional read on one port at a time.
///
/// Exchanges on the same endpoint are serialized; different endpoints may run
/// side by side.
pub struct Correlator {
    transport: Arc<dyn Transport>,
    locks: Mutex<HashMap<Endpoint, Arc<AsyncMutex<()>>>>,
}

impl Correlator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    fn lock_for(&self, endpoint: &Endpoint) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Only the map holds these, so no exchange is running or waiting on them
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(endpoint.clone()).or_default())
    }

    /// Open `endpoint`, write `frame`, and if `expect_response` drain the reply.
    ///
    /// The whole cycle is bounded by [`DeviceConfig::exchange_deadline`]. The
    /// port is closed on every path, including when the deadline fires.
    pub async fn send(
        &self,
        endpoint: &Endpoint,
        frame: Bytes,
        expect_response: bool,
        config: &DeviceConfig,
    ) -> Result<Response> {
        // Held by the blocking task, so it is only released once the port is closed
        let guard = self.lock_for(endpoint).lock_owned().await;

        let transport = self.transport();
        let endpoint = endpoint.clone();
        let config = config.clone();
        let deadline = config.exchange_deadline();

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            exchange(transport.as_ref(), &endpoint, &frame, expect_response, &config)
        });

        tokio::time::timeout(deadline, task).await??
    }
}

fn exchange(
    transport: &dyn Transport,
    endpoint: &Endpoint,
    frame: &[u8],
    expect_response: bool,
    config: &DeviceConfig,
) -> Result<Response> {
    let mut link = transport
        .open(endpoint, config)
        .map_err(|source| FootMouseError::EndpointUnavailable {
            endpoint: endpoint.to_string(),
            source,
        })?;

    debug!(port = %endpoint, bytes = hex::encode(frame), "Serial Write");
    link.write_all(frame)?;
    link.flush()?;

    if !expect_response {
        return Ok(Response::Sent);
    }

    let lines = link.read_available_lines(config.read_timeout)?;
    for line in &lines {
        debug!(port = %endpoint, bytes = hex::encode(line), "Serial Read");
    }

    if lines.is_empty() {
        warn!("No response from {} within {:?}", endpoint, config.read_timeout);
        Ok(Response::NoResponse)
    } else {
        info!("Received {} line(s) from {}", lines.len(), endpoint);
        Ok(Response::Lines(lines))
    }
}
