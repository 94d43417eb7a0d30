//! Polling Session
//!
//! Composes channel, discovery, and batched execution behind a strict
//! lifecycle: open, initialize, discover, poll (repeatable), close. The
//! session owns the channel exclusively; the discoverer and the batch
//! executor borrow it for the duration of one call.

use crate::batch::{run_batch, BatchResult};
use crate::discovery::{discover, Budget, DiscoverySummary, SupportedSet};
use crate::error::ScanError;
use crate::outcome::ProbeOutcome;
use crate::probe::run_control;
use crate::sim::SimDevice;
use obd_catalog::{init_sequence, Category};
use obd_link::{open_serial, open_tcp, Channel, LinkError, SerialConfig, DEFAULT_READ_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle position of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No channel yet
    Unopened,
    /// Channel acquired, capabilities unknown
    Initialized,
    /// Discovery pass in flight
    Discovering,
    /// Supported set stored; polling allowed
    Ready,
    /// Channel released; the session is spent
    Closed,
}

/// How the session reaches the adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// TCP socket to a network-attached adapter
    Tcp { host: String, port: u16 },
    /// Local serial line
    Serial(SerialConfig),
    /// In-process simulated adapter
    Sim,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Transport used to acquire the channel
    pub transport: Transport,
    /// TCP connect timeout (ms)
    pub connect_timeout_ms: u64,
    /// Per-read timeout (ms)
    pub read_timeout_ms: u64,
    /// Category walk order for discovery
    pub categories: Vec<Category>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Sim,
            connect_timeout_ms: 10_000,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            categories: Category::ALL.to_vec(),
        }
    }
}

/// A polling session owning the adapter channel exclusively.
///
/// Operations must follow the lifecycle order; anything else fails with
/// [`ScanError::InvalidState`]. The wire protocol is half-duplex and the
/// session never hands the channel out; callers that need concurrency
/// must serialize calls themselves.
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    channel: Option<Channel>,
    supported: SupportedSet,
}

impl Session {
    /// Create an unopened session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Unopened,
            channel: None,
            supported: SupportedSet::default(),
        }
    }

    /// Current lifecycle position
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Acquire the channel from the configured transport
    pub async fn open(&mut self) -> Result<(), ScanError> {
        self.expect_state(SessionState::Unopened, "open")?;

        let read_timeout = Duration::from_millis(self.config.read_timeout_ms);
        let channel = match &self.config.transport {
            Transport::Tcp { host, port } => {
                let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
                open_tcp(host, *port, connect_timeout, read_timeout).await?
            }
            Transport::Serial(serial) => open_serial(serial, read_timeout).await?,
            Transport::Sim => SimDevice::standard().spawn(read_timeout),
        };

        self.channel = Some(channel);
        self.state = SessionState::Initialized;
        info!("Session opened");
        Ok(())
    }

    /// Send the fixed adapter setup sequence.
    ///
    /// Rejections and timeouts are adapter quirks, tolerated and logged;
    /// only a hard channel failure is fatal.
    pub async fn initialize(&mut self) -> Result<(), ScanError> {
        self.expect_state(SessionState::Initialized, "initialize")?;
        let channel = self.channel_mut("initialize")?;

        for command in init_sequence() {
            match run_control(channel, &command).await {
                Ok(ProbeOutcome::Supported(reply)) => {
                    debug!("Setup {} acknowledged: {}", command.name(), reply);
                }
                Ok(outcome) => {
                    warn!("Setup {} rejected: {:?}", command.name(), outcome);
                }
                Err(LinkError::ReadTimeout(ms)) => {
                    warn!("Setup {} timed out after {}ms", command.name(), ms);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Probe the catalogs and store the supported set.
    ///
    /// On a transport error the session falls back to `Initialized` with
    /// no stored set; the pass may be re-run on a fresh session.
    pub async fn discover(&mut self, budget: Budget) -> Result<DiscoverySummary, ScanError> {
        self.expect_state(SessionState::Initialized, "discover")?;
        self.state = SessionState::Discovering;

        let categories = self.config.categories.clone();
        let channel = self.channel_mut("discover")?;

        match discover(channel, &categories, budget).await {
            Ok(supported) => {
                let summary = supported.summary();
                info!("Session ready with {} commands", summary.count);
                self.supported = supported;
                self.state = SessionState::Ready;
                Ok(summary)
            }
            Err(err) => {
                self.state = SessionState::Initialized;
                Err(err)
            }
        }
    }

    /// Run one batch cycle over the discovered set. Repeatable while ready.
    pub async fn poll(&mut self) -> Result<BatchResult, ScanError> {
        self.expect_state(SessionState::Ready, "poll")?;
        let channel = match self.channel.as_mut() {
            Some(channel) => channel,
            None => {
                return Err(ScanError::InvalidState {
                    operation: "poll",
                    state: self.state,
                })
            }
        };
        run_batch(channel, &self.supported).await
    }

    /// Raw projection of a batch cycle
    pub fn raw(&self, batch: &BatchResult) -> Result<String, ScanError> {
        self.expect_state(SessionState::Ready, "raw")?;
        Ok(batch.raw_joined())
    }

    /// Formatted projection of a batch cycle
    pub fn formatted(&self, batch: &BatchResult) -> Result<String, ScanError> {
        self.expect_state(SessionState::Ready, "formatted")?;
        Ok(batch.formatted(&self.supported)?.joined())
    }

    /// Summary of the discovery pass
    pub fn summary(&self) -> DiscoverySummary {
        self.supported.summary()
    }

    /// Number of supported commands
    pub fn command_count(&self) -> usize {
        self.supported.len()
    }

    /// Flush and release the channel. A session may be torn down from
    /// `Initialized` (before discovery) or `Ready`; everything after
    /// `close` is a usage error, including a second `close`.
    pub async fn close(&mut self) -> Result<(), ScanError> {
        match self.state {
            SessionState::Initialized | SessionState::Ready => {}
            state => {
                return Err(ScanError::InvalidState {
                    operation: "close",
                    state,
                })
            }
        }

        if let Some(mut channel) = self.channel.take() {
            channel.close().await?;
        }
        self.state = SessionState::Closed;
        info!("Session closed");
        Ok(())
    }

    fn expect_state(&self, expected: SessionState, operation: &'static str) -> Result<(), ScanError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ScanError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn channel_mut(&mut self, operation: &'static str) -> Result<&mut Channel, ScanError> {
        let state = self.state;
        self.channel.as_mut().ok_or(ScanError::InvalidState {
            operation,
            state,
        })
    }
}
