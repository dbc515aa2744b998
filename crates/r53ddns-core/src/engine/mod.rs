//! Core DDNS engine
//!
//! The DdnsEngine is the application context and the scheduler driver:
//! - Holds the immutable configuration, the IP source and the DNS provider
//! - Fires a reconciliation cycle immediately and then on a fixed interval
//! - Logs and reports cycle failures without stopping
//!
//! ## Architecture
//!
//! ```text
//!   interval tick
//!        │
//!        ▼
//! ┌──────────────┐   current()   ┌─────────────┐
//! │  DdnsEngine  │──────────────►│  IpSource   │
//! └──────────────┘               └─────────────┘
//!        │
//!        │ reconcile(address, hostname)
//!        ▼
//! ┌──────────────┐  zones / records / changes  ┌─────────────┐
//! │  reconciler  │────────────────────────────►│ DnsProvider │
//! └──────────────┘                             └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve the public address (fresh every cycle)
//! 2. Locate the hosted zone for the hostname's parent domain
//! 3. List the existing address record
//! 4. Upsert only if the record is missing or stale
//! 5. Emit an event for monitoring/logging

pub mod reconcile;
pub mod zone;

pub use reconcile::{MatchState, RECORD_KIND, RECORD_TTL, ReconciliationResult, reconcile};
pub use zone::{Zone, locate_zone, zone_id_from_path};

use crate::config::DdnsConfig;
use crate::error::{Error, Phase, Result};
use crate::traits::{DnsProvider, IpSource};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

/// Default capacity of the engine event channel
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 100;

/// Shortest interval the scheduler accepts; a zero period cannot tick
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        hostname: String,
        interval: Duration,
    },

    /// A reconciliation cycle began
    CycleStarted {
        cycle: u64,
    },

    /// The record already held the observed address
    AlreadyConsistent {
        hostname: String,
        address: IpAddr,
    },

    /// An upsert was submitted
    Updated {
        hostname: String,
        address: IpAddr,
        zone_id: String,
    },

    /// A cycle failed; the next one will try again
    CycleFailed {
        cycle: u64,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core DDNS engine
///
/// Constructed once at startup and passed by reference into every cycle.
/// There is no state shared between cycles besides the configuration.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run_until_shutdown()`]
/// 3. Engine runs until the shutdown signal resolves
///
/// ## Scheduling
///
/// Cycles are awaited inline inside the tick loop, so two cycles never
/// overlap. A cycle that runs past its tick delays the next one instead of
/// triggering a burst.
pub struct DdnsEngine {
    /// Immutable configuration
    config: DdnsConfig,

    /// Public address discovery
    ip_source: Box<dyn IpSource>,

    /// Hosted zone API
    provider: Box<dyn DnsProvider>,

    /// Time between cycle starts
    interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            interval: config.interval(),
            config,
            ip_source,
            provider,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Override the interval taken from configuration
    ///
    /// Configuration enforces a minimum of ten seconds; tests and embedders
    /// can go lower here, down to [`MIN_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn config(&self) -> &DdnsConfig {
        &self.config
    }

    /// Run one reconciliation cycle
    ///
    /// Resolves the public address, then reconciles the configured hostname.
    /// Errors are tagged with the phase that failed.
    pub async fn run_cycle(&self) -> Result<ReconciliationResult> {
        let address = self
            .ip_source
            .current()
            .await
            .map_err(|e| Error::cycle(Phase::ResolveAddress, e))?;

        debug!("Resolved public address {} via {}", address, self.ip_source.source_name());

        let result = reconcile(self.provider.as_ref(), &address, &self.config.hostname)
            .await
            .map_err(|e| Error::cycle(Phase::UpdateRecord, e))?;

        match &result {
            ReconciliationResult::AlreadyConsistent { hostname, .. } => {
                self.emit_event(EngineEvent::AlreadyConsistent {
                    hostname: hostname.clone(),
                    address: address.addr(),
                });
            }
            ReconciliationResult::Updated {
                hostname, zone_id, ..
            } => {
                self.emit_event(EngineEvent::Updated {
                    hostname: hostname.clone(),
                    address: address.addr(),
                    zone_id: zone_id.clone(),
                });
            }
        }

        Ok(result)
    }

    /// Run cycles on the configured interval until `shutdown` resolves
    ///
    /// The first cycle fires immediately. Shutdown is observed between
    /// cycles; a cycle in flight runs to completion.
    pub async fn run_until_shutdown<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = IntervalStream::new(ticker);

        info!(
            "Keeping {} up to date every {:?}",
            self.config.hostname, self.interval
        );
        self.emit_event(EngineEvent::Started {
            hostname: self.config.hostname.clone(),
            interval: self.interval,
        });

        tokio::pin!(shutdown);
        let mut cycle: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(EngineEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                Some(_) = ticks.next() => {
                    cycle += 1;
                    self.emit_event(EngineEvent::CycleStarted { cycle });

                    if let Err(e) = self.run_cycle().await {
                        // Cycle failures never stop the engine
                        error!("{}", e);
                        self.emit_event(EngineEvent::CycleFailed {
                            cycle,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!("Engine stopped after {} cycle(s)", cycle);
        Ok(())
    }

    fn emit_event(&self, event: EngineEvent) {
        // Nobody listening is fine; a full channel means a slow listener
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event");
        }
    }
}
