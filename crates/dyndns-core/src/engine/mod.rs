//! Core update cycle engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the current public addresses via IpSource
//! - Comparing them against the StateStore cache (smart update)
//! - Updating every configured hostname via DnsProvider
//! - Persisting the cache and the liveness timestamp
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────┐
//!                 │  Scheduler  │  startup + every interval
//!                 └─────────────┘
//!                        │ run_cycle()
//!                        ▼
//!                 ┌──────────────┐
//!                 │  DdnsEngine  │──── EngineEvent ───▶ monitoring
//!                 └──────────────┘
//!                        │
//!         ┌──────────────┼──────────────────┐
//!         ▼              ▼                  ▼
//! ┌─────────────┐ ┌──────────────┐ ┌──────────────┐
//! │  IpSource   │ │ StateStore   │ │ DnsProvider  │
//! │ (resolve)   │ │ (compare)    │ │ (update)     │
//! └─────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve IPv4 (always) and IPv6 (only if enabled)
//! 2. Abort if neither version resolved
//! 3. Compare against the cached addresses
//! 4. Unchanged and cache warm: skip updates, stamp liveness, done
//! 5. Otherwise update every hostname in order, collecting outcomes
//! 6. Persist resolved addresses, stamp liveness

mod scheduler;

pub use scheduler::Scheduler;

use crate::address::IpVersion;
use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::response::{Severity, UpdateOutcome};
use crate::traits::{DnsProvider, IpSource, StateStore, UpdateRequest};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A cycle began
    CycleStarted,

    /// An address was resolved for one IP version
    AddressResolved { version: IpVersion, address: String },

    /// Addresses unchanged, no update requests sent
    UpdateSkipped { ipv4: String },

    /// Provider accepted the update for a hostname
    DomainUpdated {
        hostname: String,
        outcome: UpdateOutcome,
    },

    /// Provider rejected the update for a hostname (or did not answer)
    DomainFailed {
        hostname: String,
        outcome: UpdateOutcome,
    },

    /// A cycle ran to completion
    CycleCompleted {
        succeeded: usize,
        failed: usize,
        skipped: bool,
    },

    /// A cycle was aborted before the update phase
    CycleFailed { error: String },

    /// Scheduler stopped
    Stopped { reason: String },
}

/// Outcome of one hostname update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainResult {
    pub hostname: String,
    pub outcome: UpdateOutcome,
}

impl DomainResult {
    /// Whether the provider accepted the update
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Result of one completed cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// IPv4 address resolved this cycle
    pub ipv4: Option<String>,
    /// IPv6 address resolved this cycle
    pub ipv6: Option<String>,
    /// Whether any address differed from the cache
    pub changed: bool,
    /// Whether the update phase was skipped
    pub skipped: bool,
    /// Per-hostname outcomes, in configuration order
    pub domains: Vec<DomainResult>,
}

impl CycleReport {
    /// Number of hostnames the provider accepted
    pub fn succeeded(&self) -> usize {
        self.domains.iter().filter(|d| d.is_success()).count()
    }

    /// Number of hostnames that failed
    pub fn failed(&self) -> usize {
        self.domains.len() - self.succeeded()
    }
}

/// Core update cycle engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Either call [`DdnsEngine::run_cycle()`] directly (one-shot use) or
///    hand the engine to a [`Scheduler`]
///
/// ## Threading
///
/// The engine runs every step of a cycle sequentially on the calling task.
pub struct DdnsEngine {
    /// IP source for address discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider for updating hostnames
    provider: Box<dyn DnsProvider>,

    /// Address cache and liveness timestamp
    state_store: Box<dyn StateStore>,

    /// Hostnames to update, trimmed and non-empty
    hostnames: Vec<String>,

    /// Whether IPv6 is resolved and published
    detect_ipv6: bool,

    /// Interval between cycles (already floored)
    update_interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new engine
    ///
    /// The configuration is validated first; an invalid configuration is
    /// rejected before any component is used.
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        state_store: Box<dyn StateStore>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            ip_source,
            provider,
            state_store,
            hostnames: config.hostnames().map(str::to_string).collect(),
            detect_ipv6: config.detect_ipv6,
            update_interval: config.effective_update_interval(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Interval the scheduler should wait between cycles
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Hostnames this engine updates
    pub fn hostnames(&self) -> &[String] {
        &self.hostnames
    }

    /// Run one full cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleReport)`: The cycle ran to completion (updated or skipped).
    ///   Individual hostname failures are reported inside the report.
    /// - `Err(Error::NotFound)`: Neither IPv4 nor IPv6 could be resolved
    /// - `Err(Error)`: The cache could not be read or written
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.emit_event(EngineEvent::CycleStarted);

        match self.run_cycle_internal().await {
            Ok(report) => {
                self.emit_event(EngineEvent::CycleCompleted {
                    succeeded: report.succeeded(),
                    failed: report.failed(),
                    skipped: report.skipped,
                });
                Ok(report)
            }
            Err(e) => {
                error!("Cycle aborted: {}", e);
                self.emit_event(EngineEvent::CycleFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_cycle_internal(&self) -> Result<CycleReport> {
        // Step 1: resolve
        let ipv4 = self.resolve(IpVersion::V4).await;
        let ipv6 = if self.detect_ipv6 {
            self.resolve(IpVersion::V6).await
        } else {
            debug!("IPv6 detection disabled, skipping IPv6 lookup");
            None
        };

        // Step 2: nothing to publish
        if ipv4.is_none() && ipv6.is_none() {
            return Err(Error::not_found(
                "could not determine a public IPv4 or IPv6 address from any lookup service",
            ));
        }

        // Step 3: compare against cache
        let cached_v4 = self.state_store.read(IpVersion::V4).await?;
        let mut changed = log_transition(IpVersion::V4, ipv4.as_deref(), &cached_v4);

        if self.detect_ipv6 {
            let cached_v6 = self.state_store.read(IpVersion::V6).await?;
            changed |= log_transition(IpVersion::V6, ipv6.as_deref(), &cached_v6);
        }

        // Step 4: smart update
        if !changed && !cached_v4.is_empty() {
            info!("No IP change detected, skipping DNS update");
            self.emit_event(EngineEvent::UpdateSkipped { ipv4: cached_v4 });
            self.stamp_liveness().await?;

            return Ok(CycleReport {
                ipv4,
                ipv6,
                changed: false,
                skipped: true,
                domains: Vec::new(),
            });
        }

        // Step 5: update every hostname
        let mut domains = Vec::with_capacity(self.hostnames.len());
        for hostname in &self.hostnames {
            let mut request = UpdateRequest::new(hostname.as_str());
            request.ipv4 = ipv4.clone();
            request.ipv6 = ipv6.clone();

            let outcome = self.update_domain(&request).await;
            domains.push(DomainResult {
                hostname: hostname.clone(),
                outcome,
            });
        }

        // Step 6: persist what was resolved; unresolved versions keep their cache
        if let Some(ip) = &ipv4 {
            self.state_store.write(IpVersion::V4, ip).await?;
        }
        if let Some(ip) = &ipv6 {
            self.state_store.write(IpVersion::V6, ip).await?;
        }
        self.stamp_liveness().await?;

        let report = CycleReport {
            ipv4,
            ipv6,
            changed,
            skipped: false,
            domains,
        };

        info!(
            "Update cycle completed: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );

        Ok(report)
    }

    /// Resolve one IP version, logging instead of failing
    async fn resolve(&self, version: IpVersion) -> Option<String> {
        match self.ip_source.resolve(version).await {
            Ok(address) => {
                info!("Detected public {}: {}", version, address);
                self.emit_event(EngineEvent::AddressResolved {
                    version,
                    address: address.clone(),
                });
                Some(address)
            }
            Err(e) => {
                warn!(
                    "Failed to detect public {} via {}: {}",
                    version,
                    self.ip_source.source_name(),
                    e
                );
                None
            }
        }
    }

    /// Send one hostname update and log it by severity
    async fn update_domain(&self, request: &UpdateRequest) -> UpdateOutcome {
        debug!(
            "Updating {} via {} (myip={:?}, myipv6={:?})",
            request.hostname,
            self.provider.provider_name(),
            request.ipv4,
            request.ipv6
        );

        let outcome = self.provider.update_record(request).await;

        match outcome.severity() {
            Severity::Info => info!("{}: {}", request.hostname, outcome),
            Severity::Warning => warn!("{}: {}", request.hostname, outcome),
            Severity::Error => error!("{}: {}", request.hostname, outcome),
        }

        let hostname = request.hostname.clone();
        if outcome.is_success() {
            self.emit_event(EngineEvent::DomainUpdated {
                hostname,
                outcome: outcome.clone(),
            });
        } else {
            self.emit_event(EngineEvent::DomainFailed {
                hostname,
                outcome: outcome.clone(),
            });
        }

        outcome
    }

    async fn stamp_liveness(&self) -> Result<()> {
        self.state_store
            .record_cycle_timestamp(chrono::Utc::now().timestamp())
            .await
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Never block the cycle on a slow consumer
        if self.event_tx.try_send(event).is_err() {
            debug!("Event channel full or closed, dropping event");
        }
    }
}

/// Log how a resolved address relates to the cached one
///
/// Returns whether they differ. An unresolved address compares as empty.
fn log_transition(version: IpVersion, resolved: Option<&str>, cached: &str) -> bool {
    let resolved = resolved.unwrap_or_default();

    if resolved == cached {
        debug!("{} unchanged: {}", version, resolved);
        return false;
    }

    if resolved.is_empty() {
        warn!("{} not resolved this cycle (cached: {})", version, cached);
    } else if cached.is_empty() {
        info!("Initial {} detection: {}", version, resolved);
    } else {
        info!("{} changed: {} -> {}", version, cached, resolved);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_detection() {
        assert!(log_transition(IpVersion::V4, Some("1.2.3.4"), ""));
        assert!(log_transition(IpVersion::V4, Some("1.2.3.5"), "1.2.3.4"));
        assert!(!log_transition(IpVersion::V4, Some("1.2.3.4"), "1.2.3.4"));
        assert!(log_transition(IpVersion::V4, None, "1.2.3.4"));
        assert!(!log_transition(IpVersion::V6, None, ""));
    }

    #[test]
    fn test_report_counters() {
        let report = CycleReport {
            ipv4: Some("203.0.113.5".to_string()),
            ipv6: None,
            changed: true,
            skipped: false,
            domains: vec![
                DomainResult {
                    hostname: "a.example.com".to_string(),
                    outcome: UpdateOutcome::classify("good 203.0.113.5"),
                },
                DomainResult {
                    hostname: "b.example.com".to_string(),
                    outcome: UpdateOutcome::classify("nohost"),
                },
            ],
        };

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
