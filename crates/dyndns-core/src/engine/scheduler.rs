//! Fixed-interval scheduler
//!
//! Runs one cycle immediately, then sleeps for the update interval and runs
//! the next cycle, until the shutdown future resolves. The sleep is the only
//! long suspension point and it is raced against shutdown, so shutdown never
//! waits out the remaining interval. A cycle that is already running is
//! allowed to finish.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use super::{DdnsEngine, EngineEvent};

/// Drives a [`DdnsEngine`] on a fixed interval
pub struct Scheduler {
    engine: DdnsEngine,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler using the engine's (floored) update interval
    pub fn new(engine: DdnsEngine) -> Self {
        let interval = engine.update_interval();
        Self { engine, interval }
    }

    /// Create a scheduler with an explicit interval
    ///
    /// No minimum is applied here; the floor lives in the configuration.
    pub fn with_interval(engine: DdnsEngine, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until `shutdown` resolves
    ///
    /// Cycle failures are logged and never stop the loop. The next cycle is
    /// the only retry; there is no backoff.
    ///
    /// # Returns
    ///
    /// The number of cycles that were started.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Scheduler started: {} hostname(s), interval {}s",
            self.engine.hostnames().len(),
            self.interval.as_secs()
        );

        let mut cycles = 0;
        loop {
            cycles += 1;
            if let Err(e) = self.engine.run_cycle().await {
                warn!(
                    "Cycle {} failed, next attempt in {}s: {}",
                    cycles,
                    self.interval.as_secs(),
                    e
                );
            }

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping scheduler");
                    break;
                }

                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.engine.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });

        cycles
    }
}
