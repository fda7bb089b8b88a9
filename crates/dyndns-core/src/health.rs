//! Liveness check over the persisted cycle timestamp
//!
//! Every completed cycle (updated or skipped) stamps the state store. A
//! daemon is considered alive when the stamp is at most
//! `interval * max_missed_cycles` seconds old.

use std::time::Duration;

use crate::error::Result;
use crate::traits::StateStore;

/// Default number of intervals a daemon may miss before it is stale
pub const DEFAULT_MAX_MISSED_CYCLES: u32 = 2;

/// Verdict of a liveness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// Last cycle completed recently enough
    Healthy { age_secs: i64 },
    /// Last cycle is older than the allowed window
    Stale { age_secs: i64 },
    /// No cycle ever completed
    NeverRan,
}

impl Liveness {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Liveness::Healthy { .. })
    }
}

/// Maximum age in seconds a cycle stamp may have before the daemon is stale
pub fn allowed_age_secs(interval: Duration, max_missed_cycles: u32) -> u64 {
    interval.as_secs().saturating_mul(u64::from(max_missed_cycles))
}

/// Check how long ago the last cycle completed
///
/// `now_epoch` is passed in so callers (and tests) control the clock.
pub async fn check_liveness(
    store: &dyn StateStore,
    interval: Duration,
    max_missed_cycles: u32,
    now_epoch: i64,
) -> Result<Liveness> {
    let Some(last) = store.last_cycle_timestamp().await? else {
        return Ok(Liveness::NeverRan);
    };

    let age_secs = now_epoch.saturating_sub(last);
    let allowed = allowed_age_secs(interval, max_missed_cycles);

    if age_secs <= i64::try_from(allowed).unwrap_or(i64::MAX) {
        Ok(Liveness::Healthy { age_secs })
    } else {
        Ok(Liveness::Stale { age_secs })
    }
}
