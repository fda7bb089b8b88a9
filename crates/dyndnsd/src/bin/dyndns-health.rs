// # dyndns-health - Liveness check
//
// Reads the last-cycle timestamp from `DDNS_STATE_DIR` and exits 0 when the
// daemon completed a cycle within `interval * max_missed_cycles` seconds,
// 1 otherwise. Intended for container HEALTHCHECK and systemd watchdogs.
//
// Uses the daemon's own `DDNS_*` variables; the window can be widened with
// `DDNS_HEALTH_MAX_MISSED_CYCLES` (default 2).

use dyndns_core::health::{
    DEFAULT_MAX_MISSED_CYCLES, Liveness, allowed_age_secs, check_liveness,
};
use dyndns_core::{DdnsConfig, FileStateStore};
use std::process::ExitCode;

fn max_missed_cycles() -> Result<u32, String> {
    match std::env::var("DDNS_HEALTH_MAX_MISSED_CYCLES") {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!(
                "DDNS_HEALTH_MAX_MISSED_CYCLES must be a positive integer. Got: {}",
                raw
            )),
        },
        _ => Ok(DEFAULT_MAX_MISSED_CYCLES),
    }
}

fn main() -> ExitCode {
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let max_missed = match max_missed_cycles() {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = FileStateStore::open_existing(&config.state_dir);
    let interval = config.effective_update_interval();
    let now = chrono::Utc::now().timestamp();

    match rt.block_on(check_liveness(&store, interval, max_missed, now)) {
        Ok(Liveness::Healthy { age_secs }) => {
            println!("healthy: last cycle {}s ago", age_secs);
            ExitCode::SUCCESS
        }
        Ok(Liveness::Stale { age_secs }) => {
            println!(
                "stale: last cycle {}s ago (allowed {}s)",
                age_secs,
                allowed_age_secs(interval, max_missed)
            );
            ExitCode::FAILURE
        }
        Ok(Liveness::NeverRan) => {
            println!(
                "unhealthy: no completed cycle recorded in {}",
                config.state_dir.display()
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            println!("unhealthy: {}", e);
            ExitCode::FAILURE
        }
    }
}
