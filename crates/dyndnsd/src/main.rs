// # dyndnsd - DynDNS2 Update Daemon
//
// This is a thin integration layer: all update logic lives in dyndns-core.
//
// The dyndnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP source, the DynDNS2 provider and the file state store
// 4. Running the scheduler until SIGTERM or SIGINT
//
// ## Configuration
//
// All configuration is done via `DDNS_*` environment variables:
//
// - `DDNS_TOKEN`: Provider token (required)
// - `DDNS_DOMAINS`: Comma-separated hostnames (required)
// - `DDNS_UPDATE_INTERVAL`: Seconds between cycles (default 300, minimum 60)
// - `DDNS_DETECT_IPV6`: Also detect and publish IPv6 (default false)
// - `DDNS_LOG_LEVEL`: `info` or `debug` (default info)
// - `DDNS_TIMEZONE`: Log timestamp timezone (default UTC)
// - `DDNS_STATE_DIR`: Cache directory (default /var/lib/dyndns)
// - `DDNS_UPDATE_URL`: Provider endpoint (default https://ipv64.net/nic/update)
// - `DDNS_IPV4_SERVICES` / `DDNS_IPV6_SERVICES`: Ordered lookup URLs
//
// ## Example
//
// ```bash
// export DDNS_TOKEN=your_token
// export DDNS_DOMAINS=home.example.com,vpn.example.com
// export DDNS_DETECT_IPV6=true
//
// dyndnsd
// ```

use anyhow::Result;
use dyndns_core::{DdnsConfig, DdnsEngine, EngineEvent, FileStateStore, Scheduler};
use dyndns_ip_http::HttpIpSource;
use dyndns_provider_dyndns2::DynDns2Provider;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration before anything touches the network
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    if let Err(e) = dyndnsd::logging::init(config.log_level, &config.timezone) {
        eprintln!("{}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: {} domain(s), IPv6 detection {}",
        config.hostnames().count(),
        if config.detect_ipv6 { "enabled" } else { "disabled" }
    );
    debug!("{:?}", config);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the components, then run the scheduler until a shutdown signal
async fn run_daemon(config: DdnsConfig) -> DdnsExitCode {
    let shutdown = match ShutdownSignal::install() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            error!("{}", e);
            return DdnsExitCode::RuntimeError;
        }
    };

    let (scheduler, events) = match build_scheduler(config).await {
        Ok(parts) => parts,
        Err(e) => {
            error!("Startup failed: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    tokio::spawn(drain_events(events));

    scheduler.run_until(shutdown.wait()).await;

    info!("Shutting down daemon");
    DdnsExitCode::CleanShutdown
}

async fn build_scheduler(config: DdnsConfig) -> Result<(Scheduler, mpsc::Receiver<EngineEvent>)> {
    let ip_source = HttpIpSource::from_config(&config)?;
    let provider = DynDns2Provider::new(
        config.update_url.clone(),
        config.token.clone(),
        config.detect_ipv6,
    )?;
    let state_store = FileStateStore::new(&config.state_dir).await?;

    info!(
        "Provider endpoint: {}, state directory: {}",
        config.update_url,
        config.state_dir.display()
    );

    let (engine, events) = DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        Box::new(state_store),
        config,
    )?;

    Ok((Scheduler::new(engine), events))
}

/// Consume engine events so the channel never fills up
async fn drain_events(mut events: mpsc::Receiver<EngineEvent>) {
    while let Some(event) = events.recv().await {
        debug!("Engine event: {:?}", event);
    }
}

/// Termination signal handlers, installed before the first cycle
#[cfg(unix)]
struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        let sigterm = signal(SignalKind::terminate())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
        let sigint = signal(SignalKind::interrupt())
            .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

        Ok(Self { sigterm, sigint })
    }

    /// Resolve on the first SIGTERM or SIGINT
    async fn wait(mut self) {
        let name = tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    }
}

/// Fallback for non-Unix platforms (CTRL-C only)
#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn install() -> Result<Self> {
        Ok(Self)
    }

    async fn wait(self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: CTRL-C"),
            Err(e) => error!("Failed to wait for CTRL-C: {}", e),
        }
    }
}
