//! Run exactly one update cycle and exit
//!
//! Uses dyndns-core as a library, without the scheduling loop: the same
//! components the daemon wires up, driven through a single
//! `DdnsEngine::run_cycle()` call. The cycle report is printed to stdout as
//! JSON; logs go to stderr.
//!
//! ```bash
//! update_once --token T --domain home.example.com --domain vpn.example.com --ipv6
//! ```
//!
//! Without `--state-dir` the cache is kept in memory, so every run updates
//! all hostnames.

use anyhow::Result;
use clap::Parser;
use dyndns_core::config::{DEFAULT_UPDATE_URL, LogLevel};
use dyndns_core::{DdnsConfig, DdnsEngine, FileStateStore, MemoryStateStore, StateStore};
use dyndns_ip_http::HttpIpSource;
use dyndns_provider_dyndns2::DynDns2Provider;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one DynDNS2 update cycle")]
struct Args {
    /// Provider token
    #[arg(long, env = "DDNS_TOKEN", hide_env_values = true)]
    token: String,

    /// Hostname to update (repeatable)
    #[arg(long = "domain", required = true)]
    domains: Vec<String>,

    /// Also detect and publish IPv6
    #[arg(long)]
    ipv6: bool,

    /// Directory for the address cache (in-memory when omitted)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Provider update endpoint
    #[arg(long, default_value = DEFAULT_UPDATE_URL)]
    update_url: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

async fn run(args: Args) -> Result<bool> {
    let mut config = DdnsConfig::new(args.token, args.domains)
        .with_detect_ipv6(args.ipv6)
        .with_update_url(args.update_url);
    if let Some(dir) = &args.state_dir {
        config = config.with_state_dir(dir);
    }
    config.validate()?;

    let state_store: Box<dyn StateStore> = match &args.state_dir {
        Some(dir) => Box::new(FileStateStore::new(dir).await?),
        None => Box::new(MemoryStateStore::new()),
    };

    let ip_source = HttpIpSource::from_config(&config)?;
    let provider = DynDns2Provider::new(
        config.update_url.clone(),
        config.token.clone(),
        config.detect_ipv6,
    )?;

    let (engine, _events) =
        DdnsEngine::new(Box::new(ip_source), Box::new(provider), state_store, config)?;

    match engine.run_cycle().await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(report.failed() == 0)
        }
        Err(e) => {
            eprintln!("Cycle failed: {}", e);
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing_level())
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
