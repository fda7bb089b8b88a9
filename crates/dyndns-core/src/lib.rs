// # dyndns-core
//
// Core library for the DynDNS2 update daemon.
//
// ## Architecture Overview
//
// This library provides the update cycle engine:
// - **IpSource**: Trait for discovering the current public address per IP version
// - **DnsProvider**: Trait for sending one update request per hostname
// - **StateStore**: Trait for the last-known address cache and the liveness timestamp
// - **DdnsEngine**: Runs one full cycle (resolve → compare → update → persist)
// - **Scheduler**: Runs the engine at startup and then on a fixed interval until shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Single control flow**: Services and domains are processed strictly sequentially
// 3. **Library-First**: One cycle can be run without the scheduling loop
// 4. **Smart update**: Unchanged addresses never reach the provider

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod response;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use address::IpVersion;
pub use config::{DdnsConfig, LogLevel};
pub use engine::{CycleReport, DdnsEngine, DomainResult, EngineEvent, Scheduler};
pub use error::{Error, Result};
pub use response::{Severity, UpdateOutcome};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsProvider, IpSource, StateStore, UpdateRequest};
