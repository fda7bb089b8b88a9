//! Core traits for the DynDNS daemon
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public address
//! - [`DnsProvider`]: Send update requests to the provider
//! - [`StateStore`]: Last-known address cache and liveness timestamp

pub mod dns_provider;
pub mod ip_source;
pub mod state_store;

pub use dns_provider::{DnsProvider, UpdateRequest};
pub use ip_source::IpSource;
pub use state_store::StateStore;
