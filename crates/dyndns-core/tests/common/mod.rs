//! Test doubles and common utilities for engine contract tests
//!
//! Every double is `Clone` and shares its recorders between clones, so a
//! test keeps one handle while the engine owns another.

#![allow(dead_code)]

use dyndns_core::error::{Error, Result};
use dyndns_core::{DdnsConfig, DnsProvider, IpSource, IpVersion, UpdateOutcome, UpdateRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// An IpSource whose answers can be changed between cycles
#[derive(Clone, Default)]
pub struct MockIpSource {
    answers: Arc<Mutex<HashMap<IpVersion, String>>>,
    calls: Arc<Mutex<Vec<IpVersion>>>,
}

impl MockIpSource {
    /// Source answering `ipv4` for IPv4 and nothing for IPv6
    pub fn with_ipv4(ipv4: &str) -> Self {
        let source = Self::default();
        source.set(IpVersion::V4, Some(ipv4));
        source
    }

    /// Change (or remove) the answer for a version
    pub fn set(&self, version: IpVersion, address: Option<&str>) {
        let mut answers = self.answers.lock().unwrap();
        match address {
            Some(a) => answers.insert(version, a.to_string()),
            None => answers.remove(&version),
        };
    }

    /// Number of resolve() calls for a version
    pub fn call_count(&self, version: IpVersion) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|v| **v == version)
            .count()
    }
}

#[async_trait::async_trait]
impl IpSource for MockIpSource {
    async fn resolve(&self, version: IpVersion) -> Result<String> {
        self.calls.lock().unwrap().push(version);
        self.answers
            .lock()
            .unwrap()
            .get(&version)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no {} answer configured", version)))
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// A DnsProvider that records requests and answers with canned bodies
#[derive(Clone)]
pub struct MockDnsProvider {
    default_body: Arc<Mutex<String>>,
    bodies: Arc<Mutex<HashMap<String, String>>>,
    requests: Arc<Mutex<Vec<UpdateRequest>>>,
}

impl MockDnsProvider {
    /// Provider answering `body` for every hostname
    pub fn answering(body: &str) -> Self {
        Self {
            default_body: Arc::new(Mutex::new(body.to_string())),
            bodies: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the answer for one hostname
    pub fn answer_for(&self, hostname: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(hostname.to_string(), body.to_string());
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn update_record(&self, request: &UpdateRequest) -> UpdateOutcome {
        self.requests.lock().unwrap().push(request.clone());

        let body = self
            .bodies
            .lock()
            .unwrap()
            .get(&request.hostname)
            .cloned()
            .unwrap_or_else(|| self.default_body.lock().unwrap().clone());

        UpdateOutcome::classify(&body)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal config for testing
pub fn minimal_config(domains: &[&str]) -> DdnsConfig {
    DdnsConfig::new("T", domains.iter().copied())
}
