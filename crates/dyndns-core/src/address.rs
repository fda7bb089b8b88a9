//! IP versions and address syntax checks
//!
//! Lookup services answer with plain text. The checks here are purely
//! syntactic: IPv4 octets are not range-checked and IPv6 compression
//! forms are not validated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IP version (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Human-readable name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            IpVersion::V4 => "IPv4",
            IpVersion::V6 => "IPv6",
        }
    }

    /// Name of the cache file holding the last-known address
    pub fn cache_file_name(&self) -> &'static str {
        match self {
            IpVersion::V4 => "last_ipv4",
            IpVersion::V6 => "last_ipv6",
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `text` looks like an address of the given version
pub fn is_valid_address(version: IpVersion, text: &str) -> bool {
    match version {
        IpVersion::V4 => is_ipv4_like(text),
        IpVersion::V6 => is_ipv6_like(text),
    }
}

/// Four dot-separated groups of 1-3 decimal digits
fn is_ipv4_like(text: &str) -> bool {
    let groups: Vec<&str> = text.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Hex digits and colons only, with at least one colon
fn is_ipv6_like(text: &str) -> bool {
    text.contains(':') && text.bytes().all(|b| b.is_ascii_hexdigit() || b == b':')
}
