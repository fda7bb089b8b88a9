//! Configuration types for the DynDNS daemon
//!
//! Configuration is read from `DDNS_*` environment variables once at
//! startup and is immutable afterwards.
//!
//! | Variable               | Default                          |
//! |------------------------|----------------------------------|
//! | `DDNS_TOKEN`           | required                         |
//! | `DDNS_DOMAINS`         | required, comma-separated        |
//! | `DDNS_UPDATE_INTERVAL` | `300` (floored to `60`)          |
//! | `DDNS_DETECT_IPV6`     | `false`                          |
//! | `DDNS_LOG_LEVEL`       | `info` (`info` or `debug`)       |
//! | `DDNS_TIMEZONE`        | `UTC`                            |
//! | `DDNS_STATE_DIR`       | `/var/lib/dyndns`                |
//! | `DDNS_UPDATE_URL`      | `https://ipv64.net/nic/update`   |
//! | `DDNS_IPV4_SERVICES`   | built-in list, comma-separated   |
//! | `DDNS_IPV6_SERVICES`   | built-in list, comma-separated   |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::Error;

/// Update interval used when none is configured
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 300;

/// Smallest update interval the scheduler accepts
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 60;

/// Provider update endpoint used when none is configured
pub const DEFAULT_UPDATE_URL: &str = "https://ipv64.net/nic/update";

/// State directory used when none is configured
pub const DEFAULT_STATE_DIR: &str = "/var/lib/dyndns";

/// IPv4 lookup services, in the order they are tried
pub const DEFAULT_IPV4_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://v4.ident.me",
    "https://ipinfo.io/ip",
];

/// IPv6 lookup services, in the order they are tried
pub const DEFAULT_IPV6_SERVICES: &[&str] = &[
    "https://api6.ipify.org",
    "https://ipv6.icanhazip.com",
    "https://v6.ident.me",
];

fn default_event_channel_capacity() -> usize {
    100
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Maximum tracing level for this verbosity
    pub fn as_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(Error::config(format!(
                "DDNS_LOG_LEVEL '{}' is not valid. Valid levels: info, debug",
                other
            ))),
        }
    }
}

/// Main daemon configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider token, used as both Basic auth user and password
    #[serde(skip_serializing)]
    pub token: String,

    /// Hostnames to keep updated
    pub domains: Vec<String>,

    /// Seconds between cycles (before flooring)
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,

    /// Whether to detect and publish IPv6
    #[serde(default)]
    pub detect_ipv6: bool,

    /// Log verbosity
    #[serde(default)]
    pub log_level: LogLevel,

    /// Timezone for log timestamps (`UTC`, `local` or `+HH:MM`)
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Directory for the address cache and liveness timestamp
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Provider update endpoint
    #[serde(default = "default_update_url")]
    pub update_url: String,

    /// Ordered IPv4 lookup services
    #[serde(default = "default_ipv4_services")]
    pub ipv4_services: Vec<String>,

    /// Ordered IPv6 lookup services
    #[serde(default = "default_ipv6_services")]
    pub ipv6_services: Vec<String>,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (logged at debug level).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

// Custom Debug implementation that hides the token
impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("token", &"<REDACTED>")
            .field("domains", &self.domains)
            .field("update_interval_secs", &self.update_interval_secs)
            .field("detect_ipv6", &self.detect_ipv6)
            .field("log_level", &self.log_level)
            .field("timezone", &self.timezone)
            .field("state_dir", &self.state_dir)
            .field("update_url", &self.update_url)
            .field("ipv4_services", &self.ipv4_services)
            .field("ipv6_services", &self.ipv6_services)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but token and domains
    pub fn new<I, S>(token: impl Into<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            token: token.into(),
            domains: domains.into_iter().map(Into::into).collect(),
            update_interval_secs: default_update_interval_secs(),
            detect_ipv6: false,
            log_level: LogLevel::default(),
            timezone: default_timezone(),
            state_dir: default_state_dir(),
            update_url: default_update_url(),
            ipv4_services: default_ipv4_services(),
            ipv6_services: default_ipv6_services(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Enable or disable IPv6 detection
    pub fn with_detect_ipv6(mut self, detect_ipv6: bool) -> Self {
        self.detect_ipv6 = detect_ipv6;
        self
    }

    /// Set the update interval in seconds
    pub fn with_update_interval_secs(mut self, secs: u64) -> Self {
        self.update_interval_secs = secs;
        self
    }

    /// Set the state directory
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Set the provider update endpoint
    pub fn with_update_url(mut self, url: impl Into<String>) -> Self {
        self.update_url = url.into();
        self
    }

    /// Load configuration from `DDNS_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Malformed values (non-numeric interval, unknown boolean, unknown log
    /// level) are rejected here. Missing required values are left empty and
    /// reported by [`DdnsConfig::validate`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(
            get("DDNS_TOKEN").map(|t| t.trim().to_string()).unwrap_or_default(),
            get("DDNS_DOMAINS")
                .map(|d| split_list(&d))
                .unwrap_or_default(),
        );

        if let Some(raw) = get("DDNS_UPDATE_INTERVAL") {
            config.update_interval_secs = raw.trim().parse().map_err(|_| {
                Error::config(format!(
                    "DDNS_UPDATE_INTERVAL must be a whole number of seconds. Got: {}",
                    raw
                ))
            })?;
        }

        if let Some(raw) = get("DDNS_DETECT_IPV6") {
            config.detect_ipv6 = parse_bool(&raw).ok_or_else(|| {
                Error::config(format!(
                    "DDNS_DETECT_IPV6 must be true or false. Got: {}",
                    raw
                ))
            })?;
        }

        if let Some(raw) = get("DDNS_LOG_LEVEL") {
            config.log_level = raw.parse()?;
        }

        if let Some(tz) = get("DDNS_TIMEZONE") {
            config.timezone = tz.trim().to_string();
        }

        if let Some(dir) = get("DDNS_STATE_DIR") {
            config.state_dir = PathBuf::from(dir.trim());
        }

        if let Some(url) = get("DDNS_UPDATE_URL") {
            config.update_url = url.trim().to_string();
        }

        if let Some(list) = get("DDNS_IPV4_SERVICES") {
            config.ipv4_services = split_list(&list);
        }

        if let Some(list) = get("DDNS_IPV6_SERVICES") {
            config.ipv6_services = split_list(&list);
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Error> {
        if self.token.trim().is_empty() {
            return Err(Error::config(
                "DDNS_TOKEN is required. Set it via: export DDNS_TOKEN=your_token",
            ));
        }

        if self.hostnames().next().is_none() {
            return Err(Error::config(
                "DDNS_DOMAINS must contain at least one domain. \
                Set it via: export DDNS_DOMAINS=home.example.com,vpn.example.com",
            ));
        }

        validate_url("DDNS_UPDATE_URL", &self.update_url)?;

        if self.ipv4_services.is_empty() {
            return Err(Error::config(
                "DDNS_IPV4_SERVICES must contain at least one lookup URL",
            ));
        }
        for url in &self.ipv4_services {
            validate_url("DDNS_IPV4_SERVICES", url)?;
        }

        if self.detect_ipv6 && self.ipv6_services.is_empty() {
            return Err(Error::config(
                "DDNS_IPV6_SERVICES must contain at least one lookup URL when DDNS_DETECT_IPV6=true",
            ));
        }
        for url in &self.ipv6_services {
            validate_url("DDNS_IPV6_SERVICES", url)?;
        }

        if self.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }

    /// Configured hostnames, trimmed, with empty entries skipped
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.domains
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
    }

    /// Interval the scheduler actually uses
    ///
    /// Values below [`MIN_UPDATE_INTERVAL_SECS`] are raised to it, with a warning.
    pub fn effective_update_interval(&self) -> Duration {
        if self.update_interval_secs < MIN_UPDATE_INTERVAL_SECS {
            tracing::warn!(
                "Update interval {}s is below the minimum, using {}s",
                self.update_interval_secs,
                MIN_UPDATE_INTERVAL_SECS
            );
            Duration::from_secs(MIN_UPDATE_INTERVAL_SECS)
        } else {
            Duration::from_secs(self.update_interval_secs)
        }
    }
}

fn validate_url(key: &str, url: &str) -> Result<(), Error> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            key, url
        )));
    }
    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_update_interval_secs() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

fn default_update_url() -> String {
    DEFAULT_UPDATE_URL.to_string()
}

fn default_ipv4_services() -> Vec<String> {
    DEFAULT_IPV4_SERVICES.iter().map(|s| s.to_string()).collect()
}

fn default_ipv6_services() -> Vec<String> {
    DEFAULT_IPV6_SERVICES.iter().map(|s| s.to_string()).collect()
}
