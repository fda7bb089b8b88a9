//! Log subscriber setup
//!
//! Log lines go to stderr, coloured by level when stderr is a terminal, and
//! are stamped in the timezone given by `DDNS_TIMEZONE`:
//!
//! - `UTC` (also `Z`, `Etc/UTC`)
//! - `local` for the host's local time
//! - a fixed offset such as `+02:00`, `-0530` or `+01`
//! - an IANA zone name such as `Europe/Berlin`
//!
//! Anything else falls back to UTC with a warning.

use chrono::{FixedOffset, Local, Utc};
use chrono_tz::Tz;
use dyndns_core::LogLevel;
use std::fmt;
use std::io::IsTerminal;
use tracing::warn;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Timezone used to render log timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTimezone {
    Utc,
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl LogTimezone {
    /// Parse a `DDNS_TIMEZONE` value
    ///
    /// Returns `None` for anything that is not UTC, `local`, a fixed offset or
    /// a known zone name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "" | "utc" | "z" | "etc/utc" | "gmt" => return Some(LogTimezone::Utc),
            "local" => return Some(LogTimezone::Local),
            _ => {}
        }
        if let Some(offset) = parse_offset(raw) {
            return Some(LogTimezone::Fixed(offset));
        }
        raw.parse::<Tz>().ok().map(LogTimezone::Named)
    }
}

/// Parse `+HH:MM`, `+HHMM` or `+HH` (sign required)
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl FormatTime for LogTimezone {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match self {
            LogTimezone::Utc => write!(w, "{}", Utc::now().format(TIMESTAMP_FORMAT)),
            LogTimezone::Local => write!(w, "{}", Local::now().format(TIMESTAMP_FORMAT)),
            LogTimezone::Fixed(offset) => write!(
                w,
                "{}",
                Utc::now().with_timezone(offset).format(TIMESTAMP_FORMAT)
            ),
            LogTimezone::Named(tz) => write!(
                w,
                "{}",
                Utc::now().with_timezone(tz).format(TIMESTAMP_FORMAT)
            ),
        }
    }
}

/// Colour output only when the stream is attached to a terminal
fn ansi_enabled(stream: &impl IsTerminal) -> bool {
    stream.is_terminal()
}

/// Install the global subscriber
///
/// Must be called once, before any other log output.
pub fn init(level: LogLevel, timezone: &str) -> anyhow::Result<()> {
    let parsed = LogTimezone::parse(timezone);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.as_tracing_level())
        .with_timer(parsed.unwrap_or(LogTimezone::Utc))
        .with_writer(std::io::stderr)
        .with_ansi(ansi_enabled(&std::io::stderr()))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    if parsed.is_none() {
        warn!(
            "DDNS_TIMEZONE '{}' is not supported, logging in UTC. Use UTC, local, a zone name or an offset like +02:00",
            timezone
        );
    }

    Ok(())
}
