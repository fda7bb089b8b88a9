//! DynDNS2 response interpreter
//!
//! Providers answer an update request with a single line of plain text.
//! [`UpdateOutcome::classify`] maps any body to exactly one outcome; there is
//! no input it rejects.
//!
//! | Response            | Outcome        | Severity |
//! |---------------------|----------------|----------|
//! | `good [ip]`         | success        | info     |
//! | `nochg [ip]`        | success        | info     |
//! | `badauth`           | failure        | error    |
//! | `nohost`            | failure        | error    |
//! | `notfqdn`           | failure        | error    |
//! | `abuse`             | failure        | error    |
//! | `911`               | failure        | error    |
//! | `dnserr`            | failure        | error    |
//! | empty body          | failure        | error    |
//! | anything else       | failure        | warning  |

use serde::Serialize;
use std::fmt;

/// Log severity attached to an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Classified result of one update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// Record updated (`good`)
    Good { ip: Option<String> },
    /// Provider already had this address (`nochg`)
    NoChange { ip: Option<String> },
    /// Invalid or expired token (`badauth`)
    BadAuth,
    /// Hostname not registered to this account (`nohost`)
    NoHost,
    /// Hostname is not a fully-qualified domain name (`notfqdn`)
    NotFqdn,
    /// Account blocked or rate-limited (`abuse`)
    Abuse,
    /// Provider-side server error (`911`)
    ServerError,
    /// Provider-side DNS error (`dnserr`)
    DnsError,
    /// No body at all (includes transport failures)
    EmptyResponse,
    /// Anything not in the table above, kept verbatim
    Unrecognized { body: String },
}

impl UpdateOutcome {
    /// Classify a raw response body
    pub fn classify(body: &str) -> Self {
        let body = body.trim();
        let mut tokens = body.split_whitespace();
        let Some(code) = tokens.next() else {
            return UpdateOutcome::EmptyResponse;
        };
        let ip = tokens.next().map(str::to_string);

        match code {
            "good" => UpdateOutcome::Good { ip },
            "nochg" => UpdateOutcome::NoChange { ip },
            "badauth" => UpdateOutcome::BadAuth,
            "nohost" => UpdateOutcome::NoHost,
            "notfqdn" => UpdateOutcome::NotFqdn,
            "abuse" => UpdateOutcome::Abuse,
            "911" => UpdateOutcome::ServerError,
            "dnserr" => UpdateOutcome::DnsError,
            _ => UpdateOutcome::Unrecognized {
                body: body.to_string(),
            },
        }
    }

    /// Whether the provider accepted the update
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            UpdateOutcome::Good { .. } | UpdateOutcome::NoChange { .. }
        )
    }

    /// Severity used when logging this outcome
    pub fn severity(&self) -> Severity {
        match self {
            UpdateOutcome::Good { .. } | UpdateOutcome::NoChange { .. } => Severity::Info,
            UpdateOutcome::Unrecognized { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short explanation suitable for an operator
    pub fn description(&self) -> &'static str {
        match self {
            UpdateOutcome::Good { .. } => "IP address updated",
            UpdateOutcome::NoChange { .. } => "IP address unchanged at provider",
            UpdateOutcome::BadAuth => "authentication failed, check the token",
            UpdateOutcome::NoHost => "hostname is not registered to this account",
            UpdateOutcome::NotFqdn => "hostname is not a fully-qualified domain name",
            UpdateOutcome::Abuse => "account blocked for abuse or rate-limited",
            UpdateOutcome::ServerError => "provider server error, will retry next cycle",
            UpdateOutcome::DnsError => "provider DNS error",
            UpdateOutcome::EmptyResponse => "empty response",
            UpdateOutcome::Unrecognized { .. } => "unrecognized response",
        }
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateOutcome::Good { ip: Some(ip) } | UpdateOutcome::NoChange { ip: Some(ip) } => {
                write!(f, "{} ({})", self.description(), ip)
            }
            UpdateOutcome::Unrecognized { body } => {
                write!(f, "{}: {}", self.description(), body)
            }
            _ => f.write_str(self.description()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes() {
        assert_eq!(
            UpdateOutcome::classify("good 203.0.113.5"),
            UpdateOutcome::Good {
                ip: Some("203.0.113.5".to_string())
            }
        );
        assert_eq!(
            UpdateOutcome::classify("good"),
            UpdateOutcome::Good { ip: None }
        );
        assert_eq!(
            UpdateOutcome::classify("nochg\n"),
            UpdateOutcome::NoChange { ip: None }
        );
        assert!(UpdateOutcome::classify("nochg 2001:db8::1").is_success());
        assert_eq!(
            UpdateOutcome::classify("good 1.2.3.4").severity(),
            Severity::Info
        );
    }

    #[test]
    fn test_failure_codes() {
        let table = [
            ("badauth", UpdateOutcome::BadAuth),
            ("nohost", UpdateOutcome::NoHost),
            ("notfqdn", UpdateOutcome::NotFqdn),
            ("abuse", UpdateOutcome::Abuse),
            ("911", UpdateOutcome::ServerError),
            ("dnserr", UpdateOutcome::DnsError),
        ];

        for (body, expected) in table {
            let outcome = UpdateOutcome::classify(body);
            assert_eq!(outcome, expected, "body {:?}", body);
            assert!(!outcome.is_success());
            assert_eq!(outcome.severity(), Severity::Error);
        }
    }

    #[test]
    fn test_empty_body() {
        for body in ["", "   ", "\n"] {
            let outcome = UpdateOutcome::classify(body);
            assert_eq!(outcome, UpdateOutcome::EmptyResponse);
            assert_eq!(outcome.severity(), Severity::Error);
            assert_eq!(outcome.to_string(), "empty response");
        }
    }

    #[test]
    fn test_unrecognized_is_kept_verbatim() {
        let outcome = UpdateOutcome::classify("foo");
        assert_eq!(
            outcome,
            UpdateOutcome::Unrecognized {
                body: "foo".to_string()
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.severity(), Severity::Warning);
        assert_eq!(outcome.to_string(), "unrecognized response: foo");
    }

    #[test]
    fn test_prefix_must_be_a_whole_token() {
        assert!(matches!(
            UpdateOutcome::classify("goodness"),
            UpdateOutcome::Unrecognized { .. }
        ));
        assert!(matches!(
            UpdateOutcome::classify("<html>good</html>"),
            UpdateOutcome::Unrecognized { .. }
        ));
    }
}
