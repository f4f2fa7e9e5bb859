//! Connection matchers built on [`IpList`](crate::iplist::IpList).
//!
//! # Data Flow
//! ```text
//! remote address ("203.0.113.7:51234")
//!     → remote_ip() (strip port, parse)
//!     → BanMatcher / RemoteIpListMatcher (membership)
//!     → Policy::decide (membership → Allow/Deny)
//! ```
//!
//! # Design Decisions
//! - Matchers only answer "is this address listed"; policy is separate
//! - An unparseable remote address is denied (fail closed)

pub mod ban;
pub mod guard;
pub mod remote_list;

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

pub use ban::BanMatcher;
pub use guard::{Guard, Verdict};
pub use remote_list::RemoteIpListMatcher;

/// Something that decides whether a connection's remote address matches.
pub trait ConnMatcher: Send + Sync {
    /// Whether `ip` matches.
    fn matches_ip(&self, ip: IpAddr) -> bool;

    /// Whether the textual remote address of a connection matches.
    fn matches(&self, remote: &str) -> Result<bool, MatchError> {
        Ok(self.matches_ip(remote_ip(remote)?))
    }
}

/// Extract the IP from a remote address, with or without a port.
///
/// Accepts `1.2.3.4:80`, `[::1]:80`, `1.2.3.4` and `::1`.
pub fn remote_ip(remote: &str) -> Result<IpAddr, MatchError> {
    if let Ok(addr) = remote.parse::<SocketAddr>() {
        return Ok(addr.ip());
    }
    remote
        .parse()
        .map_err(|_| MatchError::InvalidRemoteAddress(remote.to_string()))
}

/// How a list match turns into an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// fail2ban style ban list: listed addresses are denied.
    Ban,
    /// Listed addresses are denied.
    #[default]
    Deny,
    /// Only listed addresses are allowed.
    Allow,
}

impl Policy {
    pub fn decide(self, matched: bool) -> Decision {
        match (self, matched) {
            (Policy::Ban | Policy::Deny, true) | (Policy::Allow, false) => Decision::Deny,
            _ => Decision::Allow,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Ban => "ban",
            Policy::Deny => "deny",
            Policy::Allow => "allow",
        }
    }
}

/// Access decision for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Deny => f.write_str("deny"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_ip_forms() {
        assert_eq!(remote_ip("10.0.0.1:443").unwrap(), "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(remote_ip("[2001:db8::1]:8080").unwrap(), "2001:db8::1".parse::<IpAddr>().unwrap());
        assert_eq!(remote_ip("10.0.0.1").unwrap(), "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(remote_ip("::1").unwrap(), "::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_remote_ip_rejects_hostnames() {
        assert!(matches!(
            remote_ip("localhost:80"),
            Err(MatchError::InvalidRemoteAddress(s)) if s == "localhost:80"
        ));
        assert!(remote_ip("").is_err());
        assert!(remote_ip("[::1]").is_err());
    }

    #[test]
    fn test_policy_decisions() {
        assert_eq!(Policy::Ban.decide(true), Decision::Deny);
        assert_eq!(Policy::Ban.decide(false), Decision::Allow);
        assert_eq!(Policy::Deny.decide(true), Decision::Deny);
        assert_eq!(Policy::Deny.decide(false), Decision::Allow);
        assert_eq!(Policy::Allow.decide(true), Decision::Allow);
        assert_eq!(Policy::Allow.decide(false), Decision::Deny);
    }
}
