//! fail2ban style ban list matcher.

use std::net::IpAddr;
use std::path::Path;

use crate::error::{ListResult, MatchError};
use crate::iplist::IpList;
use crate::lifecycle::Shutdown;
use crate::matcher::{remote_ip, ConnMatcher};

/// Matches connections whose remote IP appears in a ban file.
///
/// A match means the connection should be refused.
#[derive(Debug, Clone)]
pub struct BanMatcher {
    list: IpList,
}

impl BanMatcher {
    /// Create the ban list for `ban_file` and start watching it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn provision(ban_file: impl AsRef<Path>, shutdown: &Shutdown) -> ListResult<Self> {
        let list = IpList::new(ban_file, shutdown.token()).inspect_err(|e| {
            tracing::error!(error = %e, "Error creating a new ban list");
        })?;
        list.start_monitoring();
        Ok(Self { list })
    }

    /// Like [`ConnMatcher::matches`], treating unparseable addresses as banned.
    pub fn is_banned(&self, remote: &str) -> bool {
        self.matches(remote).unwrap_or(true)
    }

    pub fn list(&self) -> &IpList {
        &self.list
    }
}

impl ConnMatcher for BanMatcher {
    fn matches_ip(&self, ip: IpAddr) -> bool {
        if self.list.is_matched(ip) {
            tracing::info!(remote_addr = %ip, "Banned IP found");
            true
        } else {
            tracing::debug!(remote_addr = %ip, "Received request");
            false
        }
    }

    fn matches(&self, remote: &str) -> Result<bool, MatchError> {
        let ip = remote_ip(remote).inspect_err(|e| {
            tracing::error!(error = %e, "Error parsing the remote IP from the connection");
        })?;
        Ok(self.matches_ip(ip))
    }
}
