//! General remote IP list matcher.

use std::net::IpAddr;
use std::path::Path;

use crate::error::ListResult;
use crate::iplist::IpList;
use crate::lifecycle::Shutdown;
use crate::matcher::ConnMatcher;

/// Matches connections whose remote IP appears in a list file.
///
/// Whether a match allows or denies is up to the caller's [`Policy`](crate::matcher::Policy).
#[derive(Debug, Clone)]
pub struct RemoteIpListMatcher {
    list: IpList,
}

impl RemoteIpListMatcher {
    /// Create the list for `ip_file` and start watching it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn provision(ip_file: impl AsRef<Path>, shutdown: &Shutdown) -> ListResult<Self> {
        let list = IpList::new(ip_file, shutdown.token())?;
        list.start_monitoring();
        Ok(Self { list })
    }

    pub fn list(&self) -> &IpList {
        &self.list
    }
}

impl ConnMatcher for RemoteIpListMatcher {
    fn matches_ip(&self, ip: IpAddr) -> bool {
        self.list.is_matched(ip)
    }
}
