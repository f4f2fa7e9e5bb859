//! Self-refreshing IP membership lists for connection access control.
//!
//! An [`IpList`] keeps the addresses of a text file in memory, watches the
//! file's directory for changes and reloads lazily on the next query.
//! [`BanMatcher`] and [`RemoteIpListMatcher`] wrap it for the two usual call
//! sites: a fail2ban ban list and a general allow/deny list.

pub mod config;
pub mod error;
pub mod iplist;
pub mod lifecycle;
pub mod matcher;
pub mod observability;

pub use error::{ListError, MatchError};
pub use iplist::{IpList, WatchExit};
pub use lifecycle::Shutdown;
pub use matcher::{BanMatcher, ConnMatcher, Decision, Guard, Policy, RemoteIpListMatcher};
