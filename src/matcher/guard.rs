//! A set of named lists evaluated together.

use crate::config::ListConfig;
use crate::error::ListResult;
use crate::lifecycle::Shutdown;
use crate::matcher::{BanMatcher, ConnMatcher, Decision, Policy, RemoteIpListMatcher};
use crate::observability::metrics;

struct GuardEntry {
    name: String,
    policy: Policy,
    matcher: Box<dyn ConnMatcher>,
}

/// Outcome of one list for one remote address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub list: String,
    pub decision: Decision,
}

/// All configured lists, provisioned and watched.
pub struct Guard {
    entries: Vec<GuardEntry>,
}

impl Guard {
    /// Provision every list and start its watcher.
    ///
    /// Fails on the first list whose directory is missing. Watchers of lists
    /// provisioned before the failure stop when `shutdown` fires.
    pub fn provision(lists: &[ListConfig], shutdown: &Shutdown) -> ListResult<Self> {
        let mut entries = Vec::with_capacity(lists.len());
        for list in lists {
            let matcher: Box<dyn ConnMatcher> = match list.policy {
                Policy::Ban => Box::new(BanMatcher::provision(&list.path, shutdown)?),
                Policy::Deny | Policy::Allow => {
                    Box::new(RemoteIpListMatcher::provision(&list.path, shutdown)?)
                }
            };
            tracing::info!(list = %list.name, path = %list.path.display(), policy = list.policy.as_str(), "IP list provisioned");
            entries.push(GuardEntry {
                name: list.name.clone(),
                policy: list.policy,
                matcher,
            });
        }
        Ok(Self { entries })
    }

    /// Evaluate every list for `remote`, in configuration order.
    ///
    /// An unparseable remote address is denied by every list.
    pub fn evaluate(&self, remote: &str) -> Vec<Verdict> {
        self.entries
            .iter()
            .map(|entry| {
                let decision = match entry.matcher.matches(remote) {
                    Ok(matched) => {
                        metrics::record_match(entry.policy.as_str(), matched);
                        entry.policy.decide(matched)
                    }
                    Err(e) => {
                        tracing::warn!(list = %entry.name, error = %e, "Denying unparseable remote address");
                        Decision::Deny
                    }
                };
                Verdict {
                    list: entry.name.clone(),
                    decision,
                }
            })
            .collect()
    }

    /// Overall decision: denied if any list denies.
    pub fn decide(&self, remote: &str) -> Decision {
        if self
            .evaluate(remote)
            .iter()
            .any(|verdict| verdict.decision == Decision::Deny)
        {
            Decision::Deny
        } else {
            Decision::Allow
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
