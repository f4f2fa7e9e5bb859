//! Membership store with lazy, demand-driven reloads.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::error::{ListError, ListResult};
use crate::iplist::parser;
use crate::iplist::watcher::{self, WatchExit};
use crate::observability::metrics;

/// State shared between the query path and the watcher task.
pub(crate) struct ListState {
    /// Normalized path of the list file.
    pub(crate) path: PathBuf,
    pub(crate) shutdown: CancellationToken,
    pub(crate) span: Span,
    /// Set by the watcher, cleared by a successful reload. Also serializes reloads.
    reload_needed: Mutex<bool>,
    /// Only ever replaced wholesale, under `reload_needed`.
    addresses: ArcSwap<Vec<IpAddr>>,
    reloads: AtomicU64,
}

impl ListState {
    pub(crate) fn mark_reload_needed(&self) {
        let mut reload_needed = self.reload_needed.lock().unwrap_or_else(PoisonError::into_inner);
        *reload_needed = true;
    }

    fn reload_if_needed(&self) {
        let mut reload_needed = self.reload_needed.lock().unwrap_or_else(PoisonError::into_inner);
        if !*reload_needed {
            return;
        }

        self.reloads.fetch_add(1, Ordering::Relaxed);
        match parser::load_addresses(&self.path) {
            Ok(addresses) => {
                let count = addresses.len();
                self.addresses.store(Arc::new(addresses));
                *reload_needed = false;
                metrics::record_reload("ok");
                tracing::debug!(parent: &self.span, count, "Reloaded IP addresses");
            }
            Err(e) => {
                // Keep serving the previous snapshot; the next query retries.
                metrics::record_reload("error");
                tracing::error!(parent: &self.span, error = %e, "Could not load IP addresses");
            }
        }
    }
}

/// A file-backed set of IP addresses that refreshes itself when the file changes.
///
/// The watcher started by [`IpList::start_monitoring`] only flags the list as
/// stale. The file is parsed on the next call to [`IpList::is_matched`], so a
/// burst of filesystem events costs at most one parse.
///
/// Cloning is cheap and every clone shares the same snapshot.
#[derive(Clone)]
pub struct IpList {
    inner: Arc<ListState>,
}

impl IpList {
    /// Create a list backed by `path`.
    ///
    /// The file itself may be absent, in which case nothing matches until it
    /// appears. The directory containing it must exist, otherwise the watcher
    /// would have nothing to attach to. The watcher exits once `shutdown` is
    /// cancelled.
    pub fn new(path: impl AsRef<Path>, shutdown: CancellationToken) -> ListResult<Self> {
        let path = normalize_path(path.as_ref())?;
        let span = tracing::info_span!("ip_list", path = %path.display());

        Ok(Self {
            inner: Arc::new(ListState {
                path,
                shutdown,
                span,
                reload_needed: Mutex::new(true),
                addresses: ArcSwap::from_pointee(Vec::new()),
                reloads: AtomicU64::new(0),
            }),
        })
    }

    /// Spawn the background watcher. Call once, from within a Tokio runtime.
    ///
    /// The returned handle resolves when the watcher stops, either because the
    /// shutdown token fired or because watching failed. In the latter case the
    /// list keeps answering queries from its last snapshot.
    pub fn start_monitoring(&self) -> JoinHandle<WatchExit> {
        watcher::spawn(self.inner.clone())
    }

    /// Check whether `ip` is currently in the list, reloading first if the file changed.
    pub fn is_matched(&self, ip: IpAddr) -> bool {
        self.inner.reload_if_needed();
        self.inner.addresses.load().iter().any(|listed| *listed == ip)
    }

    /// The current snapshot, without triggering a reload.
    pub fn snapshot(&self) -> Arc<Vec<IpAddr>> {
        self.inner.addresses.load_full()
    }

    /// Whether a change has been observed that the next query will pick up.
    pub fn reload_pending(&self) -> bool {
        *self.inner.reload_needed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of times the file has been parsed, successfully or not.
    pub fn reload_count(&self) -> u64 {
        self.inner.reloads.load(Ordering::Relaxed)
    }

    /// Normalized path of the list file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &Arc<ListState> {
        &self.inner
    }
}

impl std::fmt::Debug for IpList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpList")
            .field("path", &self.inner.path)
            .field("addresses", &self.inner.addresses.load().len())
            .finish()
    }
}

/// Canonicalize the parent directory so watch events can be compared by equality.
fn normalize_path(path: &Path) -> ListResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| ListError::InvalidPath {
        path: path.to_path_buf(),
    })?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let dir = std::fs::canonicalize(parent)
        .ok()
        .filter(|dir| dir.is_dir())
        .ok_or_else(|| ListError::DirectoryMissing {
            path: path.to_path_buf(),
        })?;

    Ok(dir.join(file_name))
}
