//! Filesystem watcher for a single IP list.
//!
//! # States
//! ```text
//! Starting → Watching: attached to the list file's directory
//! Starting → Stopped:  directory missing or watcher could not attach
//! Watching → Watching: unrelated event or non-fatal watcher error (logged)
//! Watching → Watching: create/write of the list file (list marked stale)
//! Watching → Stopped:  shutdown token cancelled, event channel closed,
//!                      or the directory itself removed or moved away
//! ```
//!
//! The watcher never parses the file itself. Deletes are not acted on; a
//! removed file is noticed by the next reload that some other event triggers.

use std::path::Path;
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ListError, ListResult};
use crate::iplist::store::ListState;
use crate::observability::metrics;

/// Why a watcher task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchExit {
    /// The owning lifecycle signalled shutdown.
    Shutdown,
    /// The underlying OS facility closed the event channel.
    ChannelClosed,
    /// The watched directory itself was removed or moved away.
    DirectoryRemoved,
    /// The watcher never attached to the directory.
    SetupFailed,
}

struct Subscription {
    watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<Event>,
    errors: mpsc::UnboundedReceiver<notify::Error>,
}

/// Attach to the list's directory and spawn the event loop.
///
/// Attaching happens before this returns, so a write made after
/// `start_monitoring` is never missed.
pub(crate) fn spawn(list: Arc<ListState>) -> JoinHandle<WatchExit> {
    let subscription = {
        let _enter = list.span.enter();
        subscribe(&list.path)
    };

    match subscription {
        Ok(Subscription {
            watcher,
            events,
            errors,
        }) => tokio::spawn(async move {
            // Held for the lifetime of the loop; dropping it releases the OS watch.
            let _watcher = watcher;
            run(list, events, errors).await
        }),
        Err(e) => {
            tracing::error!(parent: &list.span, error = %e, "Error watching the IP list file");
            tokio::spawn(async { WatchExit::SetupFailed })
        }
    }
}

fn subscribe(path: &Path) -> ListResult<Subscription> {
    let dir = path.parent().unwrap_or(path);
    if !dir.is_dir() {
        return Err(ListError::DirectoryMissing {
            path: path.to_path_buf(),
        });
    }

    let (event_tx, events) = mpsc::unbounded_channel();
    let (error_tx, errors) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(e) => {
                let _ = error_tx.send(e);
            }
        },
        Config::default(),
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    tracing::info!(dir = %dir.display(), "IP list watcher started");
    Ok(Subscription {
        watcher,
        events,
        errors,
    })
}

async fn run(
    list: Arc<ListState>,
    mut events: mpsc::UnboundedReceiver<Event>,
    mut errors: mpsc::UnboundedReceiver<notify::Error>,
) -> WatchExit {
    loop {
        tokio::select! {
            _ = list.shutdown.cancelled() => {
                tracing::debug!(parent: &list.span, "Shutdown signalled, stopping IP list watcher");
                return WatchExit::Shutdown;
            }
            error = errors.recv() => match error {
                Some(e) => tracing::error!(parent: &list.span, error = %e, "Error from file watcher"),
                None => {
                    tracing::error!(parent: &list.span, "File watcher was closed");
                    return WatchExit::ChannelClosed;
                }
            },
            event = events.recv() => match event {
                Some(event) => {
                    if let Some(exit) = handle_event(&list, &event) {
                        return exit;
                    }
                }
                None => {
                    tracing::error!(parent: &list.span, "File watcher was closed");
                    return WatchExit::ChannelClosed;
                }
            },
        }
    }
}

/// Returns `Some` when the event ends the watch.
fn handle_event(list: &ListState, event: &Event) -> Option<WatchExit> {
    let dir = list.path.parent()?;
    let dir_gone = matches!(
        event.kind,
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From))
    );
    if dir_gone && event.paths.iter().any(|p| p == dir) {
        tracing::error!(parent: &list.span, dir = %dir.display(), kind = ?event.kind, "Directory containing the IP file was removed or moved");
        return Some(WatchExit::DirectoryRemoved);
    }

    if !is_content_change(&event.kind) || !event.paths.iter().any(|p| *p == list.path) {
        tracing::trace!(parent: &list.span, kind = ?event.kind, paths = ?event.paths, "Ignoring filesystem event");
        return None;
    }

    metrics::record_watch_event();
    list.mark_reload_needed();
    tracing::debug!(parent: &list.span, kind = ?event.kind, "IP list file changed");
    None
}

/// Create and write are treated alike. A file renamed onto the list path counts
/// as a create; removals and metadata-only changes do not count.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Any
                    | ModifyKind::Data(_)
                    | ModifyKind::Other
                    | ModifyKind::Name(RenameMode::To | RenameMode::Both | RenameMode::Any)
            )
    )
}
