//! File-backed IP membership lists.
//!
//! # Data Flow
//! ```text
//! filesystem event (create/write of the list file)
//!     → watcher.rs (filters to the exact file, marks list stale)
//!
//! IpList::is_matched(ip)
//!     → store.rs (under lock: stale? → parser.rs reloads the file)
//!     → linear scan of the current snapshot
//! ```
//!
//! # Design Decisions
//! - The watcher never parses; reloads happen on the next query
//! - Snapshots are replaced wholesale, so a query never sees a partial list
//! - A failed reload keeps the previous snapshot and retries on the next query
//! - Exact address equality only, no CIDR ranges

pub mod parser;
pub mod store;
pub mod watcher;

pub use store::IpList;
pub use watcher::WatchExit;
