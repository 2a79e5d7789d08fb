//! Bidirectional reconciliation between the local lists and the store.
//!
//! Two symmetric directions per list:
//! - push (local-authoritative): local file entries are upserted into
//!   the store with the membership flag forced on.
//! - pull (remote-authoritative): store rows drive add/remove calls
//!   against the host's live list.
//!
//! Plus per-player fast paths for live admin commands. All of it runs
//! on fire-and-forget background tasks; correctness across concurrent
//! passes rests on per-statement atomicity and last-write-wins, never
//! on application-level locking. A failure partway through a pass
//! leaves earlier writes applied — partial application is a documented
//! outcome, not a bug.

mod service;
mod tasks;


pub use service::SyncService;
pub use tasks::{SyncHandle, TaskPool};
