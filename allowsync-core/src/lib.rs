//! allowsync-core
//!
//! Keeps a game server's local whitelist and operator lists in sync
//! with a shared SQLite store, so independent server instances can
//! share one authoritative allow-list. The heart of the crate is the
//! [`sync::SyncService`] reconciler; the rest is the storage, local
//! file, host, and configuration plumbing it stands on.

pub mod config;
pub mod host;
pub mod local;
pub mod logging;
pub mod model;
pub mod store;
pub mod sync;

pub use config::{Config, ConfigError, SyncConfig};
pub use host::{HostError, PlayerList};
pub use local::{LocalError, LocalStore};
pub use logging::{init_logging, LogLevel};
pub use model::{MembershipRecord, OpRecord, PlayerProfile};
pub use store::{RemoteStore, StoreError};
pub use sync::{SyncHandle, SyncService};
