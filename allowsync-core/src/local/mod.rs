//! Local store adapter
//!
//! Read-only view over the host's membership list files plus
//! write-through calls into the host's live list API. The reconciler
//! only ever talks to this adapter, never to the files or the host
//! directly.

use std::path::PathBuf;
use std::sync::Arc;

mod error;
mod reader;

pub use error::LocalError;
pub use reader::{read_ops, read_whitelist, OpEntry, WhitelistEntry};

use crate::host::{HostError, PlayerList};
use crate::model::PlayerProfile;

/// File name of the host's whitelist, relative to the server directory.
pub const WHITELIST_FILE: &str = "whitelist.json";

/// File name of the host's op list, relative to the server directory.
pub const OPS_FILE: &str = "ops.json";

/// Adapter over the host's local lists.
///
/// Snapshots are point-in-time reads taken at the start of a
/// reconciliation pass and discarded afterwards; they are never shared
/// across passes.
pub struct LocalStore<H> {
    server_dir: PathBuf,
    host: Arc<H>,
}

impl<H> Clone for LocalStore<H> {
    fn clone(&self) -> Self {
        Self {
            server_dir: self.server_dir.clone(),
            host: Arc::clone(&self.host),
        }
    }
}

impl<H: PlayerList> LocalStore<H> {
    pub fn new(server_dir: impl Into<PathBuf>, host: Arc<H>) -> Self {
        Self {
            server_dir: server_dir.into(),
            host,
        }
    }

    /// Ordered snapshot of the whitelist file.
    pub fn whitelist_snapshot(&self) -> Result<Vec<WhitelistEntry>, LocalError> {
        read_whitelist(&self.server_dir.join(WHITELIST_FILE))
    }

    /// Ordered snapshot of the op list file.
    pub fn ops_snapshot(&self) -> Result<Vec<OpEntry>, LocalError> {
        read_ops(&self.server_dir.join(OPS_FILE))
    }

    /// Write-through: add the player to the host's live whitelist.
    pub fn add_whitelisted(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.host.add_whitelisted_player(profile)
    }

    /// Write-through: remove the player from the host's live whitelist.
    pub fn remove_whitelisted(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.host.remove_player_from_whitelist(profile)
    }

    /// Write-through: op the player on the host.
    pub fn add_op(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.host.add_op(profile)
    }

    /// Write-through: de-op the player on the host.
    pub fn remove_op(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.host.remove_op(profile)
    }
}
