//! Host player-list interface.
//!
//! The reconciler never touches the host's live in-memory lists
//! directly; it goes through this trait so the engine can be exercised
//! without a running game server. The host is assumed to serialize its
//! own list mutations.

use thiserror::Error;

use crate::model::PlayerProfile;

/// Errors a host can report for a live-list mutation.
///
/// Callers catch and log these; they are never propagated as a crash.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host could not resolve the identity to a live profile.
    #[error("player {uuid} could not be resolved to a live profile")]
    PlayerNotResolvable { uuid: String },

    /// The host rejected the mutation for another reason.
    #[error("host list rejected the mutation: {0}")]
    Rejected(String),
}

/// Live player-list API exposed by the host game server.
pub trait PlayerList: Send + Sync {
    /// Add a player to the host's live whitelist.
    fn add_whitelisted_player(&self, profile: &PlayerProfile) -> Result<(), HostError>;

    /// Remove a player from the host's live whitelist.
    fn remove_player_from_whitelist(&self, profile: &PlayerProfile) -> Result<(), HostError>;

    /// Grant a player operator status on the host.
    fn add_op(&self, profile: &PlayerProfile) -> Result<(), HostError>;

    /// Revoke a player's operator status on the host.
    fn remove_op(&self, profile: &PlayerProfile) -> Result<(), HostError>;
}
