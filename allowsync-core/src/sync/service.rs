//! The reconciler.
//!
//! One service instance owns the remote store handle, the local list
//! adapter, the op-sync flag, and the task pool. Every operation is
//! caught-and-logged at its boundary: nothing here returns an error to
//! the trigger site, and a failed pass looks identical to a slow one
//! from the caller's perspective.

use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, error, warn};

use super::tasks::{SyncHandle, TaskPool};
use crate::config::SyncConfig;
use crate::host::PlayerList;
use crate::local::LocalStore;
use crate::model::{MembershipRecord, OpRecord, PlayerProfile};
use crate::store::{RemoteStore, StoreError};

/// Bidirectional reconciliation engine for the whitelist and op lists.
pub struct SyncService<H> {
    store: RemoteStore,
    local: LocalStore<H>,
    sync_op_list: bool,
    tasks: TaskPool,
}

impl<H: PlayerList + 'static> SyncService<H> {
    pub fn new(store: RemoteStore, local: LocalStore<H>, config: &SyncConfig) -> Self {
        Self {
            store,
            local,
            sync_op_list: config.sync_op_list,
            tasks: TaskPool::new(config.max_concurrent_tasks),
        }
    }

    // ===== Push: local list -> remote store =====

    /// Push the local whitelist into the store.
    ///
    /// Every local entry with both uuid and name present is upserted
    /// with the membership flag forced on; push never deactivates a
    /// remote row that is merely absent locally. Malformed entries are
    /// skipped without aborting the pass.
    pub fn push_whitelist(&self) -> SyncHandle {
        let store = self.store.clone();
        let local = self.local.clone();
        self.tasks.spawn(move || push_whitelist_pass(&store, &local))
    }

    /// Push the local op list into the store, carrying level and
    /// limit-bypass attributes along. No-op when op syncing is off.
    pub fn push_op_list(&self) -> SyncHandle {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return self.tasks.spawn(|| {});
        }
        let store = self.store.clone();
        let local = self.local.clone();
        self.tasks.spawn(move || push_op_pass(&store, &local))
    }

    // ===== Pull: remote store -> local host list =====

    /// Merge the store's whitelist into the host's live whitelist.
    ///
    /// The local snapshot is taken once at the start and not refreshed;
    /// a local mutation racing an in-flight pull is resolved by
    /// whichever write lands last.
    pub fn pull_whitelist(&self) -> SyncHandle {
        let store = self.store.clone();
        let local = self.local.clone();
        self.tasks.spawn(move || pull_whitelist_pass(&store, &local))
    }

    /// Merge the store's op list into the host's live op list. No-op
    /// when op syncing is off.
    pub fn pull_op_list(&self) -> SyncHandle {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return self.tasks.spawn(|| {});
        }
        let store = self.store.clone();
        let local = self.local.clone();
        self.tasks.spawn(move || pull_op_pass(&store, &local))
    }

    // ===== Filtered queries =====

    /// Uuids of actively whitelisted players in the store.
    pub fn whitelisted_uuids(&self) -> Vec<String> {
        match self.store.membership_rows() {
            Ok(rows) => rows
                .into_iter()
                .filter(|row| row.whitelisted)
                .map(|row| row.uuid)
                .collect(),
            Err(err) => {
                error!(error = %err, "failed to query whitelisted uuids");
                Vec::new()
            }
        }
    }

    /// Names of actively whitelisted players in the store.
    pub fn whitelisted_names(&self) -> Vec<String> {
        match self.store.membership_rows() {
            Ok(rows) => rows
                .into_iter()
                .filter(|row| row.whitelisted)
                .map(|row| row.name)
                .collect(),
            Err(err) => {
                error!(error = %err, "failed to query whitelisted names");
                Vec::new()
            }
        }
    }

    /// Uuids of active ops in the store. Empty, without touching the
    /// store, when op syncing is off.
    pub fn opped_uuids(&self) -> Vec<String> {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return Vec::new();
        }
        match self.store.op_rows() {
            Ok(rows) => rows
                .into_iter()
                .filter(|row| row.is_op)
                .map(|row| row.uuid)
                .collect(),
            Err(err) => {
                error!(error = %err, "failed to query op uuids");
                Vec::new()
            }
        }
    }

    /// Names of active ops in the store. Empty, without touching the
    /// store, when op syncing is off.
    pub fn opped_names(&self) -> Vec<String> {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return Vec::new();
        }
        match self.store.op_rows() {
            Ok(rows) => rows
                .into_iter()
                .filter(|row| row.is_op)
                .map(|row| row.name)
                .collect(),
            Err(err) => {
                error!(error = %err, "failed to query op names");
                Vec::new()
            }
        }
    }

    // ===== Single-record mutations (admin fast path) =====

    /// Mark one player whitelisted in the store, independent of any
    /// in-flight full sync.
    pub fn add_whitelist_player(&self, profile: PlayerProfile) -> SyncHandle {
        let store = self.store.clone();
        self.tasks.spawn(move || {
            let started = Instant::now();
            let record = MembershipRecord::active(profile.uuid.to_string(), &profile.name);
            match store.upsert_membership(&record) {
                Ok(()) => debug!(
                    player = %profile.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "player added to whitelist table"
                ),
                Err(err) => error!(
                    player = %profile.name,
                    error = %err,
                    "failed to add player to whitelist table"
                ),
            }
        })
    }

    /// Logically delete one player from the store's whitelist.
    pub fn remove_whitelist_player(&self, profile: PlayerProfile) -> SyncHandle {
        let store = self.store.clone();
        self.tasks.spawn(move || {
            let started = Instant::now();
            let record = MembershipRecord::inactive(profile.uuid.to_string(), &profile.name);
            match store.upsert_membership(&record) {
                Ok(()) => debug!(
                    player = %profile.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "player removed from whitelist table"
                ),
                Err(err) => error!(
                    player = %profile.name,
                    error = %err,
                    "failed to remove player from whitelist table"
                ),
            }
        })
    }

    /// Mark one player as op in the store, preserving any stored level
    /// and limit-bypass attributes.
    ///
    /// The lookup-then-write is not transactional with respect to
    /// concurrent writers; last write wins.
    pub fn add_op_player(&self, profile: PlayerProfile) -> SyncHandle {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return self.tasks.spawn(|| {});
        }
        let store = self.store.clone();
        self.tasks.spawn(move || {
            let started = Instant::now();
            let uuid = profile.uuid.to_string();
            let existing = match store.find_op(&uuid) {
                Ok(existing) => existing,
                Err(err) => {
                    error!(player = %profile.name, error = %err, "failed to look up op record");
                    return;
                }
            };
            let record = match existing {
                Some(prior) => OpRecord::active(
                    uuid,
                    &profile.name,
                    prior.level,
                    prior.bypasses_player_limit,
                ),
                None => OpRecord::with_defaults(uuid, &profile.name),
            };
            match store.upsert_op(&record) {
                Ok(()) => debug!(
                    player = %profile.name,
                    level = record.level,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "player added to op table"
                ),
                Err(err) => error!(
                    player = %profile.name,
                    error = %err,
                    "failed to add player to op table"
                ),
            }
        })
    }

    /// Logically delete one player from the store's op list. Stored
    /// level and limit-bypass attributes are left in place for a future
    /// re-add.
    pub fn remove_op_player(&self, profile: PlayerProfile) -> SyncHandle {
        if !self.sync_op_list {
            log_op_sync_disabled();
            return self.tasks.spawn(|| {});
        }
        let store = self.store.clone();
        self.tasks.spawn(move || {
            let started = Instant::now();
            match store.remove_op(&profile.uuid.to_string(), &profile.name) {
                Ok(()) => debug!(
                    player = %profile.name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "player removed from op table"
                ),
                Err(err) => error!(
                    player = %profile.name,
                    error = %err,
                    "failed to remove player from op table"
                ),
            }
        })
    }
}

fn log_op_sync_disabled() {
    warn!(
        "op list syncing is disabled in the configuration; \
         set sync.sync_op_list = true and restart to use this feature"
    );
}

fn push_whitelist_pass<H: PlayerList>(store: &RemoteStore, local: &LocalStore<H>) {
    let snapshot = match local.whitelist_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "whitelist push skipped, local list unreadable");
            return;
        }
    };

    let started = Instant::now();
    let mut records = 0usize;
    for entry in &snapshot {
        let (uuid, name) = match (&entry.uuid, &entry.name) {
            (Some(uuid), Some(name)) => (uuid, name),
            // Malformed entry in the host-owned file; not an error.
            _ => continue,
        };
        match store.upsert_membership(&MembershipRecord::active(uuid, name)) {
            Ok(()) => records += 1,
            Err(StoreError::Constraint(err)) => {
                warn!(uuid = %uuid, error = %err, "skipping unwritable whitelist record");
            }
            Err(err) => {
                error!(error = %err, records, "whitelist push aborted");
                return;
            }
        }
    }
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        records, "whitelist table updated"
    );
}

fn push_op_pass<H: PlayerList>(store: &RemoteStore, local: &LocalStore<H>) {
    let snapshot = match local.ops_snapshot() {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!(error = %err, "op push skipped, local list unreadable");
            return;
        }
    };

    let started = Instant::now();
    let mut records = 0usize;
    for entry in &snapshot {
        let (uuid, name) = match (&entry.uuid, &entry.name) {
            (Some(uuid), Some(name)) => (uuid, name),
            _ => continue,
        };
        let record = OpRecord::active(
            uuid,
            name,
            entry.level_or_default(),
            entry.bypasses_player_limit_or_default(),
        );
        match store.upsert_op(&record) {
            Ok(()) => records += 1,
            Err(StoreError::Constraint(err)) => {
                warn!(uuid = %uuid, error = %err, "skipping unwritable op record");
            }
            Err(err) => {
                error!(error = %err, records, "op push aborted");
                return;
            }
        }
    }
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        records, "op table updated"
    );
}

fn pull_whitelist_pass<H: PlayerList>(store: &RemoteStore, local: &LocalStore<H>) {
    let started = Instant::now();
    let rows = match store.membership_rows() {
        Ok(rows) => rows,
        Err(err) => {
            error!(error = %err, "whitelist pull aborted");
            return;
        }
    };
    let local_uuids = match local.whitelist_snapshot() {
        Ok(snapshot) => uuid_set(snapshot.into_iter().map(|entry| entry.uuid)),
        Err(err) => {
            error!(error = %err, "whitelist pull aborted, local list unreadable");
            return;
        }
    };

    let mut added = 0usize;
    let mut removed = 0usize;
    for row in rows {
        let profile = match row.profile() {
            Ok(profile) => profile,
            Err(_) => {
                warn!(uuid = %row.uuid, "skipping whitelist row with malformed uuid");
                continue;
            }
        };
        if row.whitelisted {
            if !local_uuids.contains(&row.uuid) {
                match local.add_whitelisted(&profile) {
                    Ok(()) => added += 1,
                    Err(err) => {
                        warn!(uuid = %row.uuid, error = %err, "host rejected whitelist add")
                    }
                }
            }
        } else if local_uuids.contains(&row.uuid) {
            match local.remove_whitelisted(&profile) {
                Ok(()) => removed += 1,
                Err(err) => {
                    warn!(uuid = %row.uuid, error = %err, "host rejected whitelist remove")
                }
            }
        }
    }
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        added, removed, "whitelist pulled into local list"
    );
}

fn pull_op_pass<H: PlayerList>(store: &RemoteStore, local: &LocalStore<H>) {
    let started = Instant::now();
    let rows = match store.op_rows() {
        Ok(rows) => rows,
        Err(err) => {
            error!(error = %err, "op pull aborted");
            return;
        }
    };
    let local_uuids = match local.ops_snapshot() {
        Ok(snapshot) => uuid_set(snapshot.into_iter().map(|entry| entry.uuid)),
        Err(err) => {
            error!(error = %err, "op pull aborted, local list unreadable");
            return;
        }
    };

    let mut added = 0usize;
    let mut removed = 0usize;
    for row in rows {
        let profile = match row.profile() {
            Ok(profile) => profile,
            Err(_) => {
                warn!(uuid = %row.uuid, "skipping op row with malformed uuid");
                continue;
            }
        };
        if row.is_op {
            if !local_uuids.contains(&row.uuid) {
                match local.add_op(&profile) {
                    Ok(()) => added += 1,
                    Err(err) => warn!(uuid = %row.uuid, error = %err, "host rejected op add"),
                }
            }
        } else if local_uuids.contains(&row.uuid) {
            match local.remove_op(&profile) {
                Ok(()) => removed += 1,
                Err(err) => warn!(uuid = %row.uuid, error = %err, "host rejected op remove"),
            }
        }
    }
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        added, removed, "op list pulled into local list"
    );
}

fn uuid_set(uuids: impl Iterator<Item = Option<String>>) -> HashSet<String> {
    uuids.flatten().collect()
}
