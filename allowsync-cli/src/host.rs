//! File-backed host list.
//!
//! A standalone CLI has no live game server to mutate, so the host
//! interface is satisfied by rewriting the JSON list files in place —
//! the same files a pull pass snapshots. Entries the host wrote that we
//! do not understand are carried through untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use allowsync_core::host::{HostError, PlayerList};
use allowsync_core::local::{OPS_FILE, WHITELIST_FILE};
use allowsync_core::model::{PlayerProfile, DEFAULT_OP_LEVEL};

/// Host player-list implementation that edits `whitelist.json` /
/// `ops.json` under the server directory.
pub struct JsonPlayerList {
    server_dir: PathBuf,
}

impl JsonPlayerList {
    pub fn new(server_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_dir: server_dir.into(),
        }
    }

    fn load(&self, file: &str) -> Result<Vec<Value>, HostError> {
        let path = self.server_dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| HostError::Rejected(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| HostError::Rejected(format!("cannot parse {}: {}", path.display(), e)))
    }

    fn save(&self, file: &str, entries: &[Value]) -> Result<(), HostError> {
        let path = self.server_dir.join(file);
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| HostError::Rejected(e.to_string()))?;
        fs::write(&path, contents)
            .map_err(|e| HostError::Rejected(format!("cannot write {}: {}", path.display(), e)))
    }

    fn append_if_absent(&self, file: &str, entry: Value) -> Result<(), HostError> {
        let uuid = entry
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default();
        let mut entries = self.load(file)?;
        if entries.iter().any(|e| entry_uuid(e) == Some(uuid.as_str())) {
            return Ok(());
        }
        entries.push(entry);
        self.save(file, &entries)
    }

    fn remove_by_uuid(&self, file: &str, uuid: &str) -> Result<(), HostError> {
        let mut entries = self.load(file)?;
        let before = entries.len();
        entries.retain(|e| entry_uuid(e) != Some(uuid));
        if entries.len() == before {
            return Ok(());
        }
        self.save(file, &entries)
    }
}

fn entry_uuid(entry: &Value) -> Option<&str> {
    entry.get("uuid").and_then(Value::as_str)
}

impl PlayerList for JsonPlayerList {
    fn add_whitelisted_player(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.append_if_absent(
            WHITELIST_FILE,
            json!({"uuid": profile.uuid.to_string(), "name": profile.name}),
        )
    }

    fn remove_player_from_whitelist(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.remove_by_uuid(WHITELIST_FILE, &profile.uuid.to_string())
    }

    fn add_op(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.append_if_absent(
            OPS_FILE,
            json!({
                "uuid": profile.uuid.to_string(),
                "name": profile.name,
                "level": DEFAULT_OP_LEVEL,
                "bypassesPlayerLimit": false,
            }),
        )
    }

    fn remove_op(&self, profile: &PlayerProfile) -> Result<(), HostError> {
        self.remove_by_uuid(OPS_FILE, &profile.uuid.to_string())
    }
}

/// Make sure both list files exist so snapshots of a fresh server
/// directory read as empty lists instead of failing.
pub fn ensure_list_files(server_dir: &Path) -> std::io::Result<()> {
    for file in [WHITELIST_FILE, OPS_FILE] {
        let path = server_dir.join(file);
        if !path.exists() {
            fs::write(&path, "[]")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_add_and_remove_whitelisted_player() {
        let dir = tempfile::tempdir().unwrap();
        ensure_list_files(dir.path()).unwrap();
        let host = JsonPlayerList::new(dir.path());
        let profile = PlayerProfile::new(Uuid::new_v4(), "alice");

        host.add_whitelisted_player(&profile).unwrap();
        // Adding twice keeps a single entry.
        host.add_whitelisted_player(&profile).unwrap();
        let entries = host.load(WHITELIST_FILE).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["name"], "alice");

        host.remove_player_from_whitelist(&profile).unwrap();
        assert!(host.load(WHITELIST_FILE).unwrap().is_empty());
    }

    #[test]
    fn test_add_op_writes_default_attributes() {
        let dir = tempfile::tempdir().unwrap();
        ensure_list_files(dir.path()).unwrap();
        let host = JsonPlayerList::new(dir.path());
        let profile = PlayerProfile::new(Uuid::new_v4(), "alice");

        host.add_op(&profile).unwrap();
        let entries = host.load(OPS_FILE).unwrap();
        assert_eq!(entries[0]["level"], 1);
        assert_eq!(entries[0]["bypassesPlayerLimit"], false);
    }

    #[test]
    fn test_unknown_entries_survive_a_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(WHITELIST_FILE),
            r#"[{"uuid": null, "name": "ghost", "extra": 1}]"#,
        )
        .unwrap();
        let host = JsonPlayerList::new(dir.path());

        host.add_whitelisted_player(&PlayerProfile::new(Uuid::new_v4(), "alice"))
            .unwrap();

        let entries = host.load(WHITELIST_FILE).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["extra"], 1);
    }

    #[test]
    fn test_remove_missing_player_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        ensure_list_files(dir.path()).unwrap();
        let host = JsonPlayerList::new(dir.path());

        host.remove_op(&PlayerProfile::new(Uuid::new_v4(), "nobody"))
            .unwrap();
        assert!(host.load(OPS_FILE).unwrap().is_empty());
    }
}
