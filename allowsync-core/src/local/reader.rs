//! Readers for the host-owned JSON list files.
//!
//! The files are owned by the host process and may contain per-entry
//! garbage (missing uuid or name). Entries are surfaced as-is so the
//! reconciler can skip the malformed ones without aborting a pass.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::LocalError;
use crate::model::DEFAULT_OP_LEVEL;

/// One entry of `whitelist.json`. Either field may be null or absent.
#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistEntry {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of `ops.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpEntry {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default, rename = "bypassesPlayerLimit")]
    pub bypasses_player_limit: Option<bool>,
}

impl OpEntry {
    /// Privilege level, defaulted when the file omits it.
    pub fn level_or_default(&self) -> i64 {
        self.level.unwrap_or(DEFAULT_OP_LEVEL)
    }

    /// Limit-bypass flag, defaulted when the file omits it.
    pub fn bypasses_player_limit_or_default(&self) -> bool {
        self.bypasses_player_limit.unwrap_or(false)
    }
}

/// Parse a whitelist file into its ordered entries.
pub fn read_whitelist(path: &Path) -> Result<Vec<WhitelistEntry>, LocalError> {
    let contents = fs::read_to_string(path).map_err(|source| LocalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LocalError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an op list file into its ordered entries.
pub fn read_ops(path: &Path) -> Result<Vec<OpEntry>, LocalError> {
    let contents = fs::read_to_string(path).map_err(|source| LocalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LocalError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
