//! Record types shared by the local lists and the remote store.

use uuid::Uuid;

/// Op privilege level assigned when a record is created from a bare add
/// action without source attribute data.
pub const DEFAULT_OP_LEVEL: i64 = 1;

/// A resolved player identity, as handed over by an admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub uuid: Uuid,
    pub name: String,
}

impl PlayerProfile {
    pub fn new(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

/// One row of the `whitelist` table.
///
/// The uuid is the unique key; the name is informational only and never
/// used for matching. Rows are never physically deleted — removal flips
/// `whitelisted` to false so a prior "yes" can be overridden by a later
/// "no".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRecord {
    pub uuid: String,
    pub name: String,
    pub whitelisted: bool,
}

impl MembershipRecord {
    /// An active (whitelisted) record.
    pub fn active(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            whitelisted: true,
        }
    }

    /// A logically deleted record.
    pub fn inactive(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            whitelisted: false,
        }
    }

    /// Resolve the row into a profile for host list calls.
    pub fn profile(&self) -> Result<PlayerProfile, uuid::Error> {
        Ok(PlayerProfile::new(Uuid::parse_str(&self.uuid)?, self.name.clone()))
    }
}

/// One row of the `op` table.
///
/// Same upsert / logical-delete lifecycle as [`MembershipRecord`], with
/// the extra privilege attributes carried alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpRecord {
    pub uuid: String,
    pub name: String,
    /// Privilege level, 1 (least privileged) through 4.
    pub level: i64,
    pub bypasses_player_limit: bool,
    pub is_op: bool,
}

impl OpRecord {
    /// An active op record with explicit attributes.
    pub fn active(
        uuid: impl Into<String>,
        name: impl Into<String>,
        level: i64,
        bypasses_player_limit: bool,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            level,
            bypasses_player_limit,
            is_op: true,
        }
    }

    /// An active op record with default attributes (level 1, no limit
    /// bypass), used when no source attribute data is available.
    pub fn with_defaults(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self::active(uuid, name, DEFAULT_OP_LEVEL, false)
    }

    /// Resolve the row into a profile for host list calls.
    pub fn profile(&self) -> Result<PlayerProfile, uuid::Error> {
        Ok(PlayerProfile::new(Uuid::parse_str(&self.uuid)?, self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_record_constructors() {
        let active = MembershipRecord::active("a-uuid", "alice");
        assert!(active.whitelisted);

        let inactive = MembershipRecord::inactive("a-uuid", "alice");
        assert!(!inactive.whitelisted);
        assert_eq!(active.uuid, inactive.uuid);
    }

    #[test]
    fn test_op_record_defaults() {
        let record = OpRecord::with_defaults("a-uuid", "alice");
        assert_eq!(record.level, DEFAULT_OP_LEVEL);
        assert!(!record.bypasses_player_limit);
        assert!(record.is_op);
    }

    #[test]
    fn test_profile_rejects_malformed_uuid() {
        let record = MembershipRecord::active("not-a-uuid", "alice");
        assert!(record.profile().is_err());
    }

    #[test]
    fn test_profile_roundtrip() {
        let uuid = Uuid::new_v4();
        let record = MembershipRecord::active(uuid.to_string(), "alice");
        let profile = record.profile().unwrap();
        assert_eq!(profile.uuid, uuid);
        assert_eq!(profile.name, "alice");
    }
}
