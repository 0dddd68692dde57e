//! Clan entity and role hierarchy.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::account::AccountKey;

/// Canonical lookup key for a clan tag.
pub fn clan_key(tag: &str) -> String {
    tag.to_ascii_uppercase()
}

/// Ordered clan ranks. Declaration order is rank order, so the derived
/// `Ord` is the single source of truth for every outrank check - there
/// are no per-role comparison ladders anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClanRole {
    /// Probationary rank for fresh invitees when `clan_newer_time` is
    /// configured.
    New,
    Peon,
    Grunt,
    Shaman,
    Chieftain,
}

impl ClanRole {
    pub fn display_name(self) -> &'static str {
        match self {
            ClanRole::New => "New",
            ClanRole::Peon => "Peon",
            ClanRole::Grunt => "Grunt",
            ClanRole::Shaman => "Shaman",
            ClanRole::Chieftain => "Chieftain",
        }
    }

    /// Whether this role strictly outranks `other`.
    pub fn outranks(self, other: ClanRole) -> bool {
        self > other
    }

    /// Roles settable through `/clan <role> <user>`.
    pub fn from_subcommand(sub: &str) -> Option<ClanRole> {
        match sub {
            "chieftain" => Some(ClanRole::Chieftain),
            "shaman" => Some(ClanRole::Shaman),
            "grunt" => Some(ClanRole::Grunt),
            "peon" => Some(ClanRole::Peon),
            _ => None,
        }
    }
}

/// Relation between one account and one clan.
///
/// `full_member == false` is a pending invitation occupying the
/// account's single membership slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanMember {
    pub role: ClanRole,
    pub full_member: bool,
    pub join_time: Option<DateTime<Utc>>,
}

impl ClanMember {
    pub fn invited(role: ClanRole) -> Self {
        Self {
            role,
            full_member: false,
            join_time: None,
        }
    }

    pub fn founder(now: DateTime<Utc>) -> Self {
        Self {
            role: ClanRole::Chieftain,
            full_member: true,
            join_time: Some(now),
        }
    }
}

/// Persistent clan entity.
#[derive(Debug, Clone)]
pub struct Clan {
    /// Short unique identifier, case preserved.
    pub tag: String,
    pub name: String,
    pub motd: String,
    /// Display/grouping channel name.
    pub channel: String,
    /// Flips exactly once, when enough invitees have accepted.
    pub created: bool,
    pub creation_time: Option<DateTime<Utc>>,
    /// Acceptances counted toward the creation threshold.
    pub accepted_invites: u32,
    /// Member roster keyed by account key, pending invites included.
    pub roster: HashMap<AccountKey, ClanMember>,
}

impl Clan {
    pub fn new(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            name: name.into(),
            motd: String::new(),
            channel: String::new(),
            created: false,
            creation_time: None,
            accepted_invites: 0,
            roster: HashMap::new(),
        }
    }

    pub fn member(&self, key: &AccountKey) -> Option<&ClanMember> {
        self.roster.get(key)
    }

    /// Keys of accepted members, pending invites excluded.
    pub fn full_member_keys(&self) -> impl Iterator<Item = &AccountKey> {
        self.roster
            .iter()
            .filter(|(_, m)| m.full_member)
            .map(|(k, _)| k)
    }
}
