//! Social-graph and command-surface limits.

use super::defaults;
use serde::Deserialize;

/// Limits governing the friends list and the clan lifecycle.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum entries in one account's friends list (default: 20).
    #[serde(default = "defaults::default_max_friends")]
    pub max_friends: usize,
    /// Invitees that must accept before a new clan flips to created
    /// (default: 2). Zero creates the clan at `/clan create` time.
    #[serde(default = "defaults::default_clan_min_invites")]
    pub clan_min_invites: u32,
    /// Probation window in seconds for freshly invited members. When
    /// non-zero, invitees enter at the New rank instead of Peon
    /// (default: 0, disabled).
    #[serde(default)]
    pub clan_newer_time: u64,
    /// Route unknown `//`-prefixed input to the secondary alias
    /// resolver instead of rejecting it (default: false).
    #[serde(default)]
    pub extra_commands: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_friends: defaults::default_max_friends(),
            clan_min_invites: defaults::default_clan_min_invites(),
            clan_newer_time: 0,
            extra_commands: false,
        }
    }
}
