//! Default value functions for configuration.

use std::collections::HashMap;

pub fn default_server_name() -> String {
    "tavernd".to_string()
}

pub fn default_max_friends() -> usize {
    20
}

pub fn default_clan_min_invites() -> u32 {
    2
}

/// Stock permission-group table.
///
/// Bit 1 is the everyone group; bit 8 is staff. Operators reshape this
/// freely in `[groups]`; a group absent from the table deactivates its
/// commands.
pub fn default_groups() -> HashMap<String, u8> {
    let mut groups = HashMap::new();
    groups.insert("everyone".to_string(), 0b0000_0001);
    groups.insert("staff".to_string(), 0b1000_0000);
    groups
}
