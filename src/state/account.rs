//! Account entity.
//!
//! Accounts are owned by the account-storage collaborator; this core
//! holds the live in-memory relation and signals persistence through
//! [`crate::collab::Storage`]. The friends list lives here because its
//! order is the account's own ranking signal.

/// Canonical lookup key for an account: the lowercased name.
pub type AccountKey = String;

/// Canonical key for `name`.
pub fn account_key(name: &str) -> AccountKey {
    name.to_ascii_lowercase()
}

/// Scope of one authority flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlagScope {
    #[default]
    Off,
    Global,
    /// Granted only inside the named channel.
    Channel(String),
}

impl FlagScope {
    pub fn is_set(&self) -> bool {
        !matches!(self, FlagScope::Off)
    }

    pub fn is_global(&self) -> bool {
        matches!(self, FlagScope::Global)
    }
}

/// Boolean authority flags, each optionally scoped to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFlags {
    pub admin: FlagScope,
    pub operator: FlagScope,
    pub mute: FlagScope,
    pub lock: FlagScope,
}

/// One account's command-relevant state.
#[derive(Debug, Clone)]
pub struct Account {
    /// Display name, case preserved.
    pub name: String,
    /// 8-bit command-group bitmask; bit n set means membership in
    /// group n+1.
    pub groups: u8,
    pub auth: AuthFlags,
    /// Tag of the clan this account relates to, including a pending
    /// invitation. At most one relation at a time.
    pub clan: Option<String>,
    /// Ordered friends list; position 0 is most prioritized. Entries
    /// are account keys, unique per list.
    pub friends: Vec<AccountKey>,
}

impl Account {
    /// New account holding only the everyone bit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: 0b0000_0001,
            auth: AuthFlags::default(),
            clan: None,
            friends: Vec::new(),
        }
    }

    pub fn key(&self) -> AccountKey {
        account_key(&self.name)
    }

    /// 0-based position of `target` in the friends list.
    pub fn friend_position(&self, target: &AccountKey) -> Option<usize> {
        self.friends.iter().position(|f| f == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_lowercased_name() {
        let account = Account::new("Thrall");
        assert_eq!(account.key(), "thrall");
        assert_eq!(account.name, "Thrall");
    }

    #[test]
    fn new_account_carries_everyone_bit() {
        assert_eq!(Account::new("x").groups, 1);
    }

    #[test]
    fn flag_scopes() {
        let mut flags = AuthFlags::default();
        assert!(!flags.admin.is_set());
        flags.admin = FlagScope::Global;
        assert!(flags.admin.is_set() && flags.admin.is_global());
        flags.operator = FlagScope::Channel("The Keep".into());
        assert!(flags.operator.is_set() && !flags.operator.is_global());
    }
}
