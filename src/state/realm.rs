//! The Realm: shared registries and collaborator handles.
//!
//! Lock discipline, crate-wide:
//! 1. never hold a `DashMap` ref across an `.await` - clone the `Arc`
//!    out and drop the ref first;
//! 2. a clan lock is always taken before any account lock;
//! 3. two account locks are taken in lexicographic key order.
//!
//! Rule 2 means entry points that start from an account (accept,
//! leave) read the clan tag under a short account lock, release it,
//! lock the clan, then relock the account and revalidate the relation.

use crate::collab::{
    AliasResolver, Messenger, NoAliases, NullMessenger, NullPresence, NullStorage, Presence,
    Storage,
};
use crate::config::Config;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::account::{Account, AccountKey, account_key};
use super::clan::{Clan, clan_key};

/// Shared server state handed to every handler.
pub struct Realm {
    accounts: DashMap<AccountKey, Arc<RwLock<Account>>>,
    clans: DashMap<String, Arc<RwLock<Clan>>>,
    pub config: Arc<Config>,
    pub presence: Arc<dyn Presence>,
    pub messenger: Arc<dyn Messenger>,
    pub storage: Arc<dyn Storage>,
    pub aliases: Arc<dyn AliasResolver>,
}

impl Realm {
    /// New realm with no-op collaborators. Replace them with the
    /// `with_*` builders before serving real sessions.
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            accounts: DashMap::new(),
            clans: DashMap::new(),
            config,
            presence: Arc::new(NullPresence),
            messenger: Arc::new(NullMessenger),
            storage: Arc::new(NullStorage),
            aliases: Arc::new(NoAliases),
        }
    }

    pub fn with_presence(mut self, presence: Arc<dyn Presence>) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = messenger;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_aliases(mut self, aliases: Arc<dyn AliasResolver>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Register an account, replacing any previous entry for the key.
    pub fn add_account(&self, account: Account) -> Arc<RwLock<Account>> {
        let key = account.key();
        let arc = Arc::new(RwLock::new(account));
        self.accounts.insert(key, arc.clone());
        arc
    }

    /// Look up an account by (case-insensitive) name.
    pub fn find_account(&self, name: &str) -> Option<Arc<RwLock<Account>>> {
        self.accounts
            .get(&account_key(name))
            .map(|entry| entry.value().clone())
    }

    /// Look up a clan by (case-insensitive) tag.
    pub fn find_clan(&self, tag: &str) -> Option<Arc<RwLock<Clan>>> {
        self.clans
            .get(&clan_key(tag))
            .map(|entry| entry.value().clone())
    }

    /// Insert a clan if its tag is free. Returns the shared handle, or
    /// `None` when the tag is taken.
    pub fn insert_clan(&self, clan: Clan) -> Option<Arc<RwLock<Clan>>> {
        match self.clans.entry(clan_key(&clan.tag)) {
            dashmap::Entry::Occupied(_) => None,
            dashmap::Entry::Vacant(slot) => {
                let arc = Arc::new(RwLock::new(clan));
                slot.insert(arc.clone());
                Some(arc)
            }
        }
    }

    /// Drop a clan from the registry. The caller is responsible for
    /// clearing member back-references first.
    pub fn remove_clan(&self, tag: &str) {
        self.clans.remove(&clan_key(tag));
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn clan_count(&self) -> usize {
        self.clans.len()
    }
}

/// Lock two distinct accounts for writing in lexicographic key order.
///
/// Both keys must differ; locking one account twice would deadlock.
pub(crate) async fn lock_account_pair<'a>(
    first: &'a Arc<RwLock<Account>>,
    first_key: &AccountKey,
    second: &'a Arc<RwLock<Account>>,
    second_key: &AccountKey,
) -> (
    tokio::sync::RwLockWriteGuard<'a, Account>,
    tokio::sync::RwLockWriteGuard<'a, Account>,
) {
    debug_assert_ne!(first_key, second_key);
    if first_key < second_key {
        let a = first.write().await;
        let b = second.write().await;
        (a, b)
    } else {
        let b = second.write().await;
        let a = first.write().await;
        (a, b)
    }
}
