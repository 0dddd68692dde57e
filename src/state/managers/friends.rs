//! Ordered friends list.
//!
//! Each account carries an ordered, capacity-bounded list of account
//! keys. Mutuality is never stored: it is derived from the reverse
//! list at read time, so a stale pairing heals itself on the next
//! query. Positions in outcomes are 0-based; handlers render the
//! 1-based positions the wire acks carry.

use thiserror::Error;
use tracing::debug;

use crate::collab::{
    FRIEND_FLAG_AWAY, FRIEND_FLAG_DND, FRIEND_FLAG_MUTUAL, PresenceSummary,
};
use crate::state::realm::lock_account_pair;
use crate::state::{AccountKey, Realm, account_key};

/// Friends list failures. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FriendsError {
    #[error("That user does not exist.")]
    TargetNotFound,

    #[error("You can't choose yourself!")]
    SelfReference,

    #[error("You can only have a maximum of {0} friends.")]
    CapacityExceeded(usize),

    #[error("{0} is already on your friends list!")]
    AlreadyFriends(String),

    #[error("{0} was not found on your friends list.")]
    NotOnList(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Outcome of `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendAdded {
    /// Display name as the target account spells it.
    pub target_name: String,
    pub target_key: AccountKey,
    /// 0-based position of the new entry (always the tail).
    pub position: usize,
    /// True when the target lists the owner back.
    pub mutual: bool,
}

/// Outcome of `promote`/`demote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// 0-based positions after the swap; `upper < lower`.
    Swapped { upper: usize, lower: usize },
    AlreadyTop,
    AlreadyBottom,
}

/// One row of `/f list`.
#[derive(Debug, Clone)]
pub struct FriendView {
    /// 1-based list position.
    pub position: usize,
    pub name: String,
    pub mutual: bool,
    pub presence: PresenceSummary,
}

impl FriendView {
    /// Status bits for the friend-add wire ack.
    pub fn status_flags(&self) -> u8 {
        let mut flags = 0;
        if self.mutual {
            flags |= FRIEND_FLAG_MUTUAL;
        }
        if self.presence.dnd {
            flags |= FRIEND_FLAG_DND;
        }
        if self.presence.away {
            flags |= FRIEND_FLAG_AWAY;
        }
        flags
    }
}

/// Friends list manager; a thin view over the realm.
pub struct FriendsManager<'a> {
    realm: &'a Realm,
}

impl<'a> FriendsManager<'a> {
    pub fn new(realm: &'a Realm) -> Self {
        Self { realm }
    }

    /// Append `target_name` to the owner's list. Rejects self, unknown
    /// accounts, duplicates, and a full list, in that order.
    pub async fn add(
        &self,
        owner_key: &AccountKey,
        target_name: &str,
    ) -> Result<FriendAdded, FriendsError> {
        let target_key = account_key(target_name);
        if target_key == *owner_key {
            return Err(FriendsError::SelfReference);
        }
        let Some(target_arc) = self.realm.find_account(target_name) else {
            return Err(FriendsError::TargetNotFound);
        };
        let owner_arc = self.owner(owner_key)?;

        let (mut owner, target) =
            lock_account_pair(&owner_arc, owner_key, &target_arc, &target_key).await;
        if owner.friend_position(&target_key).is_some() {
            return Err(FriendsError::AlreadyFriends(target.name.clone()));
        }
        let max = self.realm.config.limits.max_friends;
        if owner.friends.len() >= max {
            return Err(FriendsError::CapacityExceeded(max));
        }

        owner.friends.push(target_key.clone());
        let position = owner.friends.len() - 1;
        let mutual = target.friend_position(owner_key).is_some();
        self.realm.storage.save_account(&owner);

        debug!(owner = %owner_key, target = %target_key, mutual, "friend added");
        Ok(FriendAdded {
            target_name: target.name.clone(),
            target_key,
            position,
            mutual,
        })
    }

    /// Remove `target_name` from the owner's list. Works on list
    /// entries directly, so a friend whose account has since vanished
    /// can still be dropped. Returns the 0-based position the entry
    /// held.
    pub async fn remove(
        &self,
        owner_key: &AccountKey,
        target_name: &str,
    ) -> Result<usize, FriendsError> {
        let target_key = account_key(target_name);
        let owner_arc = self.owner(owner_key)?;
        let mut owner = owner_arc.write().await;

        let position = owner
            .friend_position(&target_key)
            .ok_or_else(|| FriendsError::NotOnList(target_name.to_string()))?;
        owner.friends.remove(position);
        self.realm.storage.save_account(&owner);

        debug!(owner = %owner_key, target = %target_key, position, "friend removed");
        Ok(position)
    }

    /// Swap `target_name` with its upper neighbor. Position 0 is a
    /// reported no-op, not an error.
    pub async fn promote(
        &self,
        owner_key: &AccountKey,
        target_name: &str,
    ) -> Result<MoveOutcome, FriendsError> {
        self.shift(owner_key, target_name, true).await
    }

    /// Swap `target_name` with its lower neighbor. The last position is
    /// a reported no-op, not an error.
    pub async fn demote(
        &self,
        owner_key: &AccountKey,
        target_name: &str,
    ) -> Result<MoveOutcome, FriendsError> {
        self.shift(owner_key, target_name, false).await
    }

    async fn shift(
        &self,
        owner_key: &AccountKey,
        target_name: &str,
        up: bool,
    ) -> Result<MoveOutcome, FriendsError> {
        let target_key = account_key(target_name);
        let owner_arc = self.owner(owner_key)?;
        let mut owner = owner_arc.write().await;

        let position = owner
            .friend_position(&target_key)
            .ok_or_else(|| FriendsError::NotOnList(target_name.to_string()))?;
        let outcome = if up {
            if position == 0 {
                return Ok(MoveOutcome::AlreadyTop);
            }
            owner.friends.swap(position - 1, position);
            MoveOutcome::Swapped {
                upper: position - 1,
                lower: position,
            }
        } else {
            if position + 1 == owner.friends.len() {
                return Ok(MoveOutcome::AlreadyBottom);
            }
            owner.friends.swap(position, position + 1);
            MoveOutcome::Swapped {
                upper: position,
                lower: position + 1,
            }
        };
        self.realm.storage.save_account(&owner);
        Ok(outcome)
    }

    /// Snapshot of the owner's list with mutuality and presence
    /// resolved per entry.
    pub async fn list(&self, owner_key: &AccountKey) -> Result<Vec<FriendView>, FriendsError> {
        let owner_arc = self.owner(owner_key)?;
        let entries: Vec<AccountKey> = owner_arc.read().await.friends.clone();

        let mut views = Vec::with_capacity(entries.len());
        for (index, friend_key) in entries.into_iter().enumerate() {
            let (name, mutual) = match self.realm.find_account(&friend_key) {
                Some(arc) => {
                    let friend = arc.read().await;
                    (
                        friend.name.clone(),
                        friend.friend_position(owner_key).is_some(),
                    )
                }
                // Entry survives account deletion; shown by key, never
                // mutual.
                None => (friend_key.clone(), false),
            };
            views.push(FriendView {
                position: index + 1,
                name,
                mutual,
                presence: self.realm.presence.locate(&friend_key),
            });
        }
        Ok(views)
    }

    fn owner(
        &self,
        key: &AccountKey,
    ) -> Result<std::sync::Arc<tokio::sync::RwLock<crate::state::Account>>, FriendsError> {
        self.realm
            .find_account(key)
            .ok_or_else(|| FriendsError::Internal(format!("account {key} missing from registry")))
    }

    /// Keys of mutual friends currently online, for `/f msg` fan-out.
    pub async fn mutual_online(
        &self,
        owner_key: &AccountKey,
    ) -> Result<Vec<AccountKey>, FriendsError> {
        let views = self.list(owner_key).await?;
        Ok(views
            .into_iter()
            .filter(|v| v.mutual && v.presence.is_online())
            .map(|v| account_key(&v.name))
            .collect())
    }
}
