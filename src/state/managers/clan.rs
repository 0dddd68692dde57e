//! Clan lifecycle state machine.
//!
//! States per (account, clan) pair: no relation, invited
//! (`full_member == false`), member (by role), dissolved. Every
//! transition validates its preconditions under the clan's write lock
//! before mutating anything, so a rejected transition leaves no
//! partial update behind.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::collab::{NoticeKind, PresenceSummary};
use crate::state::{
    Account, AccountKey, Clan, ClanMember, ClanRole, Realm, account_key,
};

/// Clan transition failures. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClanError {
    #[error("You are not in a clan!")]
    NotInClan,

    #[error("You have no clan invitation.")]
    NoPending,

    #[error("You are already in a clan!")]
    AlreadyInClan,

    #[error("Clan tag {0} is already taken!")]
    TagTaken(String),

    #[error("That user does not exist.")]
    TargetNotFound,

    #[error("You can't choose yourself!")]
    CannotTargetSelf,

    #[error("{0} is not a member of your clan!")]
    NotAMember(String),

    #[error("User {0} is not online or is already member of clan!")]
    TargetUnavailable(String),

    #[error("You don't have the authority to do that!")]
    PermissionDenied,

    #[error("You can't do that to a {}!", .0.display_name())]
    RankProtected(ClanRole),

    #[error("{target} is already a {}!", .role.display_name())]
    AlreadyRole { target: String, role: ClanRole },

    /// A back-reference pointed at a clan that no longer exists.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Where an account stands with respect to clans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    None,
    Invited { clan_name: String },
    Full { role: ClanRole },
}

/// Outcome of `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Threshold is zero; the clan is live immediately.
    Created { clan_name: String },
    /// Waiting for `min_invites` acceptances.
    Pending { clan_name: String, min_invites: u32 },
}

/// Outcome of `invite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteOutcome {
    pub clan_name: String,
    pub invitee_name: String,
}

/// Outcome of `accept`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    pub clan_name: String,
    /// True only on the acceptance that flipped the clan to created.
    pub newly_created: bool,
}

/// Outcome of `set_role`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRoleOutcome {
    pub target_name: String,
    pub role: ClanRole,
    /// The clan now holds more than one Chieftain. Allowed by design;
    /// the caller must surface the warning.
    pub multi_chieftain: bool,
}

/// One roster row for `/clan list`.
#[derive(Debug, Clone)]
pub struct MemberView {
    /// 1-based list position.
    pub position: usize,
    pub name: String,
    pub role: ClanRole,
    pub presence: PresenceSummary,
}

/// Clan lifecycle manager; a thin view over the realm.
pub struct ClanManager<'a> {
    realm: &'a Realm,
}

impl<'a> ClanManager<'a> {
    pub fn new(realm: &'a Realm) -> Self {
        Self { realm }
    }

    /// Current membership state of `key`, for handler branching.
    pub async fn membership(&self, key: &AccountKey) -> Membership {
        let Some(tag) = self.clan_tag_of(key).await else {
            return Membership::None;
        };
        let Some(clan_arc) = self.realm.find_clan(&tag) else {
            return Membership::None;
        };
        let clan = clan_arc.read().await;
        match clan.member(key) {
            Some(member) if member.full_member => Membership::Full { role: member.role },
            Some(_) => Membership::Invited {
                clan_name: clan.name.clone(),
            },
            None => Membership::None,
        }
    }

    /// `create(account, tag, name)`: allowed only with no existing
    /// relation; tag must be globally unique. The founder becomes
    /// Chieftain immediately.
    pub async fn create(
        &self,
        founder_key: &AccountKey,
        tag: &str,
        name: &str,
    ) -> Result<CreateOutcome, ClanError> {
        let founder_arc = self.account(founder_key)?;
        let mut founder = founder_arc.write().await;
        if founder.clan.is_some() {
            return Err(ClanError::AlreadyInClan);
        }

        let min_invites = self.realm.config.limits.clan_min_invites;
        let now = Utc::now();
        let mut clan = Clan::new(tag, name);
        clan.roster
            .insert(founder_key.clone(), ClanMember::founder(now));
        if min_invites == 0 {
            clan.created = true;
            clan.creation_time = Some(now);
        }
        let created = clan.created;
        let clan_name = clan.name.clone();

        // The clan is inserted fully formed; nobody can observe a
        // half-built roster.
        let Some(clan_arc) = self.realm.insert_clan(clan) else {
            return Err(ClanError::TagTaken(tag.to_string()));
        };
        founder.clan = Some(tag.to_string());
        drop(founder);

        if created {
            let clan = clan_arc.read().await;
            self.realm.storage.save_clan(&clan);
            info!(tag = %tag, name = %clan_name, founder = %founder_key, "clan created");
            Ok(CreateOutcome::Created { clan_name })
        } else {
            info!(tag = %tag, name = %clan_name, founder = %founder_key, "clan pre-created");
            Ok(CreateOutcome::Pending {
                clan_name,
                min_invites,
            })
        }
    }

    /// `invite(inviter, invitee)`: inviter must be Shaman or better;
    /// invitee must be online and hold no clan relation.
    pub async fn invite(
        &self,
        inviter_key: &AccountKey,
        invitee_name: &str,
    ) -> Result<InviteOutcome, ClanError> {
        let (clan_arc, tag) = self.clan_of(inviter_key).await?;
        let mut clan = clan_arc.write().await;
        self.require_rank(&clan, inviter_key, ClanRole::Shaman)?;

        let invitee_key = account_key(invitee_name);
        if invitee_key == *inviter_key {
            return Err(ClanError::CannotTargetSelf);
        }
        let Some(invitee_arc) = self.realm.find_account(invitee_name) else {
            return Err(ClanError::TargetNotFound);
        };
        if !self.realm.presence.is_online(&invitee_key) {
            return Err(ClanError::TargetUnavailable(invitee_name.to_string()));
        }

        let mut invitee = invitee_arc.write().await;
        if invitee.clan.is_some() {
            return Err(ClanError::TargetUnavailable(invitee_name.to_string()));
        }

        // Fresh invitees sit at the probationary rank while a newer
        // window is configured.
        let role = if self.realm.config.limits.clan_newer_time > 0 {
            ClanRole::New
        } else {
            ClanRole::Peon
        };
        clan.roster
            .insert(invitee_key.clone(), ClanMember::invited(role));
        invitee.clan = Some(tag);
        let invitee_name = invitee.name.clone();

        debug!(clan = %clan.tag, invitee = %invitee_key, ?role, "invitation issued");
        Ok(InviteOutcome {
            clan_name: clan.name.clone(),
            invitee_name,
        })
    }

    /// Clan name of a pending invitation, for `/clan invite get`.
    pub async fn invitation(&self, key: &AccountKey) -> Result<String, ClanError> {
        match self.membership(key).await {
            Membership::Invited { clan_name } => Ok(clan_name),
            _ => Err(ClanError::NoPending),
        }
    }

    /// `accept(invitee)`: invited -> member. The acceptance that meets
    /// the invite threshold flips `created` exactly once, stamps the
    /// creation time, broadcasts the creation notice to online members,
    /// and persists the clan. Acceptances on an already-created clan
    /// never re-fire any of that.
    pub async fn accept(&self, invitee_key: &AccountKey) -> Result<AcceptOutcome, ClanError> {
        let (clan_arc, _tag) = self.clan_of_pending(invitee_key).await?;
        let mut clan = clan_arc.write().await;
        let member = clan
            .roster
            .get_mut(invitee_key)
            .ok_or(ClanError::NoPending)?;
        if member.full_member {
            return Err(ClanError::AlreadyInClan);
        }

        let now = Utc::now();
        member.full_member = true;
        member.join_time = Some(now);

        let mut newly_created = false;
        if !clan.created {
            clan.accepted_invites += 1;
            if clan.accepted_invites >= self.realm.config.limits.clan_min_invites {
                clan.created = true;
                clan.creation_time = Some(now);
                newly_created = true;
            }
        }

        if newly_created {
            let notice = format!("Clan {} has been created!", clan.name);
            for key in clan.full_member_keys() {
                if self.realm.presence.is_online(key) {
                    self.realm
                        .messenger
                        .notify(key, NoticeKind::Whisper, &notice);
                }
            }
            self.realm.storage.save_clan(&clan);
            info!(tag = %clan.tag, name = %clan.name, "clan creation threshold met");
        } else {
            debug!(tag = %clan.tag, member = %invitee_key, "invitation accepted");
        }

        Ok(AcceptOutcome {
            clan_name: clan.name.clone(),
            newly_created,
        })
    }

    /// `decline(invitee)`: invited -> no relation.
    pub async fn decline(&self, invitee_key: &AccountKey) -> Result<String, ClanError> {
        let (clan_arc, _tag) = self.clan_of_pending(invitee_key).await?;
        let mut clan = clan_arc.write().await;
        match clan.member(invitee_key) {
            Some(member) if !member.full_member => {}
            _ => return Err(ClanError::NoPending),
        }
        clan.roster.remove(invitee_key);
        let name = clan.name.clone();
        drop(clan);

        self.clear_backref(invitee_key).await?;
        Ok(name)
    }

    /// `leave(account)`: member -> no relation. The two-step
    /// confirmation happens at the handler; this is the committed
    /// transition.
    pub async fn leave(&self, key: &AccountKey) -> Result<(), ClanError> {
        let (clan_arc, _tag) = self.clan_of(key).await?;
        let mut clan = clan_arc.write().await;
        match clan.member(key) {
            Some(member) if member.full_member => {}
            _ => return Err(ClanError::NotInClan),
        }
        clan.roster.remove(key);
        self.realm.storage.save_clan(&clan);
        drop(clan);

        self.clear_backref(key).await?;
        Ok(())
    }

    /// `kick(actor, target)`: actor must be Shaman or better and must
    /// strictly outrank the target. Equal ranks never succeed.
    pub async fn kick(&self, actor_key: &AccountKey, target_name: &str) -> Result<(), ClanError> {
        let (clan_arc, _tag) = self.clan_of(actor_key).await?;
        let mut clan = clan_arc.write().await;
        let actor_role = self.require_rank(&clan, actor_key, ClanRole::Shaman)?;

        let target_key = account_key(target_name);
        if target_key == *actor_key {
            return Err(ClanError::CannotTargetSelf);
        }
        if self.realm.find_account(target_name).is_none() {
            return Err(ClanError::TargetNotFound);
        }
        let target = clan
            .member(&target_key)
            .ok_or_else(|| ClanError::NotAMember(target_name.to_string()))?;
        if !actor_role.outranks(target.role) {
            return Err(ClanError::RankProtected(target.role));
        }

        clan.roster.remove(&target_key);
        self.realm.storage.save_clan(&clan);
        info!(clan = %clan.tag, actor = %actor_key, target = %target_key, "member kicked");
        drop(clan);

        self.clear_backref(&target_key).await?;
        Ok(())
    }

    /// `set_role(actor, target, new_role)`: one table-driven primitive
    /// for promotions and demotions.
    ///
    /// Rules: a Chieftain may set any role (appointing a co-Chieftain
    /// raises the multi-Chieftain warning); a Shaman may only place
    /// targets below Shaman at ranks up to Grunt; a sitting Chieftain
    /// can never be reassigned through this path.
    pub async fn set_role(
        &self,
        actor_key: &AccountKey,
        target_name: &str,
        new_role: ClanRole,
    ) -> Result<SetRoleOutcome, ClanError> {
        let (clan_arc, _tag) = self.clan_of(actor_key).await?;
        let mut clan = clan_arc.write().await;
        let actor_role = self.require_rank(&clan, actor_key, ClanRole::Shaman)?;

        let target_key = account_key(target_name);
        if target_key == *actor_key {
            return Err(ClanError::CannotTargetSelf);
        }
        if self.realm.find_account(target_name).is_none() {
            return Err(ClanError::TargetNotFound);
        }
        let target = clan
            .member(&target_key)
            .ok_or_else(|| ClanError::NotAMember(target_name.to_string()))?;

        if target.role == new_role {
            return Err(ClanError::AlreadyRole {
                target: target_name.to_string(),
                role: new_role,
            });
        }
        if target.role == ClanRole::Chieftain {
            return Err(ClanError::RankProtected(ClanRole::Chieftain));
        }
        if actor_role == ClanRole::Shaman
            && (new_role > ClanRole::Grunt || target.role >= ClanRole::Shaman)
        {
            return Err(ClanError::PermissionDenied);
        }

        let multi_chieftain = new_role == ClanRole::Chieftain
            && clan
                .roster
                .values()
                .any(|m| m.full_member && m.role == ClanRole::Chieftain);

        if let Some(member) = clan.roster.get_mut(&target_key) {
            member.role = new_role;
        }
        self.realm.storage.save_clan(&clan);
        info!(clan = %clan.tag, target = %target_key, role = ?new_role, "role changed");

        Ok(SetRoleOutcome {
            target_name: target_name.to_string(),
            role: new_role,
            multi_chieftain,
        })
    }

    /// `disband(actor)`: Chieftain only. Removes the clan and every
    /// roster relation atomically; the handler owns the confirmation
    /// step.
    pub async fn disband(&self, actor_key: &AccountKey) -> Result<String, ClanError> {
        let (clan_arc, tag) = self.clan_of(actor_key).await?;
        let mut clan = clan_arc.write().await;
        self.require_rank(&clan, actor_key, ClanRole::Chieftain)?;

        let members: Vec<AccountKey> = clan.roster.keys().cloned().collect();
        clan.roster.clear();
        let name = clan.name.clone();
        let was_created = clan.created;
        // Unregister before releasing the write lock so no transition
        // can slip in against a dissolved clan.
        self.realm.remove_clan(&tag);
        drop(clan);

        for key in &members {
            self.clear_backref(key).await?;
        }
        if was_created {
            self.realm.storage.remove_clan(&tag);
        }
        info!(tag = %tag, members = members.len(), "clan disbanded");
        Ok(name)
    }

    /// `set_motd`: Shaman or better; pure attribute mutation.
    pub async fn set_motd(&self, actor_key: &AccountKey, motd: &str) -> Result<(), ClanError> {
        let (clan_arc, _tag) = self.clan_of(actor_key).await?;
        let mut clan = clan_arc.write().await;
        self.require_rank(&clan, actor_key, ClanRole::Shaman)?;
        clan.motd = motd.to_string();
        self.realm.storage.save_clan(&clan);
        Ok(())
    }

    /// `set_channel`: Shaman or better; pure attribute mutation.
    pub async fn set_channel(
        &self,
        actor_key: &AccountKey,
        channel: &str,
    ) -> Result<(), ClanError> {
        let (clan_arc, _tag) = self.clan_of(actor_key).await?;
        let mut clan = clan_arc.write().await;
        self.require_rank(&clan, actor_key, ClanRole::Shaman)?;
        clan.channel = channel.to_string();
        self.realm.storage.save_clan(&clan);
        Ok(())
    }

    /// Roster snapshot for `/clan list`: full members ordered by rank
    /// (highest first), then name, with presence attached.
    pub async fn roster(&self, key: &AccountKey) -> Result<Vec<MemberView>, ClanError> {
        let (clan_arc, _tag) = self.clan_of(key).await?;
        let clan = clan_arc.read().await;
        if clan.member(key).is_none() {
            return Err(ClanError::NotInClan);
        }

        let mut rows: Vec<(AccountKey, ClanRole)> = clan
            .roster
            .iter()
            .filter(|(_, m)| m.full_member)
            .map(|(k, m)| (k.clone(), m.role))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        drop(clan);

        let mut views = Vec::with_capacity(rows.len());
        for (position, (member_key, role)) in rows.into_iter().enumerate() {
            let name = match self.realm.find_account(&member_key) {
                Some(arc) => arc.read().await.name.clone(),
                None => member_key.clone(),
            };
            views.push(MemberView {
                position: position + 1,
                name,
                role,
                presence: self.realm.presence.locate(&member_key),
            });
        }
        Ok(views)
    }

    /// Whisper `text` to every online full member except the sender.
    /// Returns the delivery count.
    pub async fn broadcast(
        &self,
        sender_key: &AccountKey,
        sender_name: &str,
        text: &str,
    ) -> Result<usize, ClanError> {
        let (clan_arc, _tag) = self.clan_of(sender_key).await?;
        let clan = clan_arc.read().await;
        if clan.member(sender_key).is_none_or(|m| !m.full_member) {
            return Err(ClanError::NotInClan);
        }

        let mut delivered = 0;
        for key in clan.full_member_keys() {
            if key == sender_key || !self.realm.presence.is_online(key) {
                continue;
            }
            self.realm.messenger.whisper(sender_name, key, text);
            delivered += 1;
        }
        Ok(delivered)
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    fn account(
        &self,
        key: &AccountKey,
    ) -> Result<std::sync::Arc<tokio::sync::RwLock<Account>>, ClanError> {
        self.realm
            .find_account(key)
            .ok_or_else(|| ClanError::Internal(format!("account {key} missing from registry")))
    }

    async fn clan_tag_of(&self, key: &AccountKey) -> Option<String> {
        let account_arc = self.realm.find_account(key)?;
        let account = account_arc.read().await;
        account.clan.clone()
    }

    /// Resolve the caller's clan handle. The tag is read under a short
    /// account lock which is released before the clan lock is taken
    /// (lock order: clan before account).
    async fn clan_of(
        &self,
        key: &AccountKey,
    ) -> Result<(std::sync::Arc<tokio::sync::RwLock<Clan>>, String), ClanError> {
        let tag = self.clan_tag_of(key).await.ok_or(ClanError::NotInClan)?;
        let clan_arc = self
            .realm
            .find_clan(&tag)
            .ok_or_else(|| ClanError::Internal(format!("clan {tag} missing for member {key}")))?;
        Ok((clan_arc, tag))
    }

    /// Like `clan_of`, but the absence of a relation means "no pending
    /// invitation" rather than "not in a clan".
    async fn clan_of_pending(
        &self,
        key: &AccountKey,
    ) -> Result<(std::sync::Arc<tokio::sync::RwLock<Clan>>, String), ClanError> {
        let tag = self.clan_tag_of(key).await.ok_or(ClanError::NoPending)?;
        let clan_arc = self
            .realm
            .find_clan(&tag)
            .ok_or_else(|| ClanError::Internal(format!("clan {tag} missing for invitee {key}")))?;
        Ok((clan_arc, tag))
    }

    /// Require the actor to be a full member at `minimum` rank or
    /// better; returns the actor's role.
    fn require_rank(
        &self,
        clan: &Clan,
        actor_key: &AccountKey,
        minimum: ClanRole,
    ) -> Result<ClanRole, ClanError> {
        let member = clan.member(actor_key).ok_or(ClanError::NotInClan)?;
        if !member.full_member {
            return Err(ClanError::NotInClan);
        }
        if member.role < minimum {
            return Err(ClanError::PermissionDenied);
        }
        Ok(member.role)
    }

    async fn clear_backref(&self, key: &AccountKey) -> Result<(), ClanError> {
        let account_arc = self.account(key)?;
        let mut account = account_arc.write().await;
        account.clan = None;
        self.realm.storage.save_account(&account);
        Ok(())
    }
}
