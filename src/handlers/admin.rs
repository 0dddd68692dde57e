//! Staff commands: authority flag grants and account restrictions.

use async_trait::async_trait;

use crate::collab::NoticeKind;
use crate::command::{ArgScanner, MAX_USERNAME_LEN};
use crate::error::{CommandError, HandlerResult};
use crate::state::FlagScope;
use super::{Context, Handler};

const USAGE_ADMIN: &str = "\
Usage: /admin +[username] (grants admin authority)
Usage: /admin -[username] (revokes admin authority)";

const USAGE_OPERATOR: &str = "\
Usage: /operator +[username] (grants operator authority)
Usage: /operator -[username] (revokes operator authority)";

/// Which authority flag a [`ToggleHandler`] mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagTarget {
    Admin,
    Operator,
}

/// `/admin` and `/operator`: grant or revoke a global authority flag
/// with a `+name`/`-name` argument.
pub struct ToggleHandler {
    target: FlagTarget,
}

impl ToggleHandler {
    pub fn new(target: FlagTarget) -> Self {
        Self { target }
    }

    fn usage(&self) -> &'static str {
        match self.target {
            FlagTarget::Admin => USAGE_ADMIN,
            FlagTarget::Operator => USAGE_OPERATOR,
        }
    }

    fn label(&self) -> &'static str {
        match self.target {
            FlagTarget::Admin => "admin",
            FlagTarget::Operator => "operator",
        }
    }
}

#[async_trait]
impl Handler for ToggleHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        // +1 leaves room for the sign in front of a full-length name.
        let Some(arg) = args.token(MAX_USERNAME_LEN + 1) else {
            return Err(CommandError::Usage(self.usage()));
        };
        let (grant, name) = match arg.split_at_checked(1) {
            Some(("+", name)) if !name.is_empty() => (true, name),
            Some(("-", name)) if !name.is_empty() => (false, name),
            _ => return Err(CommandError::Usage(self.usage())),
        };

        let Some(target_arc) = ctx.realm.find_account(name) else {
            return Err(CommandError::NotFound);
        };
        let mut target = target_arc.write().await;
        let flag = match self.target {
            FlagTarget::Admin => &mut target.auth.admin,
            FlagTarget::Operator => &mut target.auth.operator,
        };
        *flag = if grant { FlagScope::Global } else { FlagScope::Off };
        let display = target.name.clone();
        let key = target.key();
        ctx.realm.storage.save_account(&target);
        drop(target);

        let verb = if grant { "granted" } else { "revoked" };
        ctx.reply_info(&format!("{} authority {} for {}.", self.label(), verb, display));
        if ctx.realm.presence.is_online(&key) {
            let text = if grant {
                format!("You have been granted {} authority.", self.label())
            } else {
                format!("Your {} authority has been revoked.", self.label())
            };
            ctx.realm.messenger.notify(&key, NoticeKind::Info, &text);
        }
        Ok(())
    }
}

/// Which restriction an [`AdminHandler`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restriction {
    Lock,
    Mute,
}

/// `/lockacct`, `/unlockacct`, `/muteacct`, `/unmuteacct`.
pub struct AdminHandler {
    restriction: Restriction,
    engage: bool,
}

impl AdminHandler {
    pub fn lock() -> Self {
        Self { restriction: Restriction::Lock, engage: true }
    }

    pub fn unlock() -> Self {
        Self { restriction: Restriction::Lock, engage: false }
    }

    pub fn mute() -> Self {
        Self { restriction: Restriction::Mute, engage: true }
    }

    pub fn unmute() -> Self {
        Self { restriction: Restriction::Mute, engage: false }
    }

    fn usage(&self) -> &'static str {
        match (self.restriction, self.engage) {
            (Restriction::Lock, true) => "Usage: /lockacct [username] (locks the account)",
            (Restriction::Lock, false) => "Usage: /unlockacct [username] (unlocks the account)",
            (Restriction::Mute, true) => "Usage: /muteacct [username] (mutes the account)",
            (Restriction::Mute, false) => "Usage: /unmuteacct [username] (unmutes the account)",
        }
    }
}

#[async_trait]
impl Handler for AdminHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        let Some(name) = args.token(MAX_USERNAME_LEN) else {
            return Err(CommandError::Usage(self.usage()));
        };
        let Some(target_arc) = ctx.realm.find_account(&name) else {
            return Err(CommandError::NotFound);
        };
        let mut target = target_arc.write().await;
        let flag = match self.restriction {
            Restriction::Lock => &mut target.auth.lock,
            Restriction::Mute => &mut target.auth.mute,
        };
        *flag = if self.engage { FlagScope::Global } else { FlagScope::Off };
        let display = target.name.clone();
        let key = target.key();
        ctx.realm.storage.save_account(&target);
        drop(target);

        let state = match (self.restriction, self.engage) {
            (Restriction::Lock, true) => "locked",
            (Restriction::Lock, false) => "unlocked",
            (Restriction::Mute, true) => "muted",
            (Restriction::Mute, false) => "unmuted",
        };
        ctx.reply_info(&format!("Account {display} has been {state}."));
        if self.engage && ctx.realm.presence.is_online(&key) {
            ctx.realm.messenger.notify(
                &key,
                NoticeKind::Error,
                &format!("Your account has been {state}."),
            );
        }
        Ok(())
    }
}
