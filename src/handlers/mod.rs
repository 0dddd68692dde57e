//! Command handlers.
//!
//! Each handler owns one slash-command family. Handlers parse
//! arguments with [`ArgScanner`], call the state managers, and format
//! outcomes through the session's [`Messenger`]. Authorization has
//! already happened by the time a handler runs.

pub mod admin;
pub mod clan;
pub mod commandgroups;
pub mod friends;
pub mod messaging;
pub mod registry;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::command::ArgScanner;
use crate::collab::NoticeKind;
use crate::error::{CommandError, HandlerResult};
use crate::state::managers::{ClanError, ClanManager, FriendsError, FriendsManager};
use crate::state::{Account, AccountKey, Realm};

pub use registry::Registry;

/// Per-invocation handler context: the invoking session's account key
/// plus the shared realm.
pub struct Context<'a> {
    pub session: &'a AccountKey,
    pub realm: &'a Arc<Realm>,
}

impl Context<'_> {
    pub fn reply_info(&self, text: &str) {
        self.realm.messenger.notify(self.session, NoticeKind::Info, text);
    }

    pub fn reply_error(&self, text: &str) {
        self.realm.messenger.notify(self.session, NoticeKind::Error, text);
    }

    /// The invoking session's account. Its absence from the registry is
    /// a broken invariant, not a user error.
    pub fn session_account(&self) -> Result<Arc<RwLock<Account>>, CommandError> {
        self.realm.find_account(self.session).ok_or_else(|| {
            CommandError::Internal(format!("session account {} not registered", self.session))
        })
    }

    pub fn clans(&self) -> ClanManager<'_> {
        ClanManager::new(self.realm)
    }

    pub fn friends(&self) -> FriendsManager<'_> {
        FriendsManager::new(self.realm)
    }
}

/// One slash-command family.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult;
}

/// Render a clan transition failure to the session. Internal failures
/// propagate; everything else is user feedback and the command ends
/// normally.
pub(crate) fn report_clan_error(ctx: &Context<'_>, err: ClanError) -> HandlerResult {
    match err {
        ClanError::Internal(msg) => Err(CommandError::Internal(msg)),
        other => {
            ctx.reply_error(&other.to_string());
            Ok(())
        }
    }
}

/// Friends-list counterpart of [`report_clan_error`].
pub(crate) fn report_friends_error(ctx: &Context<'_>, err: FriendsError) -> HandlerResult {
    match err {
        FriendsError::Internal(msg) => Err(CommandError::Internal(msg)),
        other => {
            ctx.reply_error(&other.to_string());
            Ok(())
        }
    }
}
