//! `/whisper`: a private message to one online account.

use async_trait::async_trait;

use crate::collab::NoticeKind;
use crate::command::{ArgScanner, MAX_MESSAGE_LEN, MAX_USERNAME_LEN};
use crate::error::{CommandError, HandlerResult};
use crate::state::account_key;
use super::{Context, Handler};

const USAGE: &str = "Usage: /whisper [username] [message] (whispers a private message)";

pub struct WhisperHandler;

#[async_trait]
impl Handler for WhisperHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        let Some(target) = args.token(MAX_USERNAME_LEN) else {
            return Err(CommandError::Usage(USAGE));
        };
        let Some(text) = args.rest(MAX_MESSAGE_LEN) else {
            return Err(CommandError::Usage(USAGE));
        };
        let target_key = account_key(&target);
        if target_key == *ctx.session {
            return Err(CommandError::SelfReference);
        }
        let Some(target_arc) = ctx.realm.find_account(&target) else {
            return Err(CommandError::NotFound);
        };
        let display = target_arc.read().await.name.clone();
        if !ctx.realm.presence.is_online(&target_key) {
            ctx.reply_error(&format!("{display} is not logged on."));
            return Ok(());
        }

        let sender_name = ctx.session_account()?.read().await.name.clone();
        ctx.realm.messenger.whisper(&sender_name, &target_key, &text);
        ctx.realm.messenger.notify(
            ctx.session,
            NoticeKind::WhisperAck,
            &format!("You whispered to {display}: {text}"),
        );
        Ok(())
    }
}
