//! `/friends` command family.
//!
//! Besides the text replies, the mutating subcommands hand a logical
//! ack payload to the wire layer so a game client can keep its local
//! friends panel in sync. Positions in acks and listings are 1-based.

use async_trait::async_trait;

use crate::collab::{FRIEND_FLAG_AWAY, FRIEND_FLAG_DND, FRIEND_FLAG_MUTUAL, WireAck};
use crate::command::{ArgScanner, MAX_MESSAGE_LEN, MAX_USERNAME_LEN};
use crate::error::{CommandError, HandlerResult};
use crate::state::managers::MoveOutcome;
use super::clan::describe_presence;
use super::{Context, Handler, report_friends_error};

const USAGE: &str = "\
Usage: /f add [username] (adds a friend to your list)
Usage: /f remove [username] (removes a friend from your list)
Usage: /f promote [username] (moves a friend up your list)
Usage: /f demote [username] (moves a friend down your list)
Usage: /f list (lists your friends; * marks mutual friends)
Usage: /f msg [message] (whispers a message to your online mutual friends)";

pub struct FriendsHandler;

#[async_trait]
impl Handler for FriendsHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        let Some(sub) = args.token(MAX_USERNAME_LEN) else {
            return Err(CommandError::Usage(USAGE));
        };
        match sub.as_str() {
            "add" | "a" => add(ctx, args).await,
            "remove" | "r" | "del" | "delete" => remove(ctx, args).await,
            "promote" | "p" => shift(ctx, args, true).await,
            "demote" | "d" => shift(ctx, args, false).await,
            "list" | "l" => list(ctx).await,
            "msg" | "m" | "w" | "whisper" => message(ctx, args).await,
            _ => Err(CommandError::Usage(USAGE)),
        }
    }
}

async fn add(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE));
    };
    match ctx.friends().add(ctx.session, &target).await {
        Ok(added) => {
            ctx.reply_info(&format!("Added {} to your friends list.", added.target_name));
            let presence = ctx.realm.presence.locate(&added.target_key);
            let mut flags = 0;
            if added.mutual {
                flags |= FRIEND_FLAG_MUTUAL;
            }
            if presence.dnd {
                flags |= FRIEND_FLAG_DND;
            }
            if presence.away {
                flags |= FRIEND_FLAG_AWAY;
            }
            ctx.realm.messenger.ack(
                ctx.session,
                WireAck::FriendAdd {
                    target_name: added.target_name,
                    location: presence.location,
                    status_flags: flags,
                    clienttag: presence.clienttag,
                    location_name: presence.location_name,
                },
            );
            Ok(())
        }
        Err(err) => report_friends_error(ctx, err),
    }
}

async fn remove(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE));
    };
    match ctx.friends().remove(ctx.session, &target).await {
        Ok(position) => {
            ctx.reply_info(&format!("Removed {target} from your friends list."));
            ctx.realm.messenger.ack(
                ctx.session,
                WireAck::FriendRemove {
                    removed_position: (position + 1) as u8,
                },
            );
            Ok(())
        }
        Err(err) => report_friends_error(ctx, err),
    }
}

async fn shift(ctx: &Context<'_>, args: &mut ArgScanner<'_>, up: bool) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE));
    };
    let friends = ctx.friends();
    let outcome = if up {
        friends.promote(ctx.session, &target).await
    } else {
        friends.demote(ctx.session, &target).await
    };
    match outcome {
        Ok(MoveOutcome::Swapped { upper, lower }) => {
            let verb = if up { "Promoted" } else { "Demoted" };
            ctx.reply_info(&format!("{verb} {target} in your friends list."));
            // position_a is where the entry was, position_b where it is
            // now, both 1-based.
            let (from, to) = if up {
                (lower + 1, upper + 1)
            } else {
                (upper + 1, lower + 1)
            };
            ctx.realm.messenger.ack(
                ctx.session,
                WireAck::FriendMove {
                    position_a: from as u8,
                    position_b: to as u8,
                },
            );
            Ok(())
        }
        Ok(MoveOutcome::AlreadyTop) => {
            ctx.reply_info(&format!("{target} is already at the top of your list."));
            Ok(())
        }
        Ok(MoveOutcome::AlreadyBottom) => {
            ctx.reply_info(&format!("{target} is already at the bottom of your list."));
            Ok(())
        }
        Err(err) => report_friends_error(ctx, err),
    }
}

async fn list(ctx: &Context<'_>) -> HandlerResult {
    let views = match ctx.friends().list(ctx.session).await {
        Ok(views) => views,
        Err(err) => return report_friends_error(ctx, err),
    };
    if views.is_empty() {
        ctx.reply_info("Your friends list is empty.");
        return Ok(());
    }
    ctx.reply_info("Your friends are:");
    for view in views {
        let mark = if view.mutual { "*" } else { "" };
        ctx.reply_info(&format!(
            "{}: {}{}, {}",
            view.position,
            mark,
            view.name,
            describe_presence(&view.presence.location, &view.presence.location_name),
        ));
    }
    Ok(())
}

async fn message(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(text) = args.rest(MAX_MESSAGE_LEN) else {
        return Err(CommandError::Usage(USAGE));
    };
    let recipients = match ctx.friends().mutual_online(ctx.session).await {
        Ok(keys) => keys,
        Err(err) => return report_friends_error(ctx, err),
    };
    if recipients.is_empty() {
        ctx.reply_info("None of your mutual friends are logged on.");
        return Ok(());
    }
    let sender_name = ctx.session_account()?.read().await.name.clone();
    for key in &recipients {
        ctx.realm.messenger.whisper(&sender_name, key, &text);
    }
    ctx.reply_info("Message sent to your friends.");
    Ok(())
}
