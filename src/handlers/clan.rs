//! `/clan` command family.
//!
//! The available subcommands depend on the session's membership state:
//! full members manage and talk to their clan, invited accounts handle
//! their pending invitation, and everyone else may found a new clan.

use async_trait::async_trait;

use crate::collab::{Location, NoticeKind};
use crate::command::{
    ArgScanner, MAX_CHANNELNAME_LEN, MAX_CLANNAME_LEN, MAX_CLANTAG_LEN, MAX_MESSAGE_LEN,
    MAX_USERNAME_LEN,
};
use crate::error::{CommandError, HandlerResult};
use crate::state::{ClanRole, account_key};
use crate::state::managers::{CreateOutcome, Membership};
use super::{Context, Handler, report_clan_error};

const USAGE_MEMBER: &str = "\
Usage: /clan msg [message] (whispers a message to all online clan members)
Usage: /clan list (lists all clan members)
Usage: /clan motd [message] (sets the clan's message of the day; Shaman+)
Usage: /clan channel [name] (sets the clan channel; Shaman+)
Usage: /clan invite [username] (invites a player to the clan; Shaman+)
Usage: /clan kick [username] (kicks a lower-ranked member; Shaman+)
Usage: /clan chieftain|shaman|grunt|peon [username] (sets a member's rank)
Usage: /clan out yes (leaves the clan)
Usage: /clan disband yes (disbands the clan; Chieftain only)";

const USAGE_INVITED: &str = "\
Usage: /clan invite get (shows the pending invitation)
Usage: /clan invite accept (accepts the pending invitation)
Usage: /clan invite decline (declines the pending invitation)";

const USAGE_OUTSIDER: &str = "\
Usage: /clan create [clantag] [clanname] (founds a new clan)";

pub struct ClanHandler;

#[async_trait]
impl Handler for ClanHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        match ctx.clans().membership(ctx.session).await {
            Membership::Full { role } => handle_member(ctx, args, role).await,
            Membership::Invited { .. } => handle_invited(ctx, args).await,
            Membership::None => handle_outsider(ctx, args).await,
        }
    }
}

async fn handle_member(
    ctx: &Context<'_>,
    args: &mut ArgScanner<'_>,
    _role: ClanRole,
) -> HandlerResult {
    let Some(sub) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    if let Some(role) = ClanRole::from_subcommand(&sub) {
        return set_role(ctx, args, role).await;
    }
    match sub.as_str() {
        "msg" | "m" | "w" | "whisper" => broadcast(ctx, args).await,
        "list" | "l" => roster(ctx).await,
        "motd" => set_motd(ctx, args).await,
        "channel" => set_channel(ctx, args).await,
        "invite" | "inv" => invite(ctx, args).await,
        "kick" | "k" => kick(ctx, args).await,
        "out" | "o" => leave(ctx, args).await,
        "disband" => disband(ctx, args).await,
        // A member's second create is a state conflict, not bad usage.
        "create" | "cre" => {
            ctx.reply_error("You are already in a clan!");
            Ok(())
        }
        _ => Err(CommandError::Usage(USAGE_MEMBER)),
    }
}

async fn broadcast(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(text) = args.rest(MAX_MESSAGE_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    let sender_name = ctx.session_account()?.read().await.name.clone();
    match ctx.clans().broadcast(ctx.session, &sender_name, &text).await {
        Ok(0) => {
            ctx.reply_info("No other clan members are online.");
            Ok(())
        }
        Ok(_) => {
            ctx.reply_info("Message sent to your clan.");
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn roster(ctx: &Context<'_>) -> HandlerResult {
    let views = match ctx.clans().roster(ctx.session).await {
        Ok(views) => views,
        Err(err) => return report_clan_error(ctx, err),
    };
    ctx.reply_info("Your clan members are:");
    for view in views {
        ctx.reply_info(&format!(
            "{}: {} ({}), {}",
            view.position,
            view.name,
            view.role.display_name(),
            describe_presence(&view.presence.location, &view.presence.location_name),
        ));
    }
    Ok(())
}

async fn set_motd(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(motd) = args.rest(MAX_MESSAGE_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    match ctx.clans().set_motd(ctx.session, &motd).await {
        Ok(()) => {
            ctx.reply_info("Clan message of the day updated.");
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn set_channel(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(channel) = args.rest(MAX_CHANNELNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    match ctx.clans().set_channel(ctx.session, &channel).await {
        Ok(()) => {
            ctx.reply_info(&format!("Clan channel set to {channel}."));
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn invite(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    let inviter_name = ctx.session_account()?.read().await.name.clone();
    match ctx.clans().invite(ctx.session, &target).await {
        Ok(outcome) => {
            ctx.reply_info(&format!("Invitation sent to {}.", outcome.invitee_name));
            let invitee_key = account_key(&outcome.invitee_name);
            ctx.realm.messenger.notify(
                &invitee_key,
                NoticeKind::Info,
                &format!(
                    "{} invites you to join clan {}. Type /clan invite accept or /clan invite decline.",
                    inviter_name, outcome.clan_name
                ),
            );
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn kick(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    match ctx.clans().kick(ctx.session, &target).await {
        Ok(_) => {
            ctx.reply_info(&format!("Kicked {target} from the clan."));
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn set_role(ctx: &Context<'_>, args: &mut ArgScanner<'_>, role: ClanRole) -> HandlerResult {
    let Some(target) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_MEMBER));
    };
    match ctx.clans().set_role(ctx.session, &target, role).await {
        Ok(outcome) => {
            ctx.reply_info(&format!(
                "{} is now a {}.",
                outcome.target_name,
                outcome.role.display_name()
            ));
            if outcome.multi_chieftain {
                ctx.reply_info("Warning: your clan now has more than one Chieftain.");
            }
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

/// `/clan out` warns; only `/clan out yes` commits.
async fn leave(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    if args.token(MAX_USERNAME_LEN).as_deref() != Some("yes") {
        ctx.reply_info("This will remove you from your clan.");
        ctx.reply_info("Type /clan out yes to confirm.");
        return Ok(());
    }
    match ctx.clans().leave(ctx.session).await {
        Ok(()) => {
            ctx.reply_info("You have left your clan.");
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

/// `/clan disband` warns; only `/clan disband yes` commits.
async fn disband(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    if args.token(MAX_USERNAME_LEN).as_deref() != Some("yes") {
        ctx.reply_info("This will permanently disband your clan.");
        ctx.reply_info("Type /clan disband yes to confirm.");
        return Ok(());
    }
    match ctx.clans().disband(ctx.session).await {
        Ok(name) => {
            ctx.reply_info(&format!("Clan {name} has been disbanded."));
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

async fn handle_invited(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let sub = args.token(MAX_USERNAME_LEN);
    if sub.as_deref() != Some("invite") && sub.as_deref() != Some("inv") {
        return Err(CommandError::Usage(USAGE_INVITED));
    }
    let Some(action) = args.token(MAX_USERNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_INVITED));
    };
    match action.as_str() {
        "get" => match ctx.clans().invitation(ctx.session).await {
            Ok(clan_name) => {
                ctx.reply_info(&format!("You have been invited to join clan {clan_name}."));
                Ok(())
            }
            Err(err) => report_clan_error(ctx, err),
        },
        "accept" | "acc" => match ctx.clans().accept(ctx.session).await {
            Ok(outcome) => {
                ctx.reply_info(&format!("Welcome to clan {}!", outcome.clan_name));
                Ok(())
            }
            Err(err) => report_clan_error(ctx, err),
        },
        "decline" | "dec" => match ctx.clans().decline(ctx.session).await {
            Ok(clan_name) => {
                ctx.reply_info(&format!("You declined the invitation to clan {clan_name}."));
                Ok(())
            }
            Err(err) => report_clan_error(ctx, err),
        },
        _ => Err(CommandError::Usage(USAGE_INVITED)),
    }
}

async fn handle_outsider(ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
    let sub = args.token(MAX_USERNAME_LEN);
    if sub.as_deref() != Some("create") && sub.as_deref() != Some("cre") {
        return Err(CommandError::Usage(USAGE_OUTSIDER));
    }
    // Tags are identifiers: an oversized tag is rejected, never
    // truncated into a different identifier.
    let Some(tag) = args.token_exact(MAX_CLANTAG_LEN)? else {
        return Err(CommandError::Usage(USAGE_OUTSIDER));
    };
    let Some(name) = args.rest(MAX_CLANNAME_LEN) else {
        return Err(CommandError::Usage(USAGE_OUTSIDER));
    };
    match ctx.clans().create(ctx.session, &tag, &name).await {
        Ok(CreateOutcome::Created { clan_name }) => {
            ctx.reply_info(&format!("Clan {clan_name} has been created!"));
            Ok(())
        }
        Ok(CreateOutcome::Pending {
            clan_name,
            min_invites,
        }) => {
            ctx.reply_info(&format!(
                "Clan {clan_name} is pending: it goes live once {min_invites} invitations are accepted."
            ));
            Ok(())
        }
        Err(err) => report_clan_error(ctx, err),
    }
}

/// Human-readable presence fragment shared by clan and friends
/// listings.
pub(crate) fn describe_presence(location: &Location, location_name: &str) -> String {
    match location {
        Location::Offline => "offline".to_string(),
        Location::Online => "online".to_string(),
        Location::Channel => format!("in channel {location_name}"),
        Location::PublicGame => format!("in game {location_name}"),
        Location::PrivateGame => "in a private game".to_string(),
    }
}
