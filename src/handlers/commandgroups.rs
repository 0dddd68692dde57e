//! `/commandgroups`: inspect and edit an account's group bitmask.
//!
//! Group arguments are runs of the digits 1..8; digit n toggles bit
//! n-1. The listing renders the mask in the conventional eight-column
//! layout.

use async_trait::async_trait;

use crate::command::{ArgScanner, MAX_USERNAME_LEN, parse_group_mask, render_group_mask};
use crate::error::{CommandError, HandlerResult};
use super::{Context, Handler};

const USAGE: &str = "\
Usage: /cg list [username] (shows the account's command groups)
Usage: /cg add [username] [groups] (adds the account to the groups)
Usage: /cg del [username] [groups] (removes the account from the groups)";

pub struct CommandGroupsHandler;

#[async_trait]
impl Handler for CommandGroupsHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &mut ArgScanner<'_>) -> HandlerResult {
        let Some(sub) = args.token(MAX_USERNAME_LEN) else {
            return Err(CommandError::Usage(USAGE));
        };
        let Some(name) = args.token(MAX_USERNAME_LEN) else {
            return Err(CommandError::Usage(USAGE));
        };
        let Some(target_arc) = ctx.realm.find_account(&name) else {
            return Err(CommandError::NotFound);
        };

        match sub.as_str() {
            "list" | "l" => {
                let target = target_arc.read().await;
                ctx.reply_info(&format!(
                    "{}'s command groups: {}",
                    target.name,
                    render_group_mask(target.groups)
                ));
                Ok(())
            }
            "add" | "a" | "del" | "d" => {
                let Some(digits) = args.token(MAX_USERNAME_LEN) else {
                    return Err(CommandError::Usage(USAGE));
                };
                let mask = parse_group_mask(&digits)?;
                let mut target = target_arc.write().await;
                if matches!(sub.as_str(), "add" | "a") {
                    target.groups |= mask;
                } else {
                    target.groups &= !mask;
                }
                let display = target.name.clone();
                let groups = target.groups;
                ctx.realm.storage.save_account(&target);
                drop(target);
                ctx.reply_info(&format!(
                    "{}'s command groups: {}",
                    display,
                    render_group_mask(groups)
                ));
                Ok(())
            }
            _ => Err(CommandError::Usage(USAGE)),
        }
    }
}
