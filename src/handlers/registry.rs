//! Command table and dispatcher.
//!
//! Resolution is longest-prefix on the leading token, case sensitive:
//! the table entry (name or alias) that is the longest prefix of the
//! typed keyword wins, so `/f` resolves the friends family while
//! `/friends` and even a sloppy `/friendss` land on the same handler.
//! Resolution order never depends on table order.
//!
//! The authorization gate runs before any argument is parsed. A
//! forbidden command reports only "reserved"; an unmapped group
//! reports only "deactivated".

use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span};

use crate::command::{Authorization, CommandGroups, split_keyword};
use crate::config::Config;
use crate::error::CommandError;
use crate::state::{AccountKey, Realm};

use super::admin::{AdminHandler, FlagTarget, ToggleHandler};
use super::clan::ClanHandler;
use super::commandgroups::CommandGroupsHandler;
use super::friends::FriendsHandler;
use super::messaging::WhisperHandler;
use super::{Context, Handler};

/// One table row: a command family, its aliases, and the permission
/// group gating it.
pub struct CommandDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub group: &'static str,
    handler: Box<dyn Handler>,
}

impl CommandDescriptor {
    fn patterns(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

/// The command table plus the live authorization gate.
pub struct Registry {
    commands: Vec<CommandDescriptor>,
    groups: CommandGroups,
}

impl Registry {
    /// The standard command surface.
    pub fn standard(config: &Config) -> Self {
        let commands = vec![
            CommandDescriptor {
                name: "/clan",
                aliases: &["/c"],
                group: "everyone",
                handler: Box::new(ClanHandler),
            },
            CommandDescriptor {
                name: "/friends",
                aliases: &["/f"],
                group: "everyone",
                handler: Box::new(FriendsHandler),
            },
            CommandDescriptor {
                name: "/whisper",
                aliases: &["/msg", "/w", "/m"],
                group: "everyone",
                handler: Box::new(WhisperHandler),
            },
            CommandDescriptor {
                name: "/admin",
                aliases: &[],
                group: "staff",
                handler: Box::new(ToggleHandler::new(FlagTarget::Admin)),
            },
            CommandDescriptor {
                name: "/operator",
                aliases: &[],
                group: "staff",
                handler: Box::new(ToggleHandler::new(FlagTarget::Operator)),
            },
            CommandDescriptor {
                name: "/lockacct",
                aliases: &[],
                group: "staff",
                handler: Box::new(AdminHandler::lock()),
            },
            CommandDescriptor {
                name: "/unlockacct",
                aliases: &[],
                group: "staff",
                handler: Box::new(AdminHandler::unlock()),
            },
            CommandDescriptor {
                name: "/muteacct",
                aliases: &[],
                group: "staff",
                handler: Box::new(AdminHandler::mute()),
            },
            CommandDescriptor {
                name: "/unmuteacct",
                aliases: &[],
                group: "staff",
                handler: Box::new(AdminHandler::unmute()),
            },
            CommandDescriptor {
                name: "/commandgroups",
                aliases: &["/cg"],
                group: "staff",
                handler: Box::new(CommandGroupsHandler),
            },
        ];
        Self {
            commands,
            groups: config.command_groups(),
        }
    }

    /// Resolve a typed keyword to its command, longest prefix wins.
    pub fn resolve(&self, keyword: &str) -> Option<&CommandDescriptor> {
        let mut best: Option<(&CommandDescriptor, usize)> = None;
        for command in &self.commands {
            for pattern in command.patterns() {
                if keyword.starts_with(pattern)
                    && best.is_none_or(|(_, len)| pattern.len() > len)
                {
                    best = Some((command, pattern.len()));
                }
            }
        }
        best.map(|(command, _)| command)
    }

    /// Run one command line for `session`: alias hook, resolution,
    /// authorization, then the handler. All outcomes are rendered to
    /// the session here; errors never tear the session down.
    pub async fn dispatch(&self, realm: &Arc<Realm>, session: &AccountKey, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        // `//`-prefixed lines go to the secondary resolver first, when
        // one is enabled.
        if line.starts_with("//")
            && realm.config.limits.extra_commands
            && realm.aliases.resolve(session, line)
        {
            return;
        }

        let ctx = Context { session, realm };
        let (keyword, mut args) = split_keyword(line);
        let Some(command) = self.resolve(keyword) else {
            debug!(keyword, %session, "unknown command");
            ctx.reply_error("Unknown command.");
            return;
        };

        let account_mask = match ctx.session_account() {
            Ok(account_arc) => account_arc.read().await.groups,
            Err(err) => {
                error!(%session, %err, "session account lookup failed");
                ctx.reply_error("Server error.");
                return;
            }
        };
        match self.groups.authorize(command.group, account_mask) {
            Authorization::Allowed => {}
            Authorization::Deactivated => {
                debug!(command = command.name, %session, "deactivated command");
                render_error(&ctx, &CommandError::Deactivated);
                return;
            }
            Authorization::Forbidden => {
                debug!(command = command.name, %session, "forbidden command");
                render_error(&ctx, &CommandError::PermissionDenied);
                return;
            }
        }

        let span = info_span!("command", keyword = command.name, %session);
        if let Err(err) = command
            .handler
            .handle(&ctx, &mut args)
            .instrument(span)
            .await
        {
            render_error(&ctx, &err);
        }
    }
}

fn render_error(ctx: &Context<'_>, err: &CommandError) {
    match err.user_lines() {
        Some(lines) => {
            debug!(code = err.error_code(), "command rejected");
            for line in lines {
                ctx.reply_error(&line);
            }
        }
        None => {
            error!(code = err.error_code(), %err, "command failed internally");
            ctx.reply_error("Server error.");
        }
    }
}
