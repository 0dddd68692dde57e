//! Command-line tokenization and permission-group authorization.
//!
//! The scanner splits a raw `/command arg arg...` line into the leading
//! keyword and a lazy sequence of bounded arguments; the group gate
//! decides whether the invoking account may run the resolved command at
//! all. Both run before any handler code.

mod groups;
mod scan;

pub use groups::{Authorization, CommandGroups, parse_group_mask, render_group_mask};
pub use scan::{
    ArgScanner, MAX_CHANNELNAME_LEN, MAX_CLANNAME_LEN, MAX_CLANTAG_LEN, MAX_MESSAGE_LEN,
    MAX_USERNAME_LEN, split_keyword,
};
