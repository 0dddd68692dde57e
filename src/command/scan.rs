//! Command-line argument scanner.
//!
//! Splits a command line into whitespace-delimited arguments with a
//! caller-declared maximum length per field. Oversized fields are
//! truncated at a character boundary - truncation here is an explicit
//! part of the contract, never an unchecked copy. Fields where silent
//! truncation would corrupt meaning (the clan tag) go through
//! [`ArgScanner::token_exact`], which rejects instead.

use crate::error::CommandError;

/// Maximum length of an account name argument, in characters.
pub const MAX_USERNAME_LEN: usize = 16;
/// Maximum length of a free-text message, in characters.
pub const MAX_MESSAGE_LEN: usize = 255;
/// Maximum length of a clan tag. Tags are rejected, not truncated.
pub const MAX_CLANTAG_LEN: usize = 4;
/// Maximum length of a clan display name, in characters.
pub const MAX_CLANNAME_LEN: usize = 24;
/// Maximum length of a channel name, in characters.
pub const MAX_CHANNELNAME_LEN: usize = 64;

/// Split a raw line into the command keyword and a scanner over the
/// remaining argument text.
///
/// The keyword is everything up to the first space, case preserved.
pub fn split_keyword(line: &str) -> (&str, ArgScanner<'_>) {
    let line = line.trim_start();
    match line.split_once(' ') {
        Some((keyword, rest)) => (keyword, ArgScanner::new(rest)),
        None => (line, ArgScanner::new("")),
    }
}

/// Lazy, restartable scanner over the argument portion of a command
/// line.
///
/// Cloning the scanner snapshots its position, so a handler can probe a
/// subcommand and rewind by keeping the clone.
#[derive(Debug, Clone)]
pub struct ArgScanner<'a> {
    rest: &'a str,
}

impl<'a> ArgScanner<'a> {
    pub fn new(rest: &'a str) -> Self {
        Self {
            rest: rest.trim_start(),
        }
    }

    /// Whether any argument text remains.
    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Next whitespace-delimited token, truncated to at most `max`
    /// characters. Returns `None` when the line is exhausted.
    ///
    /// Truncation drops the token's tail past `max`; the scanner still
    /// advances over the whole token, so the dropped tail never bleeds
    /// into the next field.
    pub fn token(&mut self, max: usize) -> Option<String> {
        let raw = self.raw_token()?;
        Some(truncate_chars(raw, max))
    }

    /// Next token, rejected with `ArgumentTooLong` when it exceeds
    /// `max` characters.
    pub fn token_exact(&mut self, max: usize) -> Result<Option<String>, CommandError> {
        let Some(raw) = self.raw_token() else {
            return Ok(None);
        };
        if raw.chars().count() > max {
            return Err(CommandError::ArgumentTooLong);
        }
        Ok(Some(raw.to_string()))
    }

    /// Everything left on the line, internal spaces preserved,
    /// truncated to at most `max` characters. Returns `None` when
    /// nothing remains.
    pub fn rest(&mut self, max: usize) -> Option<String> {
        let remaining = std::mem::take(&mut self.rest).trim_end();
        if remaining.is_empty() {
            return None;
        }
        Some(truncate_chars(remaining, max))
    }

    fn raw_token(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (token, rest) = match self.rest.split_once(' ') {
            Some((token, rest)) => (token, rest.trim_start()),
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(token)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_args_split() {
        let (keyword, mut args) = split_keyword("/clan invite Thrall");
        assert_eq!(keyword, "/clan");
        assert_eq!(args.token(16).as_deref(), Some("invite"));
        assert_eq!(args.token(16).as_deref(), Some("Thrall"));
        assert_eq!(args.token(16), None);
    }

    #[test]
    fn keyword_only_line() {
        let (keyword, args) = split_keyword("/whoami");
        assert_eq!(keyword, "/whoami");
        assert!(args.is_empty());
    }

    #[test]
    fn multiple_spaces_between_args() {
        let (_, mut args) = split_keyword("/f   add    Jaina");
        assert_eq!(args.token(16).as_deref(), Some("add"));
        assert_eq!(args.token(16).as_deref(), Some("Jaina"));
    }

    #[test]
    fn oversized_token_truncates_at_boundary() {
        let mut args = ArgScanner::new("abcdefghijklmnopqrstuvwxyz next");
        assert_eq!(args.token(16).as_deref(), Some("abcdefghijklmnop"));
        // The dropped tail must not leak into the following field.
        assert_eq!(args.token(16).as_deref(), Some("next"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut args = ArgScanner::new("ééééé");
        assert_eq!(args.token(3).as_deref(), Some("ééé"));
    }

    #[test]
    fn exact_token_rejects_oversize() {
        let mut args = ArgScanner::new("TOOLONG");
        assert_eq!(
            args.token_exact(4),
            Err(CommandError::ArgumentTooLong)
        );
    }

    #[test]
    fn exact_token_accepts_at_limit() {
        let mut args = ArgScanner::new("WOLF Iron Wolves");
        assert_eq!(args.token_exact(4).unwrap().as_deref(), Some("WOLF"));
        assert_eq!(args.rest(24).as_deref(), Some("Iron Wolves"));
    }

    #[test]
    fn rest_preserves_internal_spaces() {
        let mut args = ArgScanner::new("hello   there  friends");
        assert_eq!(args.rest(255).as_deref(), Some("hello   there  friends"));
        assert_eq!(args.rest(255), None);
    }

    #[test]
    fn rest_truncates() {
        let mut args = ArgScanner::new("abcdef");
        assert_eq!(args.rest(4).as_deref(), Some("abcd"));
    }

    #[test]
    fn clone_rewinds() {
        let mut args = ArgScanner::new("sub argument");
        let rewind = args.clone();
        assert_eq!(args.token(16).as_deref(), Some("sub"));
        let mut args = rewind;
        assert_eq!(args.token(16).as_deref(), Some("sub"));
    }
}
