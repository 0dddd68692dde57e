//! Unified error handling for tavernd.
//!
//! One error hierarchy covers the whole command path: tokenization,
//! authorization, and the clan/friends state machines. Every variant
//! except `Internal` is recovered locally - the dispatcher renders it
//! as plain text to the invoking session and the command simply ends.
//! `Internal` marks a broken collaborator invariant: it is logged at
//! error level, the current command is aborted, and the session stays
//! alive.

use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Missing or malformed arguments. Carries the usage block to show,
    /// one line per entry.
    #[error("bad usage")]
    Usage(&'static str),

    #[error("that user does not exist")]
    NotFound,

    #[error("no such clan")]
    NoSuchClan,

    /// The account's group bitmask has no bit in common with the
    /// command's required mask. The specific missing bit is never
    /// reported.
    #[error("command reserved for admins")]
    PermissionDenied,

    /// No group mapping exists for the command (disabled at runtime).
    #[error("command deactivated")]
    Deactivated,

    /// A state/role precondition failed; the message is shown verbatim.
    #[error("{0}")]
    StateConflict(String),

    #[error("friends list full (max {0})")]
    CapacityExceeded(usize),

    #[error("self-targeting not allowed")]
    SelfReference,

    /// A field whose contract requires rejection rather than truncation
    /// (e.g. a clan tag) exceeded its maximum length.
    #[error("argument too long")]
    ArgumentTooLong,

    /// A required collaborator reference was unexpectedly absent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Static code for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::NotFound => "not_found",
            Self::NoSuchClan => "no_such_clan",
            Self::PermissionDenied => "permission_denied",
            Self::Deactivated => "deactivated",
            Self::StateConflict(_) => "state_conflict",
            Self::CapacityExceeded(_) => "capacity_exceeded",
            Self::SelfReference => "self_reference",
            Self::ArgumentTooLong => "argument_too_long",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Lines of plain text to report to the invoking session.
    ///
    /// Returns `None` for `Internal` - internal failures never leak
    /// state to the user.
    pub fn user_lines(&self) -> Option<Vec<String>> {
        match self {
            Self::Usage(block) => Some(block.lines().map(str::to_string).collect()),
            Self::NotFound => Some(vec!["That user does not exist.".to_string()]),
            Self::NoSuchClan => Some(vec!["No such clan.".to_string()]),
            Self::PermissionDenied => {
                Some(vec!["This command is reserved for admins.".to_string()])
            }
            Self::Deactivated => Some(vec!["This command has been deactivated".to_string()]),
            Self::StateConflict(text) => Some(vec![text.clone()]),
            Self::CapacityExceeded(max) => Some(vec![format!(
                "You can only have a maximum of {max} friends."
            )]),
            Self::SelfReference => Some(vec!["You can't choose yourself!".to_string()]),
            Self::ArgumentTooLong => Some(vec!["That name is too long.".to_string()]),
            Self::Internal(_) => None,
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), CommandError>;
