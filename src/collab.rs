//! External collaborator contracts.
//!
//! The command core never performs socket I/O, hashing, or file
//! persistence itself. Everything it needs from the surrounding system
//! comes through the narrow traits here: where a session currently is
//! ([`Presence`]), how text and acks reach a session ([`Messenger`]),
//! where mutated entities get persisted ([`Storage`]), and the optional
//! secondary resolver for `//`-prefixed input ([`AliasResolver`]).
//!
//! Every method is a non-blocking enqueue or lookup. Handlers never
//! wait on delivery, and delivery failure is not a rollback condition.

use crate::state::{Account, AccountKey, Clan};

/// Where a session currently is, as reported by the connection
/// directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Location {
    #[default]
    Offline,
    Online,
    Channel,
    PublicGame,
    PrivateGame,
}

/// Presence snapshot for one account.
#[derive(Debug, Clone, Default)]
pub struct PresenceSummary {
    pub location: Location,
    /// Channel or game name, empty when not applicable.
    pub location_name: String,
    /// Client software tag, when online.
    pub clienttag: Option<String>,
    pub away: bool,
    pub dnd: bool,
}

impl PresenceSummary {
    pub fn is_online(&self) -> bool {
        self.location != Location::Offline
    }
}

/// Connection-directory lookup.
pub trait Presence: Send + Sync {
    fn locate(&self, account: &AccountKey) -> PresenceSummary;

    fn is_online(&self, account: &AccountKey) -> bool {
        self.locate(account).is_online()
    }
}

/// Classification of an outbound text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
    Whisper,
    /// Echo of a whisper back to its sender.
    WhisperAck,
}

/// Mutual-friend bit in a friend-add ack's status flags.
pub const FRIEND_FLAG_MUTUAL: u8 = 0x01;
/// Do-not-disturb bit.
pub const FRIEND_FLAG_DND: u8 = 0x02;
/// Away bit.
pub const FRIEND_FLAG_AWAY: u8 = 0x04;

/// Logical payloads the core must hand to the wire layer. Byte layout
/// is the wire layer's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireAck {
    FriendAdd {
        target_name: String,
        location: Location,
        status_flags: u8,
        clienttag: Option<String>,
        /// Game or channel name, empty otherwise.
        location_name: String,
    },
    FriendRemove {
        /// 1-based position the entry held before removal.
        removed_position: u8,
    },
    FriendMove {
        position_a: u8,
        position_b: u8,
    },
}

/// Outbound delivery. Implementations enqueue and return immediately.
pub trait Messenger: Send + Sync {
    fn notify(&self, to: &AccountKey, kind: NoticeKind, text: &str);
    fn whisper(&self, from: &str, to: &AccountKey, text: &str);
    fn ack(&self, to: &AccountKey, ack: WireAck);
}

/// Persistence signal. The core mutates in-memory state and tells the
/// storage collaborator to write it out; it never touches files.
pub trait Storage: Send + Sync {
    fn save_account(&self, account: &Account);
    fn save_clan(&self, clan: &Clan);
    fn remove_clan(&self, tag: &str);
}

/// Secondary resolver for `//`-prefixed input, consulted only when
/// `limits.extra_commands` is set. Returns true when the line was
/// consumed.
pub trait AliasResolver: Send + Sync {
    fn resolve(&self, session: &AccountKey, line: &str) -> bool;
}

/// Presence that reports every account offline.
#[derive(Debug, Default)]
pub struct NullPresence;

impl Presence for NullPresence {
    fn locate(&self, _account: &AccountKey) -> PresenceSummary {
        PresenceSummary::default()
    }
}

/// Messenger that drops everything.
#[derive(Debug, Default)]
pub struct NullMessenger;

impl Messenger for NullMessenger {
    fn notify(&self, _to: &AccountKey, _kind: NoticeKind, _text: &str) {}
    fn whisper(&self, _from: &str, _to: &AccountKey, _text: &str) {}
    fn ack(&self, _to: &AccountKey, _ack: WireAck) {}
}

/// Storage that persists nothing.
#[derive(Debug, Default)]
pub struct NullStorage;

impl Storage for NullStorage {
    fn save_account(&self, _account: &Account) {}
    fn save_clan(&self, _clan: &Clan) {}
    fn remove_clan(&self, _tag: &str) {}
}

/// Alias resolver that consumes nothing.
#[derive(Debug, Default)]
pub struct NoAliases;

impl AliasResolver for NoAliases {
    fn resolve(&self, _session: &AccountKey, _line: &str) -> bool {
        false
    }
}
