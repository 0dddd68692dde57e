//! Domain managers for shared state.
//!
//! Each manager owns one domain of mutation over the Realm's
//! registries. Handlers stay thin: they parse arguments, call a
//! manager, and format the outcome. All invariant checks and the
//! atomicity of state transitions live here.

pub mod clan;
pub mod friends;

pub use clan::{
    AcceptOutcome, ClanError, ClanManager, CreateOutcome, InviteOutcome, MemberView, Membership,
    SetRoleOutcome,
};
pub use friends::{FriendAdded, FriendView, FriendsError, FriendsManager, MoveOutcome};
