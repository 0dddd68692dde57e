//! tavernd - the command core of a multiplayer chat/game service.
//!
//! A line of text from an authenticated session is tokenized, resolved
//! against the command registry, gated by the invoking account's
//! permission-group bitmask, and dispatched to a handler. Handlers
//! mutate the shared account and clan registries (the [`Realm`]) and
//! talk to the outside world only through the collaborator traits in
//! [`collab`] - the core itself never touches a socket or a disk.

pub mod collab;
pub mod command;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::{CommandError, HandlerResult};
pub use handlers::Registry;
pub use state::Realm;
