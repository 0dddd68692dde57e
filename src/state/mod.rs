//! Shared state: account and clan registries plus the domain managers
//! that mutate them.

mod account;
mod clan;
pub mod managers;
mod realm;

pub use account::{Account, AccountKey, AuthFlags, FlagScope, account_key};
pub use clan::{Clan, ClanMember, ClanRole, clan_key};
pub use realm::Realm;
