//! Shared test doubles for the integration suite.
#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use tavernd::collab::{
    Location, Messenger, NoticeKind, Presence, PresenceSummary, WireAck,
};
use tavernd::state::{Account, AccountKey};
use tavernd::{Config, Realm};

/// One captured outbound delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Notice {
        to: AccountKey,
        kind: NoticeKind,
        text: String,
    },
    Whisper {
        from: String,
        to: AccountKey,
        text: String,
    },
    Ack {
        to: AccountKey,
        ack: WireAck,
    },
}

/// Messenger that records every delivery for assertions.
#[derive(Default)]
pub struct RecordingMessenger {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingMessenger {
    pub fn take(&self) -> Vec<Delivery> {
        std::mem::take(&mut self.deliveries.lock())
    }

    /// Notice texts sent to `to`, in order.
    pub fn notices_to(&self, to: &str) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Notice { to: t, text, .. } if t == to => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whisper texts delivered to `to`, in order.
    pub fn whispers_to(&self, to: &str) -> Vec<String> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Whisper { to: t, text, .. } if t == to => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Wire acks delivered to `to`, in order.
    pub fn acks_to(&self, to: &str) -> Vec<WireAck> {
        self.deliveries
            .lock()
            .iter()
            .filter_map(|d| match d {
                Delivery::Ack { to: t, ack } if t == to => Some(ack.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Messenger for RecordingMessenger {
    fn notify(&self, to: &AccountKey, kind: NoticeKind, text: &str) {
        self.deliveries.lock().push(Delivery::Notice {
            to: to.clone(),
            kind,
            text: text.to_string(),
        });
    }

    fn whisper(&self, from: &str, to: &AccountKey, text: &str) {
        self.deliveries.lock().push(Delivery::Whisper {
            from: from.to_string(),
            to: to.clone(),
            text: text.to_string(),
        });
    }

    fn ack(&self, to: &AccountKey, ack: WireAck) {
        self.deliveries.lock().push(Delivery::Ack {
            to: to.clone(),
            ack,
        });
    }
}

/// Presence double with a mutable online set.
#[derive(Default)]
pub struct StaticPresence {
    online: Mutex<HashSet<AccountKey>>,
}

impl StaticPresence {
    pub fn set_online(&self, key: &str, online: bool) {
        let mut set = self.online.lock();
        if online {
            set.insert(key.to_string());
        } else {
            set.remove(key);
        }
    }
}

impl Presence for StaticPresence {
    fn locate(&self, account: &AccountKey) -> PresenceSummary {
        if self.online.lock().contains(account) {
            PresenceSummary {
                location: Location::Online,
                ..Default::default()
            }
        } else {
            PresenceSummary::default()
        }
    }
}

/// Realm with recording collaborators and the given accounts, all
/// marked online.
pub fn build_realm(
    config: Config,
    names: &[&str],
) -> (Arc<Realm>, Arc<RecordingMessenger>, Arc<StaticPresence>) {
    let messenger = Arc::new(RecordingMessenger::default());
    let presence = Arc::new(StaticPresence::default());
    let realm = Arc::new(
        Realm::new(Arc::new(config))
            .with_messenger(messenger.clone())
            .with_presence(presence.clone()),
    );
    for name in names {
        realm.add_account(Account::new(*name));
        presence.set_online(&name.to_lowercase(), true);
    }
    (realm, messenger, presence)
}
