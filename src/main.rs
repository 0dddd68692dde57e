//! Console front-end for the tavernd command core.
//!
//! Reads command lines from stdin as a single staff session and prints
//! everything the core would deliver over the wire. Useful for poking
//! at the dispatch pipeline without a network front-end.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tavernd::collab::{
    Location, Messenger, NoticeKind, Presence, PresenceSummary, WireAck,
};
use tavernd::state::{Account, AccountKey};
use tavernd::{Config, Realm, Registry};

/// Presence double for the console: every registered account counts as
/// online.
struct ConsolePresence;

impl Presence for ConsolePresence {
    fn locate(&self, _account: &AccountKey) -> PresenceSummary {
        PresenceSummary {
            location: Location::Online,
            ..Default::default()
        }
    }
}

/// Prints every delivery instead of enqueueing it to a socket.
struct ConsoleMessenger;

impl Messenger for ConsoleMessenger {
    fn notify(&self, to: &AccountKey, kind: NoticeKind, text: &str) {
        let label = match kind {
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
            NoticeKind::Whisper => "whisper",
            NoticeKind::WhisperAck => "sent",
        };
        println!("-> {to} [{label}] {text}");
    }

    fn whisper(&self, from: &str, to: &AccountKey, text: &str) {
        println!("-> {to} [whisper] <from {from}> {text}");
    }

    fn ack(&self, to: &AccountKey, ack: WireAck) {
        println!("-> {to} [ack] {ack:?}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = if Path::new(&config_path).exists() {
        Config::load(&config_path)
            .with_context(|| format!("loading config from {config_path}"))?
    } else {
        info!(path = %config_path, "config file not found, using defaults");
        Config::default()
    };
    info!(server = %config.server.name, "starting console session");

    let realm = Arc::new(
        Realm::new(Arc::new(config))
            .with_presence(Arc::new(ConsolePresence))
            .with_messenger(Arc::new(ConsoleMessenger)),
    );
    let registry = Registry::standard(&realm.config);

    // The console account holds every group bit, so all commands are
    // reachable for experimentation.
    let mut console = Account::new("console");
    console.groups = 0xFF;
    realm.add_account(console);
    let session: AccountKey = "console".to_string();

    // Seed a few accounts to play with.
    for name in ["Thrall", "Jaina", "Rexxar"] {
        realm.add_account(Account::new(name));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim() == "quit" {
            break;
        }
        registry.dispatch(&realm, &session, &line).await;
    }
    Ok(())
}
