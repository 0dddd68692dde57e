//! Dispatcher behavior: resolution, authorization, and the staff
//! command surface.

mod common;

use common::build_realm;
use tavernd::state::FlagScope;
use tavernd::{Config, Registry};

fn staff_config() -> Config {
    Config::default()
}

async fn grant_staff(realm: &tavernd::Realm, name: &str) {
    let account = realm.find_account(name).expect("account");
    account.write().await.groups |= 0b1000_0000;
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall"]);
    let registry = Registry::standard(&realm.config);
    registry.dispatch(&realm, &"thrall".to_string(), "/frobnicate now").await;
    assert_eq!(messenger.notices_to("thrall"), vec!["Unknown command."]);
}

#[tokio::test]
async fn staff_commands_are_hidden_from_regular_accounts() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);

    registry.dispatch(&realm, &"thrall".to_string(), "/admin +Jaina").await;
    // The refusal names no group and no missing bit.
    assert_eq!(
        messenger.notices_to("thrall"),
        vec!["This command is reserved for admins."]
    );
    let jaina = realm.find_account("Jaina").expect("account");
    assert_eq!(jaina.read().await.auth.admin, FlagScope::Off);
}

#[tokio::test]
async fn removed_group_deactivates_its_commands() {
    let mut config = staff_config();
    config.groups.remove("staff");
    let (realm, messenger, _) = build_realm(config, &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    grant_staff(&realm, "Thrall").await;

    // Even a fully-privileged account only learns "deactivated".
    registry.dispatch(&realm, &"thrall".to_string(), "/admin +Jaina").await;
    assert_eq!(
        messenger.notices_to("thrall"),
        vec!["This command has been deactivated"]
    );
}

#[tokio::test]
async fn granted_group_bit_opens_the_gate() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    grant_staff(&realm, "Thrall").await;

    registry.dispatch(&realm, &"thrall".to_string(), "/admin +Jaina").await;
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("admin authority granted"))
    );
    let jaina = realm.find_account("Jaina").expect("account");
    assert_eq!(jaina.read().await.auth.admin, FlagScope::Global);

    // And the target was told, being online.
    assert!(
        messenger
            .notices_to("jaina")
            .iter()
            .any(|n| n.contains("granted admin authority"))
    );

    registry.dispatch(&realm, &"thrall".to_string(), "/admin -Jaina").await;
    assert_eq!(jaina.read().await.auth.admin, FlagScope::Off);
}

#[tokio::test]
async fn commandgroups_edit_account_masks() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    grant_staff(&realm, "Thrall").await;
    let thrall = "thrall".to_string();

    registry.dispatch(&realm, &thrall, "/cg add Jaina 8").await;
    let jaina = realm.find_account("Jaina").expect("account");
    assert_eq!(jaina.read().await.groups, 0b1000_0001);

    // With bit 8, Jaina may now use the staff surface herself.
    messenger.take();
    registry.dispatch(&realm, &"jaina".to_string(), "/cg list Thrall").await;
    assert!(
        messenger
            .notices_to("jaina")
            .iter()
            .any(|n| n.contains("command groups"))
    );

    registry.dispatch(&realm, &thrall, "/cg del Jaina 8").await;
    assert_eq!(jaina.read().await.groups, 0b0000_0001);

    // Bad digits are rejected wholesale.
    messenger.take();
    registry.dispatch(&realm, &thrall, "/cg add Jaina 19").await;
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("got bad group: 9"))
    );
    assert_eq!(jaina.read().await.groups, 0b0000_0001);
}

#[tokio::test]
async fn longest_prefix_resolution_in_dispatch() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    grant_staff(&realm, "Thrall").await;
    let thrall = "thrall".to_string();

    // "/cg" must reach commandgroups, not the shorter "/c" clan alias.
    registry.dispatch(&realm, &thrall, "/cg list Jaina").await;
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("command groups"))
    );

    // "/c" alone is the clan family.
    messenger.take();
    registry.dispatch(&realm, &thrall, "/c").await;
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("/clan create"))
    );
}

#[tokio::test]
async fn whisper_round_trip() {
    let (realm, messenger, presence) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    let thrall = "thrall".to_string();

    registry.dispatch(&realm, &thrall, "/w Jaina meet me in Orgrimmar").await;
    assert_eq!(messenger.whispers_to("jaina"), vec!["meet me in Orgrimmar"]);
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("You whispered to Jaina"))
    );

    // Offline targets get nothing; the sender is told.
    presence.set_online("jaina", false);
    messenger.take();
    registry.dispatch(&realm, &thrall, "/msg Jaina still there?").await;
    assert!(messenger.whispers_to("jaina").is_empty());
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("not logged on"))
    );
}

#[tokio::test]
async fn lock_and_mute_toggle_flags() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    grant_staff(&realm, "Thrall").await;
    let thrall = "thrall".to_string();
    let jaina = realm.find_account("Jaina").expect("account");

    registry.dispatch(&realm, &thrall, "/lockacct Jaina").await;
    assert!(jaina.read().await.auth.lock.is_set());
    registry.dispatch(&realm, &thrall, "/muteacct Jaina").await;
    assert!(jaina.read().await.auth.mute.is_set());

    registry.dispatch(&realm, &thrall, "/unlockacct Jaina").await;
    registry.dispatch(&realm, &thrall, "/unmuteacct Jaina").await;
    assert!(!jaina.read().await.auth.lock.is_set());
    assert!(!jaina.read().await.auth.mute.is_set());

    // Unknown target surfaces the standard not-found line.
    messenger.take();
    registry.dispatch(&realm, &thrall, "/lockacct Nobody").await;
    assert_eq!(
        messenger.notices_to("thrall"),
        vec!["That user does not exist."]
    );
}

#[tokio::test]
async fn usage_blocks_render_line_by_line() {
    let (realm, messenger, _) = build_realm(staff_config(), &["Thrall"]);
    let registry = Registry::standard(&realm.config);
    registry.dispatch(&realm, &"thrall".to_string(), "/f").await;
    let notices = messenger.notices_to("thrall");
    assert!(notices.len() > 1);
    assert!(notices.iter().all(|n| n.starts_with("Usage:")));
}
