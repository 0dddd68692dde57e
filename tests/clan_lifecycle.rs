//! End-to-end clan lifecycle through the command dispatcher.

mod common;

use common::{Delivery, build_realm};
use tavernd::collab::NoticeKind;
use tavernd::{Config, Registry};

fn config(min_invites: u32) -> Config {
    let mut config = Config::default();
    config.limits.clan_min_invites = min_invites;
    config
}

#[tokio::test]
async fn full_lifecycle_create_invite_accept() {
    let (realm, messenger, _) = build_realm(config(2), &["Thrall", "Jaina", "Rexxar", "Cairne"]);
    let registry = Registry::standard(&realm.config);

    registry
        .dispatch(&realm, &"thrall".to_string(), "/clan create WOLF Iron Wolves")
        .await;
    let notices = messenger.notices_to("thrall");
    assert!(notices.iter().any(|n| n.contains("pending")), "{notices:?}");

    registry.dispatch(&realm, &"thrall".to_string(), "/clan invite Jaina").await;
    registry.dispatch(&realm, &"thrall".to_string(), "/clan invite Rexxar").await;
    assert!(
        messenger
            .notices_to("jaina")
            .iter()
            .any(|n| n.contains("invites you to join clan Iron Wolves")),
    );

    // First acceptance stays below the threshold.
    registry.dispatch(&realm, &"jaina".to_string(), "/clan invite accept").await;
    let creation_notices = |msgs: &common::RecordingMessenger| {
        msgs.take()
            .into_iter()
            .filter(|d| {
                matches!(d, Delivery::Notice { kind: NoticeKind::Whisper, text, .. }
                    if text.contains("has been created"))
            })
            .count()
    };
    assert_eq!(creation_notices(&messenger), 0);

    // Second acceptance meets it: exactly one creation notice per
    // online member.
    registry.dispatch(&realm, &"rexxar".to_string(), "/clan invite accept").await;
    assert_eq!(creation_notices(&messenger), 3);

    // A later invitee joins an already-created clan with no re-fire.
    registry.dispatch(&realm, &"thrall".to_string(), "/clan invite Cairne").await;
    registry.dispatch(&realm, &"cairne".to_string(), "/clan invite accept").await;
    assert_eq!(creation_notices(&messenger), 0);
    assert!(
        messenger
            .notices_to("cairne")
            .iter()
            .any(|n| n.contains("Welcome to clan Iron Wolves"))
    );
}

#[tokio::test]
async fn clan_tag_too_long_is_rejected_not_truncated() {
    let (realm, messenger, _) = build_realm(config(0), &["Thrall"]);
    let registry = Registry::standard(&realm.config);

    registry
        .dispatch(&realm, &"thrall".to_string(), "/clan create WOLVES Iron Wolves")
        .await;
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("too long"))
    );
    // No clan was created under any truncation of the tag.
    assert!(realm.find_clan("WOLV").is_none());
    assert!(realm.find_clan("WOLVES").is_none());
}

#[tokio::test]
async fn second_create_conflicts() {
    let (realm, messenger, _) = build_realm(config(0), &["Thrall"]);
    let registry = Registry::standard(&realm.config);
    registry
        .dispatch(&realm, &"thrall".to_string(), "/clan create WOLF Iron Wolves")
        .await;
    messenger.take();

    registry
        .dispatch(&realm, &"thrall".to_string(), "/clan create BEAR Bears")
        .await;
    assert!(realm.find_clan("BEAR").is_none());
    assert!(
        messenger
            .notices_to("thrall")
            .iter()
            .any(|n| n.contains("already in a clan"))
    );
}

#[tokio::test]
async fn decline_leaves_no_relation() {
    let (realm, messenger, _) = build_realm(config(2), &["Thrall", "Jaina"]);
    let registry = Registry::standard(&realm.config);
    registry
        .dispatch(&realm, &"thrall".to_string(), "/clan create WOLF Iron Wolves")
        .await;
    registry.dispatch(&realm, &"thrall".to_string(), "/clan invite Jaina").await;
    registry.dispatch(&realm, &"jaina".to_string(), "/clan invite decline").await;
    assert!(
        messenger
            .notices_to("jaina")
            .iter()
            .any(|n| n.contains("declined"))
    );

    // Jaina is an outsider again: the outsider surface answers.
    messenger.take();
    registry.dispatch(&realm, &"jaina".to_string(), "/clan list").await;
    assert!(
        messenger
            .notices_to("jaina")
            .iter()
            .any(|n| n.contains("/clan create"))
    );
}

#[tokio::test]
async fn kick_respects_rank_order() {
    let (realm, messenger, _) = build_realm(config(0), &["Chief", "Aggra", "Nazgrel"]);
    let registry = Registry::standard(&realm.config);
    let chief = "chief".to_string();
    registry.dispatch(&realm, &chief, "/clan create WOLF Iron Wolves").await;
    for name in ["Aggra", "Nazgrel"] {
        registry.dispatch(&realm, &chief, &format!("/clan invite {name}")).await;
        registry
            .dispatch(&realm, &name.to_lowercase(), "/clan invite accept")
            .await;
    }
    registry.dispatch(&realm, &chief, "/clan shaman Aggra").await;
    messenger.take();

    // A Peon cannot kick at all.
    registry
        .dispatch(&realm, &"nazgrel".to_string(), "/clan kick Aggra")
        .await;
    assert!(
        messenger
            .notices_to("nazgrel")
            .iter()
            .any(|n| n.contains("authority"))
    );

    // A Shaman cannot touch the Chieftain.
    registry.dispatch(&realm, &"aggra".to_string(), "/clan kick Chief").await;
    assert!(
        messenger
            .notices_to("aggra")
            .iter()
            .any(|n| n.contains("Chieftain"))
    );

    // But outranks the Peon.
    registry.dispatch(&realm, &"aggra".to_string(), "/clan kick Nazgrel").await;
    assert!(
        messenger
            .notices_to("aggra")
            .iter()
            .any(|n| n.contains("Kicked Nazgrel"))
    );
}

#[tokio::test]
async fn out_and_disband_require_confirmation() {
    let (realm, messenger, _) = build_realm(config(0), &["Chief", "Aggra"]);
    let registry = Registry::standard(&realm.config);
    let chief = "chief".to_string();
    registry.dispatch(&realm, &chief, "/clan create WOLF Iron Wolves").await;
    registry.dispatch(&realm, &chief, "/clan invite Aggra").await;
    registry.dispatch(&realm, &"aggra".to_string(), "/clan invite accept").await;
    messenger.take();

    // Bare `/clan out` only warns.
    registry.dispatch(&realm, &"aggra".to_string(), "/clan out").await;
    assert!(
        messenger
            .notices_to("aggra")
            .iter()
            .any(|n| n.contains("/clan out yes"))
    );
    assert!(realm.find_clan("WOLF").is_some());
    registry.dispatch(&realm, &"aggra".to_string(), "/clan out yes").await;
    assert!(
        messenger
            .notices_to("aggra")
            .iter()
            .any(|n| n.contains("left your clan"))
    );

    // Same two-step shape for disband.
    registry.dispatch(&realm, &chief, "/clan disband").await;
    assert!(realm.find_clan("WOLF").is_some());
    registry.dispatch(&realm, &chief, "/clan disband yes").await;
    assert!(realm.find_clan("WOLF").is_none());
}

#[tokio::test]
async fn clan_message_reaches_online_members_only() {
    let (realm, messenger, presence) = build_realm(config(0), &["Chief", "Aggra", "Nazgrel"]);
    let registry = Registry::standard(&realm.config);
    let chief = "chief".to_string();
    registry.dispatch(&realm, &chief, "/clan create WOLF Iron Wolves").await;
    for name in ["Aggra", "Nazgrel"] {
        registry.dispatch(&realm, &chief, &format!("/clan invite {name}")).await;
        registry
            .dispatch(&realm, &name.to_lowercase(), "/clan invite accept")
            .await;
    }
    presence.set_online("nazgrel", false);
    messenger.take();

    registry.dispatch(&realm, &chief, "/clan msg rally at the keep").await;
    assert_eq!(messenger.whispers_to("aggra"), vec!["rally at the keep"]);
    assert!(messenger.whispers_to("nazgrel").is_empty());
    assert!(messenger.whispers_to("chief").is_empty());
}

#[tokio::test]
async fn motd_and_channel_feed_back() {
    let (realm, messenger, _) = build_realm(config(0), &["Chief"]);
    let registry = Registry::standard(&realm.config);
    let chief = "chief".to_string();
    registry.dispatch(&realm, &chief, "/clan create WOLF Iron Wolves").await;
    messenger.take();

    registry.dispatch(&realm, &chief, "/clan motd For the horde").await;
    registry.dispatch(&realm, &chief, "/clan channel Wolf Den").await;
    let notices = messenger.notices_to("chief");
    assert!(notices.iter().any(|n| n.contains("message of the day")));
    assert!(notices.iter().any(|n| n.contains("Wolf Den")));

    let clan = realm.find_clan("WOLF").expect("clan");
    let clan = clan.read().await;
    assert_eq!(clan.motd, "For the horde");
    assert_eq!(clan.channel, "Wolf Den");
}
