//! End-to-end delivery over fake transports

use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;

use chathub::backend::store::ChatStore;
use chathub::shared::frame::OutboundFrame;
use chathub::shared::message::{MessageDraft, NotificationDraft};

use crate::assert_frame_type;
use crate::common::{connect, expect_chat, test_realtime};

#[tokio::test]
async fn test_direct_chat_reaches_receiver() {
    let (realtime, store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    alice.send_json(json!({"type": "chat", "content": {"receiver_id": "bob", "body": "hi"}}));

    let frame = assert_frame_type!(bob.recv_chat_frame().await, "chat");
    assert_matches!(frame, OutboundFrame::Chat(message) => {
        assert_eq!(message.body, "hi");
        assert_eq!(message.sender_id, "alice");
        assert_eq!(message.receiver_id.as_deref(), Some("bob"));

        let stored = store.messages().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, message.id);
    });

    alice.expect_no_frame().await;
}

#[tokio::test]
async fn test_direct_chat_to_offline_user_is_persisted_only() {
    let (realtime, store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;

    alice.send_json(json!({"type": "chat", "content": {"receiver_id": "bob", "body": "later"}}));

    alice.expect_no_frame().await;
    let stored = store.messages().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].body, "later");
}

#[tokio::test]
async fn test_group_chat_skips_disconnected_member_and_sender() {
    let (realtime, store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    alice.send_json(json!({"type": "chat", "content": {"group_id": "team", "body": "standup"}}));

    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Chat(message) => {
        assert_eq!(message.group_id.as_deref(), Some("team"));
        assert_eq!(message.body, "standup");
    });
    bob.expect_no_frame().await;
    alice.expect_no_frame().await;
    assert_eq!(store.messages().await.len(), 1);
    assert!(!realtime.presence().is_online("carol"));
}

#[tokio::test]
async fn test_unknown_group_is_persisted_but_not_delivered() {
    let (realtime, store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    alice.send_json(json!({"type": "chat", "content": {"group_id": "ghosts", "body": "boo"}}));

    bob.expect_no_frame().await;
    alice.expect_no_frame().await;
    assert_eq!(store.messages().await.len(), 1);
}

#[tokio::test]
async fn test_read_receipt_reaches_every_connection_once() {
    let (realtime, store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut carol, _c) = connect(&realtime, "carol").await;

    alice.send_json(json!({"type": "chat", "content": {"receiver_id": "bob", "body": "read me"}}));
    let message_id = expect_chat(bob.recv_chat_frame().await).id;

    bob.send_json(json!({"type": "read", "content": {"message_id": message_id}}));

    for peer in [&mut alice, &mut bob, &mut carol] {
        assert_matches!(peer.recv_chat_frame().await, OutboundFrame::Read(receipt) => {
            assert_eq!(receipt.message_id, message_id);
            assert_eq!(receipt.user_id, "bob");
            assert!(!receipt.is_group);
        });
        peer.expect_no_frame().await;
    }

    let stored = store.get_message(message_id).await.unwrap();
    assert_eq!(stored.read_by, vec!["bob".to_string()]);
}

#[tokio::test]
async fn test_group_read_goes_to_group_members() {
    let (realtime, _store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut dave, _d) = connect(&realtime, "dave").await;

    alice.send_json(json!({"type": "chat", "content": {"group_id": "pair", "body": "just us"}}));
    let message_id = expect_chat(bob.recv_chat_frame().await).id;

    bob.send_json(json!({"type": "group_read", "content": {"message_id": message_id}}));

    for peer in [&mut alice, &mut bob] {
        assert_matches!(peer.recv_chat_frame().await, OutboundFrame::GroupRead(receipt) => {
            assert_eq!(receipt.message_id, message_id);
            assert_eq!(receipt.read_by_user, "bob");
            assert_eq!(receipt.read_count, 1);
        });
    }
    dave.expect_no_frame().await;
}

#[tokio::test]
async fn test_read_by_outsider_is_not_published() {
    let (realtime, _store) = test_realtime().await;
    let (alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut dave, _d) = connect(&realtime, "dave").await;

    alice.send_json(json!({"type": "chat", "content": {"receiver_id": "bob", "body": "private"}}));
    let message_id = expect_chat(bob.recv_chat_frame().await).id;

    dave.send_json(json!({"type": "read", "content": {"message_id": message_id}}));

    dave.expect_no_frame().await;
    bob.expect_no_frame().await;
}

#[tokio::test]
async fn test_typing_is_relayed_without_persistence() {
    let (realtime, store) = test_realtime().await;
    let (alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    alice.send_json(json!({"type": "typing", "content": {"receiver_id": "bob", "is_typing": true}}));

    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Typing(typing) => {
        assert_eq!(typing.user_id, "alice");
        assert!(typing.is_typing);
    });
    assert!(store.messages().await.is_empty());
}

#[tokio::test]
async fn test_group_typing_excludes_sender() {
    let (realtime, _store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut carol, _c) = connect(&realtime, "carol").await;

    alice.send_json(json!({"type": "typing", "content": {"group_id": "team"}}));

    for peer in [&mut bob, &mut carol] {
        assert_matches!(peer.recv_chat_frame().await, OutboundFrame::Typing(typing) => {
            assert_eq!(typing.group_id.as_deref(), Some("team"));
        });
    }
    alice.expect_no_frame().await;
}

#[tokio::test]
async fn test_unaddressed_notification_is_broadcast() {
    let (realtime, _store) = test_realtime().await;
    let (alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut carol, _c) = connect(&realtime, "carol").await;

    alice.send_json(json!({"type": "notification", "content": {"title": "Deploy", "content": "shipping now"}}));

    for peer in [&mut bob, &mut carol] {
        assert_matches!(peer.recv_chat_frame().await, OutboundFrame::Notification(notification) => {
            assert_eq!(notification.content, "shipping now");
            assert_eq!(notification.sender_id.as_deref(), Some("alice"));
        });
    }
}

#[tokio::test]
async fn test_addressed_notification_reaches_one_user() {
    let (realtime, _store) = test_realtime().await;
    let (alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, _b) = connect(&realtime, "bob").await;
    let (mut carol, _c) = connect(&realtime, "carol").await;

    alice.send_json(json!({"type": "notification", "content": {"user_id": "carol", "content": "ping"}}));

    assert_matches!(carol.recv_chat_frame().await, OutboundFrame::Notification(_));
    bob.expect_no_frame().await;
}

#[tokio::test]
async fn test_service_send_is_delivered_once_through_the_bus() {
    let (realtime, _store) = test_realtime().await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    realtime
        .messages()
        .send("alice", MessageDraft::direct("bob", "from http"))
        .await
        .unwrap();

    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Chat(message) => {
        assert_eq!(message.body, "from http");
    });
    bob.expect_no_frame().await;
}

#[tokio::test]
async fn test_published_notification_is_delivered() {
    let (realtime, store) = test_realtime().await;
    let (mut bob, _b) = connect(&realtime, "bob").await;

    let notifications = chathub::backend::chat::NotificationService::new(store.clone(), realtime.bus().clone());
    let draft = NotificationDraft {
        user_id: Some("bob".into()),
        content: "welcome".into(),
        ..NotificationDraft::default()
    };
    notifications.create(None, draft).await.unwrap();

    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Notification(notification) => {
        assert_eq!(notification.content, "welcome");
        assert!(notification.sender_id.is_none());
    });
    assert_eq!(store.notifications().await.len(), 1);
}

#[tokio::test]
async fn test_presence_changes_are_broadcast() {
    let (realtime, _store) = test_realtime().await;
    let (mut alice, _a) = connect(&realtime, "alice").await;
    let (mut bob, bob_task) = connect(&realtime, "bob").await;

    let mut seen = Vec::new();
    while !seen.contains(&("bob".to_string(), true)) {
        if let OutboundFrame::Online(status) = alice.recv_frame().await {
            seen.push((status.user_id, status.is_online));
        }
    }

    bob.hang_up();
    tokio::time::timeout(Duration::from_secs(2), bob_task).await.unwrap().unwrap();

    loop {
        if let OutboundFrame::Online(status) = alice.recv_frame().await {
            if status.user_id == "bob" && !status.is_online {
                break;
            }
        }
    }
    assert_eq!(
        realtime.presence().list_online().into_iter().collect::<Vec<_>>(),
        vec!["alice".to_string()]
    );
}
