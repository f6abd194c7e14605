//! Message and notification routes

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use chathub::shared::frame::OutboundFrame;

use super::{json_body, request};
use crate::common::{bearer, connect, test_app};

#[tokio::test]
async fn test_send_message_persists_and_delivers() {
    let (app, state, store) = test_app().await;
    let (mut bob, _b) = connect(&state.realtime, "bob").await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/messages",
            Some(&bearer("alice")),
            Some(json!({"content": "over http", "receiver_id": "bob"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["sender_id"], "alice");
    assert_eq!(body["body"], "over http");
    assert_eq!(body["message_type"], "text");

    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Chat(message) => {
        assert_eq!(message.id.to_string(), body["id"].as_str().unwrap());
    });
    bob.expect_no_frame().await;
    assert_eq!(store.messages().await.len(), 1);
}

#[tokio::test]
async fn test_send_unaddressed_message_is_400() {
    let (app, _state, store) = test_app().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/messages",
            Some(&bearer("alice")),
            Some(json!({"content": "nobody"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("receiver"));
    assert!(store.messages().await.is_empty());
}

#[tokio::test]
async fn test_send_empty_message_is_400() {
    let (app, _state, _store) = test_app().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/messages",
            Some(&bearer("alice")),
            Some(json!({"content": "", "group_id": "team"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_message_requires_token() {
    let (app, _state, _store) = test_app().await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/messages",
            None,
            Some(json!({"content": "hi", "receiver_id": "bob"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mark_read_publishes_receipt() {
    let (app, state, _store) = test_app().await;
    let (mut alice, _a) = connect(&state.realtime, "alice").await;

    let message = state
        .messages
        .persist("alice", chathub::shared::MessageDraft::direct("bob", "read me"))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/messages/{}/read", message.id),
            Some(&bearer("bob")),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["read_by"], json!(["bob"]));

    assert_matches!(alice.recv_chat_frame().await, OutboundFrame::Read(receipt) => {
        assert_eq!(receipt.message_id, message.id);
        assert_eq!(receipt.user_id, "bob");
    });
}

#[tokio::test]
async fn test_mark_read_by_stranger_is_403() {
    let (app, state, _store) = test_app().await;
    let message = state
        .messages
        .persist("alice", chathub::shared::MessageDraft::direct("bob", "private"))
        .await
        .unwrap();

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/messages/{}/read", message.id),
            Some(&bearer("dave")),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_mark_read_unknown_message_is_404() {
    let (app, _state, _store) = test_app().await;

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/messages/{}/read", uuid::Uuid::new_v4()),
            Some(&bearer("bob")),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_notification_broadcasts() {
    let (app, state, store) = test_app().await;
    let (mut bob, _b) = connect(&state.realtime, "bob").await;

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/notifications",
            Some(&bearer("alice")),
            Some(json!({"kind": "system", "title": "Maintenance", "content": "at noon"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_matches!(bob.recv_chat_frame().await, OutboundFrame::Notification(notification) => {
        assert_eq!(notification.title, "Maintenance");
    });
    assert_eq!(store.notifications().await.len(), 1);
}
