// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::transport_tests::MockTransport;
use hl_core::Command;
use std::time::Duration;

async fn connected() -> (Connection<MockTransport>, MockTransport) {
    let broker = MockTransport::new();
    let mut conn = Connection::new("ws://localhost/ws", Duration::from_secs(5), broker.clone());
    conn.connect("token").await.unwrap();
    (conn, broker)
}

fn offline() -> Connection<MockTransport> {
    Connection::new("ws://localhost/ws", Duration::from_secs(5), MockTransport::new())
}

fn live_topics(conn: &Connection<MockTransport>) -> Vec<String> {
    let mut topics: Vec<String> = conn.live_topics().map(|t| t.to_string()).collect();
    topics.sort();
    topics
}

#[tokio::test]
async fn subscribe_to_thread_twice_keeps_one_of_each() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();

    assert!(subs.subscribe_to_thread(&mut conn, "t1"));
    assert!(subs.subscribe_to_thread(&mut conn, "t1"));

    assert_eq!(
        live_topics(&conn),
        vec!["/topic/threads/t1", "/topic/threads/t1/typing"]
    );
}

#[tokio::test]
async fn switching_threads_cancels_previous() {
    let (mut conn, broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.subscribe_to_thread(&mut conn, "t1");
    subs.subscribe_to_thread(&mut conn, "t2");
    conn.flush().await.unwrap();

    assert_eq!(
        live_topics(&conn),
        vec!["/topic/threads/t2", "/topic/threads/t2/typing"]
    );
    assert_eq!(broker.sent(Command::Unsubscribe).len(), 2);
    assert_eq!(subs.active_thread_id(), Some("t2"));
}

#[tokio::test]
async fn offline_thread_intent_applies_on_ready() {
    let mut conn = offline();
    let mut subs = SubscriptionManager::new();

    assert!(!subs.subscribe_to_thread(&mut conn, "t1"));
    assert_eq!(conn.live_count(), 0);

    conn.connect("token").await.unwrap();
    assert!(subs.on_ready(&mut conn));
    assert_eq!(
        live_topics(&conn),
        vec!["/topic/threads/t1", "/topic/threads/t1/typing"]
    );
}

#[tokio::test]
async fn thread_updates_follow_viewer_role() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();

    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::support("s1")));
    subs.subscribe_to_thread_updates(&mut conn);
    assert_eq!(live_topics(&conn), vec!["/topic/threads"]);

    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::client("u1")));
    assert_eq!(live_topics(&conn), vec!["/topic/users/u1/threads"]);

    subs.set_thread_updates_topic(&mut conn, None);
    assert_eq!(conn.live_count(), 0);
    assert!(subs.wants_thread_updates());
}

#[tokio::test]
async fn thread_updates_without_topic_subscribe_nothing() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.subscribe_to_thread_updates(&mut conn);
    subs.subscribe_to_thread_updates(&mut conn);
    assert_eq!(conn.live_count(), 0);
}

#[tokio::test]
async fn repeated_thread_update_subscribe_keeps_one() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::support("s1")));
    subs.subscribe_to_thread_updates(&mut conn);
    subs.subscribe_to_thread_updates(&mut conn);
    assert_eq!(conn.live_count(), 1);
}

#[tokio::test]
async fn reconnect_reissues_everything() {
    let (mut conn, broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::client("u1")));
    subs.subscribe_to_thread_updates(&mut conn);
    subs.subscribe_to_thread(&mut conn, "t1");
    conn.flush().await.unwrap();

    broker.drop_connection();
    assert!(matches!(conn.recv().await, crate::connection::Received::Lost(_)));
    conn.connect("token").await.unwrap();
    broker.clear_outgoing();

    assert!(subs.on_ready(&mut conn));
    conn.flush().await.unwrap();

    assert_eq!(conn.live_count(), 3);
    assert_eq!(broker.sent(Command::Subscribe).len(), 3);
    assert!(broker.sent(Command::Unsubscribe).is_empty());
}

#[tokio::test]
async fn route_identifies_live_handles() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::support("s1")));
    subs.subscribe_to_thread_updates(&mut conn);
    subs.subscribe_to_thread(&mut conn, "t1");

    let mut kinds: Vec<_> = [0, 1, 2, 3]
        .iter()
        .map(|n| subs.route(format!("sub-{}", n).parse().unwrap()))
        .collect();
    kinds.sort_by_key(|k| format!("{:?}", k));
    assert_eq!(
        kinds,
        vec![
            None,
            Some(SubscriptionKind::Messages),
            Some(SubscriptionKind::ThreadUpdates),
            Some(SubscriptionKind::Typing),
        ]
    );
}

#[tokio::test]
async fn leave_thread_cancels_per_thread_handles() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.subscribe_to_thread(&mut conn, "t1");
    subs.leave_thread(&mut conn);

    assert_eq!(conn.live_count(), 0);
    assert!(subs.active_thread_id().is_none());
    assert!(!subs.on_ready(&mut conn));
}

#[tokio::test]
async fn reset_forgets_intents() {
    let (mut conn, _broker) = connected().await;
    let mut subs = SubscriptionManager::new();
    subs.set_thread_updates_topic(&mut conn, Some(&Viewer::support("s1")));
    subs.subscribe_to_thread_updates(&mut conn);
    subs.subscribe_to_thread(&mut conn, "t1");

    subs.reset(&mut conn);

    assert_eq!(conn.live_count(), 0);
    assert!(!subs.wants_thread_updates());
    assert!(subs.thread_updates_topic().is_none());
    assert!(subs.active_thread_id().is_none());
}
