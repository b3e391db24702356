// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    messages = { Topic::ThreadMessages("t-1".into()), "/topic/threads/t-1" },
    typing = { Topic::ThreadTyping("t-1".into()), "/topic/threads/t-1/typing" },
    all_threads = { Topic::AllThreads, "/topic/threads" },
    user_threads = { Topic::UserThreads("c-1".into()), "/topic/users/c-1/threads" },
)]
fn topic_paths(topic: Topic, path: &str) {
    assert_eq!(topic.to_string(), path);
    assert_eq!(path.parse::<Topic>().unwrap(), topic);
}

#[parameterized(
    queue = { "/queue/errors" },
    trailing_slash = { "/topic/threads/" },
    unknown_suffix = { "/topic/threads/t-1/read" },
    users_without_threads = { "/topic/users/c-1" },
    app_destination = { "/app/chat.send" },
)]
fn topic_rejects_unknown_paths(path: &str) {
    let err = path.parse::<Topic>().unwrap_err();
    assert!(matches!(err, Error::UnknownTopic(_)));
}

#[test]
fn topic_thread_scope() {
    assert_eq!(Topic::ThreadTyping("t-9".into()).thread_id(), Some("t-9"));
    assert_eq!(Topic::AllThreads.thread_id(), None);
}

#[test]
fn outbound_payloads_use_camel_case() {
    let msg = OutgoingMessage::new("hello", "t-1").to_json().unwrap();
    assert_eq!(msg, r#"{"content":"hello","threadId":"t-1"}"#);

    let typing = TypingSignal::started("t-1").to_json().unwrap();
    assert_eq!(typing, r#"{"threadId":"t-1","typing":true}"#);
    assert!(!TypingSignal::stopped("t-1").typing);
}

#[test]
fn destinations() {
    assert_eq!(Destination::ChatSend.to_string(), "/app/chat.send");
    assert_eq!(Destination::ChatTyping.as_str(), "/app/chat.typing");
}
