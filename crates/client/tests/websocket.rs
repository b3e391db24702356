// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests for the WebSocket transport.
//!
//! A minimal in-process STOMP broker accepts one connection, answers the
//! handshake, tracks subscriptions and echoes published chat messages back
//! to the thread topic.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use hl_client::{ChatSession, ChatState, ClientConfig, ClientError, ConnectionState, SessionCommand};
use hl_core::{
    ChatMessage, Command, Frame, OutgoingMessage, ThreadItem, ThreadStatus, Topic, Viewer,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "valid-token";

async fn spawn_broker() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve(stream).await;
    });
    format!("ws://{}/ws", addr)
}

async fn serve(stream: tokio::net::TcpStream) {
    let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let (mut sink, mut source) = ws.split();
    let mut subscriptions: HashMap<String, String> = HashMap::new();

    while let Some(Ok(message)) = source.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Some(frame) = Frame::decode(&text).unwrap() else {
            continue;
        };
        let reply = match frame.command {
            Command::Connect => {
                if frame.header("Authorization") == Some(format!("Bearer {}", TOKEN).as_str()) {
                    Some(Frame::connected())
                } else {
                    Some(Frame::error("invalid credential"))
                }
            }
            Command::Subscribe => {
                let destination = frame.header("destination").unwrap().to_string();
                let id = frame.header("id").unwrap().to_string();
                subscriptions.insert(destination, id);
                None
            }
            Command::Unsubscribe => {
                let id = frame.header("id").unwrap();
                subscriptions.retain(|_, live| live != id);
                None
            }
            Command::Send if frame.header("destination") == Some("/app/chat.send") => {
                let outgoing: OutgoingMessage = serde_json::from_str(&frame.body).unwrap();
                let topic = Topic::ThreadMessages(outgoing.thread_id.clone());
                subscriptions.get(&topic.to_string()).map(|id| {
                    let echoed = ChatMessage {
                        content: outgoing.content,
                        sent_at: "2026-03-01T10:00:00Z".to_string(),
                        thread_id: outgoing.thread_id,
                        sender_user_id: "user-1".to_string(),
                        sender_name: Some("Alice".to_string()),
                        sender_email: None,
                    };
                    Frame::message(id, &topic, serde_json::to_string(&echoed).unwrap())
                })
            }
            Command::Disconnect => break,
            _ => None,
        };
        if let Some(reply) = reply {
            sink.send(Message::Text(reply.encode().into())).await.unwrap();
        }
    }
}

fn config(url: String) -> ClientConfig {
    ClientConfig {
        url,
        ..ClientConfig::default()
    }
}

fn ticket(id: &str) -> ThreadItem {
    ThreadItem {
        id: id.to_string(),
        subject: "Late pickup".to_string(),
        status: ThreadStatus::Open,
        created_at: "2026-03-01T09:00:00Z".to_string(),
        created_by_user_id: "user-1".to_string(),
        created_by_name: None,
        created_by_email: None,
        reservation_id: None,
        assigned_support_user_id: None,
        assigned_support_name: None,
        assigned_support_email: None,
    }
}

async fn wait_until(rx: &mut watch::Receiver<ChatState>, predicate: impl FnMut(&ChatState) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("session stopped");
}

#[tokio::test]
async fn message_round_trip_over_websocket() {
    let url = spawn_broker().await;
    let session = ChatSession::new(config(url)).unwrap();
    let mut state = session.watch();
    let (tx, rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(session.run(rx, shutdown.clone()));

    tx.send(SessionCommand::Login {
        viewer: Viewer::client("user-1"),
        token: TOKEN.to_string(),
    })
    .await
    .unwrap();
    wait_until(&mut state, |s| s.connection == ConnectionState::Connected).await;

    tx.send(SessionCommand::SelectThread(ticket("t1")))
        .await
        .unwrap();
    tx.send(SessionCommand::SendMessage("  where is my car?  ".to_string()))
        .await
        .unwrap();

    wait_until(&mut state, |s| s.messages.len() == 1).await;
    let received = state.borrow().messages[0].clone();
    assert_eq!(received.content, "where is my car?");
    assert_eq!(received.sender_label(), "Alice");

    shutdown.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn invalid_credential_is_rejected() {
    let url = spawn_broker().await;
    let mut session = ChatSession::new(config(url)).unwrap();

    let err = session
        .login(Viewer::client("user-1"), "wrong".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected(ref m) if m == "invalid credential"));
    assert_eq!(session.state().connection, ConnectionState::Disconnected);
    assert!(session.reconnect_at().is_none());
}

#[tokio::test]
async fn unreachable_broker_schedules_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    drop(listener);
    let mut session = ChatSession::new(config(url)).unwrap();

    let err = session
        .login(Viewer::support("s1"), TOKEN.to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(session.reconnect_at().is_some());
}
