// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn load_config_defaults_without_file() {
    let config = load_config(None, None).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn load_config_reads_file_and_applies_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("helpline.toml");
    fs::write(
        &path,
        "url = \"ws://file.example/ws\"\ntyping_debounce_ms = 500\n",
    )
    .unwrap();

    let from_file = load_config(Some(&path), None).unwrap();
    assert_eq!(from_file.url, "ws://file.example/ws");
    assert_eq!(from_file.typing_debounce_ms, 500);

    let overridden = load_config(Some(&path), Some("wss://cli.example/ws".to_string())).unwrap();
    assert_eq!(overridden.url, "wss://cli.example/ws");
    assert_eq!(overridden.typing_debounce_ms, 500);
}

#[test]
fn load_config_rejects_invalid_override() {
    let err = load_config(None, Some("http://chat.example".to_string())).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

#[test]
fn load_config_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_config(Some(&dir.path().join("absent.toml")), None).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}
