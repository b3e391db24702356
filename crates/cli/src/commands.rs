// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use hl_client::{ChatSession, ClientConfig, ClientError, ClientResult, SessionCommand};
use hl_core::Viewer;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::activity::ActivityLog;
use crate::cli::{Cli, Command};

pub async fn run(cli: Cli) -> ClientResult<()> {
    match cli.command {
        Command::Watch {
            token,
            user_id,
            role,
            thread,
            url,
        } => {
            let config = load_config(cli.config.as_deref(), url)?;
            watch(config, role.viewer(user_id), token, thread).await
        }
        Command::Config { url } => {
            let config = load_config(cli.config.as_deref(), url)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Reads the config file if given, then applies the URL override.
pub fn load_config(path: Option<&Path>, url: Option<String>) -> ClientResult<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = url {
        config.url = url;
    }
    config.validate()?;
    Ok(config)
}

async fn watch(
    config: ClientConfig,
    viewer: Viewer,
    token: String,
    thread: Option<String>,
) -> ClientResult<()> {
    info!(url = %config.url, role = viewer.role_str(), "joining chat");

    let session = ChatSession::new(config)?;
    let mut updates = session.watch();
    let (commands, rx) = mpsc::channel(16);
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(session.run(rx, shutdown.clone()));

    commands
        .send(SessionCommand::Login { viewer, token })
        .await
        .map_err(|_| ClientError::SessionClosed)?;

    let mut log = ActivityLog::default();
    let mut wanted = thread;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!("session ended");
                    break;
                }
                let state = updates.borrow_and_update().clone();
                for line in log.observe(&state) {
                    info!("{}", line);
                }
                let found = wanted.as_deref().and_then(|id| state.thread(id)).cloned();
                if let Some(thread) = found {
                    wanted = None;
                    if commands.send(SessionCommand::SelectThread(thread)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    shutdown.cancel();
    task.await.map_err(|_| ClientError::SessionClosed)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
