// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Driving a running session together with the REST collaborator.
//!
//! A [`SessionHandle`] sends commands to a [`ChatSession::run`] loop and
//! performs the REST calls whose results feed it. Successful results are
//! forwarded as commands; failures become an
//! [`SessionCommand::OperationFailed`] notice and are returned to the
//! caller. Nothing is retried.

use hl_core::{ThreadItem, Viewer};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::api::{ApiFuture, Operation, SupportApi};
use crate::error::{ClientError, ClientResult};
use crate::session::{ChatSession, SessionCommand};
use crate::state::ChatState;
use crate::transport::Transport;
use crate::view::{first_visible, ThreadFilter};

/// Command queue depth between handles and the session loop.
const COMMAND_BUFFER: usize = 64;

/// Caller-side handle to a running chat session.
pub struct SessionHandle<A: SupportApi> {
    commands: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<ChatState>,
    api: A,
    viewer: Option<Viewer>,
}

impl<A: SupportApi> SessionHandle<A> {
    pub fn new(
        commands: mpsc::Sender<SessionCommand>,
        state: watch::Receiver<ChatState>,
        api: A,
    ) -> Self {
        SessionHandle {
            commands,
            state,
            api,
            viewer: None,
        }
    }

    /// Starts `session` on its own task and returns a handle to it.
    pub fn spawn<T>(
        session: ChatSession<T>,
        api: A,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>)
    where
        T: Transport + 'static,
    {
        let state = session.watch();
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(session.run(rx, shutdown));
        (SessionHandle::new(tx, state, api), task)
    }

    /// Latest published state.
    pub fn state(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// A receiver for state changes.
    pub fn watch(&self) -> watch::Receiver<ChatState> {
        self.state.clone()
    }

    /// The viewer this handle signed in as.
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    /// Signs in and loads the initial data.
    ///
    /// Selects the first thread of the filtered list. Customers also get
    /// their reservations, support agents the transfer targets. Only a
    /// failed thread listing fails the login.
    pub async fn login(&mut self, viewer: Viewer, token: String) -> ClientResult<()> {
        self.viewer = Some(viewer.clone());
        self.send(SessionCommand::Login {
            viewer: viewer.clone(),
            token,
        })
        .await?;

        // A viewer switch resets the filter; read it only once the session
        // has taken the new viewer.
        self.state
            .wait_for(|s| s.viewer.as_ref() == Some(&viewer))
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        let filter = self.state.borrow().filter;

        let threads = self
            .call(Operation::ListThreads, self.api.list_threads())
            .await?;
        let first = first_visible_for(&viewer, &threads, filter);
        self.send(SessionCommand::ThreadsLoaded(threads)).await?;
        if let Some(first) = first {
            self.select_thread(first).await?;
        }

        let secondary = match viewer {
            Viewer::Client { .. } => self.load_reservations().await,
            Viewer::Support { .. } => self.load_agents().await,
        };
        if let Err(e) = secondary {
            warn!(error = %e, "login data incomplete");
        }
        Ok(())
    }

    pub async fn logout(&mut self) -> ClientResult<()> {
        self.viewer = None;
        self.send(SessionCommand::Logout).await
    }

    pub async fn connect(&self) -> ClientResult<()> {
        self.send(SessionCommand::Connect).await
    }

    pub async fn disconnect(&self) -> ClientResult<()> {
        self.send(SessionCommand::Disconnect).await
    }

    /// Selects `thread` and loads its history.
    pub async fn select_thread(&self, thread: ThreadItem) -> ClientResult<()> {
        let thread_id = thread.id.clone();
        self.send(SessionCommand::SelectThread(thread)).await?;
        self.load_history(thread_id).await
    }

    /// Reloads history of the selected thread, e.g. after a reconnect.
    pub async fn reload_history(&self) -> ClientResult<()> {
        let selected = self.state.borrow().selected_id().map(str::to_string);
        match selected {
            Some(thread_id) => self.load_history(thread_id).await,
            None => Ok(()),
        }
    }

    pub async fn typing_input(&self) -> ClientResult<()> {
        self.send(SessionCommand::TypingInput).await
    }

    pub async fn send_message(&self, content: impl Into<String>) -> ClientResult<()> {
        self.send(SessionCommand::SendMessage(content.into())).await
    }

    pub async fn set_filter(&self, filter: ThreadFilter) -> ClientResult<()> {
        self.send(SessionCommand::SetFilter(filter)).await
    }

    /// Opens a ticket as a customer and selects it.
    pub async fn create_ticket(
        &self,
        subject: &str,
        reservation_id: Option<&str>,
    ) -> ClientResult<ThreadItem> {
        match &self.viewer {
            Some(Viewer::Client { .. }) => {}
            _ => return Err(ClientError::NotAllowed("only customers can open tickets")),
        }
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ClientError::InvalidInput("subject is required".to_string()));
        }
        let reservation_id = reservation_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let thread = self
            .call(
                Operation::CreateThread,
                self.api.create_thread(subject.to_string(), reservation_id),
            )
            .await?;
        self.send(SessionCommand::ThreadChanged(thread.clone()))
            .await?;
        self.select_thread(thread.clone()).await?;
        Ok(thread)
    }

    /// Closes a ticket assigned to the signed-in agent.
    pub async fn close_ticket(&self, thread_id: &str) -> ClientResult<ThreadItem> {
        self.require_assignee(thread_id, "only the assigned agent can close a ticket")?;
        let thread = self
            .call(
                Operation::CloseThread,
                self.api.close_thread(thread_id.to_string()),
            )
            .await?;
        self.send(SessionCommand::ThreadChanged(thread.clone()))
            .await?;
        Ok(thread)
    }

    /// Claims a ticket for the signed-in agent.
    pub async fn claim_ticket(&self, thread_id: &str) -> ClientResult<ThreadItem> {
        if !self.viewer.as_ref().is_some_and(Viewer::is_support) {
            return Err(ClientError::NotAllowed("only support agents can claim tickets"));
        }
        let thread = self
            .call(
                Operation::ClaimThread,
                self.api.claim_thread(thread_id.to_string()),
            )
            .await?;
        self.send(SessionCommand::ThreadChanged(thread.clone()))
            .await?;
        Ok(thread)
    }

    /// Hands a ticket over to another agent.
    ///
    /// The returned record is merged like a pushed update, so the ticket
    /// leaves this agent's list.
    pub async fn transfer_ticket(
        &self,
        thread_id: &str,
        target_user_id: &str,
    ) -> ClientResult<ThreadItem> {
        let target = target_user_id.trim();
        if target.is_empty() {
            return Err(ClientError::InvalidInput(
                "transfer target is required".to_string(),
            ));
        }
        self.require_assignee(thread_id, "only the assigned agent can transfer a ticket")?;
        let thread = self
            .call(
                Operation::TransferThread,
                self.api
                    .transfer_thread(thread_id.to_string(), target.to_string()),
            )
            .await?;
        self.send(SessionCommand::ThreadChanged(thread.clone()))
            .await?;
        Ok(thread)
    }

    async fn load_history(&self, thread_id: String) -> ClientResult<()> {
        let messages = self
            .call(
                Operation::LoadMessages,
                self.api.load_messages(thread_id.clone()),
            )
            .await?;
        self.send(SessionCommand::HistoryLoaded {
            thread_id,
            messages,
        })
        .await
    }

    async fn load_reservations(&self) -> ClientResult<()> {
        let reservations = self
            .call(Operation::ListReservations, self.api.list_reservations())
            .await?;
        self.send(SessionCommand::ReservationsLoaded(reservations))
            .await
    }

    async fn load_agents(&self) -> ClientResult<()> {
        let agents = self
            .call(Operation::ListSupportAgents, self.api.list_support_agents())
            .await?;
        self.send(SessionCommand::AgentsLoaded(agents)).await
    }

    fn require_assignee(&self, thread_id: &str, denied: &'static str) -> ClientResult<()> {
        let Some(viewer) = self.viewer.as_ref().filter(|v| v.is_support()) else {
            return Err(ClientError::NotAllowed(denied));
        };
        let state = self.state.borrow();
        let thread = state
            .thread(thread_id)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown thread: {}", thread_id)))?;
        if !thread.is_assigned_to(viewer.user_id()) {
            return Err(ClientError::NotAllowed(denied));
        }
        Ok(())
    }

    async fn call<R>(&self, operation: Operation, request: ApiFuture<'_, R>) -> ClientResult<R> {
        match request.await {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(operation = %operation, error = %e, "request failed");
                self.send(SessionCommand::OperationFailed(operation))
                    .await?;
                Err(ClientError::OperationFailed(operation))
            }
        }
    }

    async fn send(&self, command: SessionCommand) -> ClientResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::SessionClosed)
    }
}

fn first_visible_for(
    viewer: &Viewer,
    threads: &[ThreadItem],
    filter: ThreadFilter,
) -> Option<ThreadItem> {
    let visible: Vec<ThreadItem> = threads
        .iter()
        .filter(|t| viewer.can_see(t))
        .cloned()
        .collect();
    first_visible(&visible, filter).cloned()
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
