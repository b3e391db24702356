// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hl-core: Shared types for the helpline support chat
//!
//! This crate provides the data model, viewer roles, topic naming and the
//! STOMP frame codec used by the realtime client. It performs no I/O.

pub mod error;
pub mod model;
pub mod protocol;
pub mod stomp;
pub mod viewer;

pub use error::{Error, Result};
pub use model::{
    display_label, ChatMessage, ReservationItem, SupportAgent, ThreadItem, ThreadStatus,
    TypingEvent,
};
pub use protocol::{Destination, OutgoingMessage, Topic, TypingSignal};
pub use stomp::{Command, Frame};
pub use viewer::Viewer;
