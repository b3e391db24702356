// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! helpline: command-line client for the helpline support chat.
//!
//! `helpline watch` joins the realtime feed as a customer or an agent and
//! logs thread, message and typing activity until interrupted.

pub mod activity;
pub mod cli;
pub mod commands;

pub use activity::ActivityLog;
pub use cli::{Cli, Command, Role};
pub use commands::{load_config, run};
