// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! STOMP 1.2 frame codec.
//!
//! The broker speaks STOMP over WebSocket text messages. Each message holds
//! one frame:
//!
//! ```text
//! COMMAND
//! header:value
//!
//! body^@
//! ```
//!
//! A message made only of end-of-line characters is a heart-beat.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::protocol::{Destination, Topic};

/// STOMP frame commands used by the chat client and its broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Message,
    Receipt,
    Error,
    Disconnect,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Connected => "CONNECTED",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
            Command::Disconnect => "DISCONNECT",
        }
    }

    /// CONNECT and CONNECTED frames carry raw header values.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Stomp | Command::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CONNECT" => Ok(Command::Connect),
            "STOMP" => Ok(Command::Stomp),
            "CONNECTED" => Ok(Command::Connected),
            "SEND" => Ok(Command::Send),
            "SUBSCRIBE" => Ok(Command::Subscribe),
            "UNSUBSCRIBE" => Ok(Command::Unsubscribe),
            "MESSAGE" => Ok(Command::Message),
            "RECEIPT" => Ok(Command::Receipt),
            "ERROR" => Ok(Command::Error),
            "DISCONNECT" => Ok(Command::Disconnect),
            _ => Err(Error::UnknownCommand(s.to_string())),
        }
    }
}

/// A single STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    /// Headers in wire order. Repeated names are kept; the first one wins.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Frame {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the first value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Opens a session, authenticating with a bearer credential.
    pub fn connect(host: &str, token: &str) -> Self {
        Frame::new(Command::Connect)
            .with_header("accept-version", "1.2")
            .with_header("host", host)
            .with_header("heart-beat", "0,0")
            .with_header("Authorization", format!("Bearer {}", token))
    }

    pub fn subscribe(id: &str, topic: &Topic) -> Self {
        Frame::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", topic.to_string())
            .with_header("ack", "auto")
    }

    pub fn unsubscribe(id: &str) -> Self {
        Frame::new(Command::Unsubscribe).with_header("id", id)
    }

    /// Publishes a JSON body to an application destination.
    pub fn send(destination: Destination, json: impl Into<String>) -> Self {
        Frame::new(Command::Send)
            .with_header("destination", destination.as_str())
            .with_header("content-type", "application/json")
            .with_body(json)
    }

    pub fn disconnect() -> Self {
        Frame::new(Command::Disconnect)
    }

    /// Broker acknowledgement of a CONNECT frame.
    pub fn connected() -> Self {
        Frame::new(Command::Connected).with_header("version", "1.2")
    }

    /// Broker delivery of `body` to a subscription.
    pub fn message(subscription: &str, topic: &Topic, body: impl Into<String>) -> Self {
        Frame::new(Command::Message)
            .with_header("subscription", subscription)
            .with_header("destination", topic.to_string())
            .with_header("content-type", "application/json")
            .with_body(body)
    }

    /// Broker-side failure; the broker closes the session after sending it.
    pub fn error(message: impl Into<String>) -> Self {
        Frame::new(Command::Error).with_header("message", message)
    }

    /// Encodes the frame as a single text payload.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Decodes one frame from a text payload.
    ///
    /// Returns `Ok(None)` for heart-beats.
    pub fn decode(text: &str) -> Result<Option<Frame>> {
        let text = text.trim_start_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }

        let (command_line, mut rest) = next_line(text).ok_or(Error::MissingTerminator)?;
        let command: Command = command_line.parse()?;
        let escaped = command.escapes_headers();

        let mut headers = Vec::new();
        loop {
            let (line, remainder) = next_line(rest).ok_or(Error::MissingTerminator)?;
            rest = remainder;
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::MalformedHeader(line.to_string()))?;
            if escaped {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .map(|(_, v)| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| Error::InvalidContentLength(v.clone()))
            })
            .transpose()?;

        let body = match content_length {
            Some(len) => {
                let body = rest.get(..len).ok_or(Error::MissingTerminator)?;
                if rest.as_bytes().get(len) != Some(&0) {
                    return Err(Error::MissingTerminator);
                }
                body
            }
            None => {
                let end = rest.find('\0').ok_or(Error::MissingTerminator)?;
                &rest[..end]
            }
        };

        Ok(Some(Frame {
            command,
            headers,
            body: body.to_string(),
        }))
    }
}

/// Splits off one line, accepting both `\n` and `\r\n` endings.
fn next_line(text: &str) -> Option<(&str, &str)> {
    let idx = text.find('\n')?;
    let line = &text[..idx];
    Some((line.strip_suffix('\r').unwrap_or(line), &text[idx + 1..]))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some(other) => return Err(Error::InvalidEscape(other)),
            None => return Err(Error::MalformedHeader(raw.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "stomp_tests.rs"]
mod tests;
