//! Run-length compressed message log.
//!
//! The log lives on the world entity as the [`MessageLog`] component.
//! Reporting the same text twice in a row bumps a counter on the last entry
//! instead of adding a new one, so repeated events render as
//! `"Picked up 3g (x2)"`.

use std::fmt;

use gridkeep_ecs::entity::EntityId;
use serde::{Deserialize, Serialize};

use crate::world_tools::GameWorld;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single entry of the message log. `count` is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub raw_text: String,
    pub count: u32,
}

impl Message {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            count: 1,
        }
    }

    /// The displayed text, with an `(xN)` suffix once repeated.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count > 1 {
            write!(f, "{} (x{})", self.raw_text, self.count)
        } else {
            f.write_str(&self.raw_text)
        }
    }
}

// ---------------------------------------------------------------------------
// MessageLog
// ---------------------------------------------------------------------------

/// Ordered, unbounded sequence of messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text`, folding it into the last entry when that entry
    /// currently renders as exactly `text`.
    pub fn append(&mut self, text: &str) {
        match self.messages.last_mut() {
            Some(last) if last.text() == text => last.count = last.count.saturating_add(1),
            _ => self.messages.push(Message::new(text)),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

// ---------------------------------------------------------------------------
// World helpers
// ---------------------------------------------------------------------------

/// The world's message log, or an empty slice if none has been created.
pub fn get_log(world: &GameWorld) -> &[Message] {
    world
        .get::<MessageLog>(EntityId::WORLD)
        .map(MessageLog::messages)
        .unwrap_or_default()
}

/// Append `text` to the world's message log, creating the log on first use.
pub fn report(world: &mut GameWorld, text: &str) {
    tracing::debug!(text, "report");
    if world.update::<MessageLog, _>(EntityId::WORLD, |log| log.append(text)).is_none() {
        let mut log = MessageLog::new();
        log.append(text);
        world.set(EntityId::WORLD, log);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
