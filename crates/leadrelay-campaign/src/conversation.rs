// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-phone conversation history.
//!
//! Each session keeps a sliding window of the most recent turns. Sessions
//! are held behind a per-phone async lock so one exchange (generate, send,
//! record) completes before the next one for the same phone begins.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use leadrelay_core::types::Turn;
use tokio::sync::Mutex;

/// Maximum number of turns kept per phone.
pub const MAX_TURNS: usize = 10;

/// Bounded turn history for one phone.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    turns: VecDeque<Turn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn, dropping the oldest ones past [`MAX_TURNS`].
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > MAX_TURNS {
            self.turns.pop_front();
        }
    }

    /// History as it would look after appending `turn`, without committing it.
    pub fn preview(&self, turn: &Turn) -> Vec<Turn> {
        let skip = (self.turns.len() + 1).saturating_sub(MAX_TURNS);
        self.turns
            .iter()
            .chain(std::iter::once(turn))
            .skip(skip)
            .cloned()
            .collect()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// All live sessions, keyed by normalized phone. Lost on restart.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: DashMap<String, Arc<Mutex<ConversationSession>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session for `phone`, created empty on first use.
    pub fn session(&self, phone: &str) -> Arc<Mutex<ConversationSession>> {
        self.sessions
            .entry(phone.to_string())
            .or_default()
            .value()
            .clone()
    }

    pub async fn history(&self, phone: &str) -> Vec<Turn> {
        let Some(session) = self.sessions.get(phone).map(|s| s.value().clone()) else {
            return Vec::new();
        };
        let guard = session.lock().await;
        guard.turns()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
