// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board collaborator trait (kanban-style card mirroring).

use async_trait::async_trait;

use crate::error::LeadRelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BoardCard, BoardList};

/// Mirrors conversations into cards, one card per phone.
#[async_trait]
pub trait BoardAdapter: PluginAdapter {
    /// Finds the card whose name contains `identifier`.
    async fn find_card(&self, identifier: &str) -> Result<Option<BoardCard>, LeadRelayError>;

    /// Creates a card in the incoming list.
    async fn create_card(&self, name: &str, description: &str)
    -> Result<BoardCard, LeadRelayError>;

    /// Appends `text` to the card description.
    async fn append_description(&self, card_id: &str, text: &str) -> Result<(), LeadRelayError>;

    /// Moves the card to another list.
    async fn move_card(&self, card_id: &str, list: BoardList) -> Result<(), LeadRelayError>;
}
