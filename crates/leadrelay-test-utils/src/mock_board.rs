// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory board for testing card sync.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadrelay_core::traits::adapter::PluginAdapter;
use leadrelay_core::traits::board::BoardAdapter;
use leadrelay_core::types::{AdapterType, BoardCard, BoardList, HealthStatus};
use leadrelay_core::LeadRelayError;

/// A card plus the list it currently sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCard {
    pub card: BoardCard,
    pub list: BoardList,
}

pub struct MockBoard {
    cards: Arc<Mutex<Vec<MockCard>>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            cards: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn cards(&self) -> Vec<MockCard> {
        self.cards.lock().await.clone()
    }

    /// The card whose name contains `identifier`.
    pub async fn card_for(&self, identifier: &str) -> Option<MockCard> {
        self.cards
            .lock()
            .await
            .iter()
            .find(|c| c.card.name.contains(identifier))
            .cloned()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBoard {
    fn name(&self) -> &str {
        "mock-board"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Board
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl BoardAdapter for MockBoard {
    async fn find_card(&self, identifier: &str) -> Result<Option<BoardCard>, LeadRelayError> {
        Ok(self.card_for(identifier).await.map(|c| c.card))
    }

    async fn create_card(
        &self,
        name: &str,
        description: &str,
    ) -> Result<BoardCard, LeadRelayError> {
        let mut cards = self.cards.lock().await;
        let card = BoardCard {
            id: format!("card-{}", cards.len() + 1),
            name: name.to_string(),
            description: description.to_string(),
        };
        cards.push(MockCard {
            card: card.clone(),
            list: BoardList::Incoming,
        });
        Ok(card)
    }

    async fn append_description(&self, card_id: &str, text: &str) -> Result<(), LeadRelayError> {
        let mut cards = self.cards.lock().await;
        let card = cards
            .iter_mut()
            .find(|c| c.card.id == card_id)
            .ok_or_else(|| LeadRelayError::board(format!("no card {card_id}")))?;
        card.card.description.push_str(text);
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list: BoardList) -> Result<(), LeadRelayError> {
        let mut cards = self.cards.lock().await;
        let card = cards
            .iter_mut()
            .find(|c| c.card.id == card_id)
            .ok_or_else(|| LeadRelayError::board(format!("no card {card_id}")))?;
        card.list = list;
        Ok(())
    }
}
