// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trello board adapter for leadrelay.
//!
//! Each conversation is mirrored into one card named `"{name} ({phone})"`.
//! New cards land at the top of the incoming list; interested leads are
//! moved to the leads list.

pub mod client;
pub mod types;

use async_trait::async_trait;
use leadrelay_config::model::TrelloConfig;
use leadrelay_config::resolve_secret;
use leadrelay_core::traits::{BoardAdapter, PluginAdapter};
use leadrelay_core::types::{AdapterType, BoardCard, BoardList, HealthStatus};
use leadrelay_core::LeadRelayError;
use reqwest::Method;
use tracing::{debug, info};

use crate::client::TrelloClient;
use crate::types::{BoardDto, CardDto, CardUpdate, NewCard};

/// Fully resolved board settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrelloSettings {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
    pub incoming_list_id: String,
    pub leads_list_id: String,
}

impl TrelloSettings {
    /// Resolves every field from config or its `TRELLO_*` variable.
    ///
    /// Returns the names of the unresolved fields when any is missing.
    pub fn resolve(config: &TrelloConfig) -> Result<Self, Vec<&'static str>> {
        let fields = [
            ("api_key", resolve_secret(&config.api_key, "TRELLO_API_KEY")),
            ("token", resolve_secret(&config.token, "TRELLO_TOKEN")),
            ("board_id", resolve_secret(&config.board_id, "TRELLO_BOARD_ID")),
            (
                "incoming_list_id",
                resolve_secret(&config.incoming_list_id, "TRELLO_INCOMING_LIST_ID"),
            ),
            (
                "leads_list_id",
                resolve_secret(&config.leads_list_id, "TRELLO_LEADS_LIST_ID"),
            ),
        ];
        let missing: Vec<_> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }
        let [api_key, token, board_id, incoming_list_id, leads_list_id] =
            fields.map(|(_, value)| value.unwrap_or_default());
        Ok(Self {
            api_key,
            token,
            board_id,
            incoming_list_id,
            leads_list_id,
        })
    }
}

/// Board adapter backed by the Trello REST API.
pub struct TrelloBoard {
    client: TrelloClient,
    board_id: String,
    incoming_list_id: String,
    leads_list_id: String,
}

impl TrelloBoard {
    pub fn new(settings: TrelloSettings, base_url: &str) -> Result<Self, LeadRelayError> {
        let client = TrelloClient::new(settings.api_key, settings.token, base_url)?;
        Ok(Self {
            client,
            board_id: settings.board_id,
            incoming_list_id: settings.incoming_list_id,
            leads_list_id: settings.leads_list_id,
        })
    }

    /// Builds the board when every credential and id resolves.
    ///
    /// Returns `Ok(None)` when board sync is not configured.
    pub fn from_config(config: &TrelloConfig) -> Result<Option<Self>, LeadRelayError> {
        match TrelloSettings::resolve(config) {
            Ok(settings) => {
                info!(board_id = %settings.board_id, "Trello board sync enabled");
                Self::new(settings, &config.api_base_url).map(Some)
            }
            Err(missing) => {
                info!(missing = ?missing, "Trello board sync disabled");
                Ok(None)
            }
        }
    }

    #[cfg(test)]
    fn with_client(client: TrelloClient) -> Self {
        Self {
            client,
            board_id: "board".into(),
            incoming_list_id: "incoming".into(),
            leads_list_id: "leads".into(),
        }
    }

    fn list_id(&self, list: BoardList) -> &str {
        match list {
            BoardList::Incoming => &self.incoming_list_id,
            BoardList::Leads => &self.leads_list_id,
        }
    }

    async fn update_card(&self, card_id: &str, update: &CardUpdate<'_>) -> Result<(), LeadRelayError> {
        let _: CardDto = self
            .client
            .send(Method::PUT, &format!("cards/{card_id}"), update)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for TrelloBoard {
    fn name(&self) -> &str {
        "trello"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Board
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadRelayError> {
        let boards: Vec<BoardDto> = match self
            .client
            .get("members/me/boards", &[("fields", "name")])
            .await
        {
            Ok(boards) => boards,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        match boards.iter().find(|b| b.id == self.board_id) {
            Some(board) => {
                info!(board = %board.name, "Trello credentials verified");
                Ok(HealthStatus::Healthy)
            }
            None => Ok(HealthStatus::Degraded(format!(
                "board {} is not visible to this token",
                self.board_id
            ))),
        }
    }
}

#[async_trait]
impl BoardAdapter for TrelloBoard {
    async fn find_card(&self, identifier: &str) -> Result<Option<BoardCard>, LeadRelayError> {
        let cards: Vec<CardDto> = self
            .client
            .get(
                &format!("boards/{}/cards", self.board_id),
                &[("fields", "name,desc,idList")],
            )
            .await?;
        Ok(cards
            .into_iter()
            .find(|card| card.name.contains(identifier))
            .map(BoardCard::from))
    }

    async fn create_card(&self, name: &str, description: &str) -> Result<BoardCard, LeadRelayError> {
        let card: CardDto = self
            .client
            .send(
                Method::POST,
                "cards",
                &NewCard {
                    name,
                    desc: description,
                    id_list: &self.incoming_list_id,
                    pos: "top",
                },
            )
            .await?;
        info!(card_id = %card.id, name, "created board card");
        Ok(card.into())
    }

    async fn append_description(&self, card_id: &str, text: &str) -> Result<(), LeadRelayError> {
        let card: CardDto = self
            .client
            .get(&format!("cards/{card_id}"), &[("fields", "desc")])
            .await?;
        let desc = format!("{}{text}", card.desc);
        self.update_card(
            card_id,
            &CardUpdate {
                desc: Some(&desc),
                ..CardUpdate::default()
            },
        )
        .await?;
        debug!(card_id, "updated card conversation");
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list: BoardList) -> Result<(), LeadRelayError> {
        self.update_card(
            card_id,
            &CardUpdate {
                id_list: Some(self.list_id(list)),
                ..CardUpdate::default()
            },
        )
        .await?;
        info!(card_id, list = ?list, "moved board card");
        Ok(())
    }
}
