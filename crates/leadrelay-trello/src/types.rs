// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trello REST wire types.

use leadrelay_core::types::BoardCard;
use serde::{Deserialize, Serialize};

/// Card as returned by the cards endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "idList", default)]
    pub id_list: Option<String>,
}

impl From<CardDto> for BoardCard {
    fn from(card: CardDto) -> Self {
        BoardCard {
            id: card.id,
            name: card.name,
            description: card.desc,
        }
    }
}

/// Body of `POST /cards`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCard<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    #[serde(rename = "idList")]
    pub id_list: &'a str,
    pub pos: &'static str,
}

/// Body of `PUT /cards/{id}`; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<&'a str>,
    #[serde(rename = "idList", skip_serializing_if = "Option::is_none")]
    pub id_list: Option<&'a str>,
}

/// Entry of `GET /members/me/boards`.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_skips_unset_fields() {
        let update = CardUpdate {
            id_list: Some("leads"),
            ..CardUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"idList": "leads"})
        );
    }

    #[test]
    fn card_converts_to_board_card() {
        let dto: CardDto = serde_json::from_value(serde_json::json!({
            "id": "c1", "name": "Anna (491701234567)", "desc": "Conversation History:\n\n", "idList": "in"
        }))
        .unwrap();
        let card = BoardCard::from(dto);
        assert_eq!(card.name, "Anna (491701234567)");
        assert_eq!(card.description, "Conversation History:\n\n");
    }
}
