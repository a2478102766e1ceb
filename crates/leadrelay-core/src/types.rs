// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters, the campaign engine, and the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier assigned by the messaging channel to a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Board,
}

// --- Leads ---

/// Delivery progress of the opener sent to a lead during the current cycle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    /// Nothing sent yet.
    #[default]
    None,
    /// Accepted by the channel, waiting for a delivery callback.
    Pending,
    Delivered,
    Failed,
}

/// A contact imported from the lead source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    /// Normalized digit string, used as the key everywhere.
    pub phone: String,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
}

impl Lead {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            message_id: None,
            delivery_status: DeliveryStatus::None,
        }
    }
}

// --- Status ledger ---

/// Contact status recorded in the status ledger.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContactStatus {
    /// Marked right before the opener is sent.
    Initiated,
    /// The channel accepted the opener.
    Sent,
    /// The send failed or the channel reported a delivery failure.
    Failed,
    /// The channel confirmed delivery.
    Delivered,
    /// Marked from an inbound reply, without an outbound campaign send.
    Contacted,
    /// Status string not recognized when reading an older document.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One value in the status ledger document, keyed by phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub contacted: bool,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// A freshly contacted entry stamped with the current time.
    pub fn contacted_now(status: ContactStatus) -> Self {
        Self {
            contacted: true,
            status,
            timestamp: Some(Utc::now()),
        }
    }
}

/// Result of a `mark_contacted` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The phone was not contacted before and is now recorded.
    Recorded,
    /// The phone was already contacted; nothing changed.
    AlreadyContacted,
}

// --- Conversations ---

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One exchanged message in a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// --- Messaging ---

/// A pre-approved template message used to open a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMessage {
    /// Template name registered with the messaging provider.
    pub name: String,
    /// Language code of the template (e.g. `en`).
    pub language: String,
    /// Optional image shown in the template header.
    pub header_image_url: Option<String>,
    /// Positional body parameters, usually just the lead's name.
    pub body_parameters: Vec<String>,
}

/// How an inbound message was produced on the user's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InboundKind {
    Text,
    /// Quick-reply or interactive button press.
    Button,
    /// Interactive list selection.
    List,
}

/// A user message received through the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Channel-assigned id of the inbound message.
    pub id: String,
    /// Sender phone as reported by the channel (not yet normalized).
    pub from: String,
    pub text: String,
    pub kind: InboundKind,
}

/// Status value carried by a delivery callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryReport {
    Sent,
    Delivered,
    Read,
    Failed,
    Other(String),
}

impl DeliveryReport {
    /// Parses the status string used by the messaging channel.
    pub fn parse(status: &str) -> Self {
        match status {
            "sent" => Self::Sent,
            "delivered" => Self::Delivered,
            "read" => Self::Read,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => f.write_str("sent"),
            Self::Delivered => f.write_str("delivered"),
            Self::Read => f.write_str("read"),
            Self::Failed => f.write_str("failed"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// An asynchronous delivery callback for a previously sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub message_id: MessageId,
    pub status: DeliveryReport,
    pub recipient_id: Option<String>,
}

/// A single event extracted from a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Inbound(InboundMessage),
    Status(StatusEvent),
}

// --- Board ---

/// A card on the external board, one per phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Lists a card can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BoardList {
    /// New conversations land here.
    Incoming,
    /// Leads that showed interest.
    Leads,
}

// --- Campaign ---

/// Snapshot of the campaign counters for the current cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub initiated: u64,
    pub delivered: u64,
    pub pending: u64,
    pub failed: u64,
}
