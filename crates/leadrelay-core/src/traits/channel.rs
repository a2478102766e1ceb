// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging channel trait (WhatsApp Cloud API and test doubles).

use async_trait::async_trait;

use crate::error::LeadRelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, TemplateMessage};

/// Outbound side of the messaging channel.
///
/// Delivery confirmations arrive asynchronously through the webhook, keyed
/// by the [`MessageId`] returned here.
#[async_trait]
pub trait MessagingChannel: PluginAdapter {
    /// Sends a pre-approved template to open a conversation.
    async fn send_template(
        &self,
        to: &str,
        template: &TemplateMessage,
    ) -> Result<MessageId, LeadRelayError>;

    /// Sends a free-form text reply inside an open conversation.
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageId, LeadRelayError>;
}
