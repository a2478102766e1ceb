// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generator trait for LLM integrations.

use async_trait::async_trait;

use crate::error::LeadRelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Turn;

/// Produces the assistant's next reply for a conversation.
#[async_trait]
pub trait ResponseGenerator: PluginAdapter {
    /// Generates a single reply from the persona preamble and the ordered
    /// turn history (oldest first, ending with the user's latest turn).
    async fn generate(&self, persona: &str, history: &[Turn]) -> Result<String, LeadRelayError>;
}
