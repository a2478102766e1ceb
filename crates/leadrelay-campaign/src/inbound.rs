// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message handling: reply generation, ledger marking, and board sync.

use std::sync::Arc;

use leadrelay_core::types::{BoardList, ContactStatus, MarkOutcome, Turn};
use leadrelay_core::{
    normalize_phone, BoardAdapter, LeadRelayError, MessagingChannel, ResponseGenerator,
    StatusLedger,
};
use tracing::{debug, info, warn};

use crate::classifier::classify;
use crate::conversation::ConversationStore;
use crate::leads::LeadDirectory;

/// Description a new board card starts with.
pub const CARD_DESCRIPTION_HEADER: &str = "Conversation History:\n\n";

/// Result of one handled inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundOutcome {
    pub phone: String,
    pub reply: String,
    pub interested: bool,
}

/// Handles inbound user messages end to end.
pub struct InboundHandler {
    channel: Arc<dyn MessagingChannel + Send + Sync>,
    generator: Arc<dyn ResponseGenerator + Send + Sync>,
    ledger: Arc<dyn StatusLedger + Send + Sync>,
    board: Option<Arc<dyn BoardAdapter + Send + Sync>>,
    sessions: Arc<ConversationStore>,
    directory: Arc<LeadDirectory>,
    persona: String,
    country_code: String,
}

impl InboundHandler {
    pub fn new(
        channel: Arc<dyn MessagingChannel + Send + Sync>,
        generator: Arc<dyn ResponseGenerator + Send + Sync>,
        ledger: Arc<dyn StatusLedger + Send + Sync>,
        persona: String,
        country_code: String,
    ) -> Self {
        Self {
            channel,
            generator,
            ledger,
            board: None,
            sessions: Arc::new(ConversationStore::new()),
            directory: Arc::new(LeadDirectory::new()),
            persona,
            country_code,
        }
    }

    /// Enables board mirroring.
    pub fn with_board(mut self, board: Arc<dyn BoardAdapter + Send + Sync>) -> Self {
        self.board = Some(board);
        self
    }

    /// Shares a lead directory with the scheduler that fills it.
    pub fn with_directory(mut self, directory: Arc<LeadDirectory>) -> Self {
        self.directory = directory;
        self
    }

    pub fn sessions(&self) -> &Arc<ConversationStore> {
        &self.sessions
    }

    pub fn normalize(&self, from: &str) -> String {
        normalize_phone(from, &self.country_code)
    }

    /// Replies to one inbound message from `from`.
    ///
    /// The session lock for the phone is held for the whole exchange. If the
    /// generator fails nothing is recorded and the error is returned. Send,
    /// ledger, and board failures are logged and do not fail the call.
    pub async fn handle_inbound_message(
        &self,
        from: &str,
        text: &str,
    ) -> Result<InboundOutcome, LeadRelayError> {
        let phone = self.normalize(from);
        if phone.is_empty() {
            return Err(LeadRelayError::DataFormat(format!(
                "inbound sender `{from}` has no usable phone number"
            )));
        }
        info!(phone = %phone, "received inbound message");

        let session = self.sessions.session(&phone);
        let mut session = session.lock().await;

        let user_turn = Turn::user(text);
        let history = session.preview(&user_turn);
        let reply = self.generator.generate(&self.persona, &history).await?;
        session.push(user_turn);
        session.push(Turn::assistant(reply.clone()));
        debug!(phone = %phone, turns = session.len(), "conversation updated");

        match self.channel.send_text(&phone, &reply).await {
            Ok(message_id) => debug!(phone = %phone, message_id = %message_id, "reply sent"),
            Err(e) => warn!(phone = %phone, error = %e, "failed to send reply"),
        }

        match self.ledger.mark_contacted(&phone, ContactStatus::Contacted).await {
            Ok(MarkOutcome::Recorded) => info!(phone = %phone, "marked inbound sender as contacted"),
            Ok(MarkOutcome::AlreadyContacted) => {}
            Err(e) => warn!(phone = %phone, error = %e, "failed to persist contact status"),
        }

        let signal = classify(text, &reply);
        let interested = signal.is_interested();
        if interested {
            info!(
                phone = %phone,
                from_user = signal.from_user,
                from_reply = signal.from_reply,
                "lead shows interest"
            );
        }

        if let Some(board) = &self.board {
            let name = self.directory.name_for(&phone);
            if let Err(e) = sync_board(board.as_ref(), &phone, &name, text, &reply, interested).await {
                warn!(phone = %phone, error = %e, "board sync failed");
            }
        }

        Ok(InboundOutcome {
            phone,
            reply,
            interested,
        })
    }
}

/// Mirrors one exchange onto the phone's board card.
///
/// Finds the card whose name contains `phone`, creating `"{name} ({phone})"`
/// when absent, appends the exchange, and moves the card to the leads list
/// when `interested`.
pub async fn sync_board(
    board: &(dyn BoardAdapter + Send + Sync),
    phone: &str,
    name: &str,
    user_text: &str,
    reply: &str,
    interested: bool,
) -> Result<(), LeadRelayError> {
    let card = match board.find_card(phone).await? {
        Some(card) => card,
        None => {
            let card = board
                .create_card(&format!("{name} ({phone})"), CARD_DESCRIPTION_HEADER)
                .await?;
            info!(phone = %phone, card_id = %card.id, "created board card");
            card
        }
    };

    board
        .append_description(&card.id, &format!("User: {user_text}\nAI: {reply}\n\n"))
        .await?;

    if interested {
        board.move_card(&card.id, BoardList::Leads).await?;
        info!(phone = %phone, card_id = %card.id, "moved card to leads list");
    }
    Ok(())
}
