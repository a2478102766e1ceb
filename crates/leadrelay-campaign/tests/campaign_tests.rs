// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the campaign engine against mock adapters.

use std::time::Duration;

use leadrelay_campaign::dispatcher::WORKER_QUEUE_DEPTH;
use leadrelay_campaign::{EventDispatcher, TrackOutcome, MAX_TURNS};
use leadrelay_core::types::{
    BoardList, ContactStatus, InboundKind, InboundMessage, Role, WebhookEvent,
};
use leadrelay_core::StatusLedger;
use leadrelay_test_utils::{SentMessage, TestHarness};

fn five_leads() -> leadrelay_test_utils::harness::TestHarnessBuilder {
    TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .with_lead("Bob", "0049-170-7654321")
        .with_lead("Carl", "0170 1111111")
        .with_lead("Dora", "0170 2222222")
        .with_lead("Emil", "0170 3333333")
}

#[tokio::test]
async fn caps_of_two_send_exactly_two() {
    let harness = five_leads().with_caps(2, 2).build().await.unwrap();

    let stats = harness.run_campaign().await.unwrap();

    assert_eq!(harness.channel.templates().await.len(), 2);
    assert_eq!(stats.initiated, 2);
    assert_eq!(stats.pending, 2);
    assert!(harness.is_contacted("491701234567").await);
    assert!(harness.is_contacted("491707654321").await);
    assert!(!harness.is_contacted("491701111111").await);
}

#[tokio::test]
async fn opener_is_personalised_template() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .build()
        .await
        .unwrap();

    harness.run_campaign().await.unwrap();

    match &harness.channel.templates().await[0] {
        SentMessage::Template { to, template, .. } => {
            assert_eq!(to, "491701234567");
            assert_eq!(template.name, "opener2");
            assert_eq!(template.language, "en");
            assert_eq!(template.body_parameters, vec!["Anna".to_string()]);
        }
        other => panic!("expected template, got {other:?}"),
    }
}

#[tokio::test]
async fn send_failure_is_isolated_and_recorded() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .with_lead("Bob", "0049-170-7654321")
        .build()
        .await
        .unwrap();
    harness.channel.fail_for("491707654321").await;

    let stats = harness.run_campaign().await.unwrap();

    assert_eq!(stats.initiated, 2);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.failed, 1);
    let entries = harness.ledger.snapshot().await;
    assert_eq!(entries["491701234567"].status, ContactStatus::Sent);
    assert_eq!(entries["491707654321"].status, ContactStatus::Failed);
    assert!(entries["491707654321"].contacted);
}

#[tokio::test]
async fn ledger_write_failure_still_sends_and_counts_pending() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .with_unwritable_ledger()
        .build()
        .await
        .unwrap();

    let stats = harness.run_campaign().await.unwrap();

    assert_eq!(harness.channel.templates().await.len(), 1);
    assert_eq!(stats.initiated, 1);
    assert_eq!(stats.pending, 1);
    assert!(harness.is_contacted("491701234567").await);
    assert!(!harness.ledger.path().exists());

    harness.channel.clear_sent().await;
    harness.run_campaign().await.unwrap();
    assert!(harness.channel.templates().await.is_empty());
}

#[tokio::test]
async fn second_run_does_not_recontact() {
    let harness = five_leads().with_caps(2, 2).build().await.unwrap();

    harness.run_campaign().await.unwrap();
    harness.channel.clear_sent().await;
    harness.run_campaign().await.unwrap();

    let second: Vec<String> = harness
        .channel
        .templates()
        .await
        .iter()
        .map(|m| m.to().to_string())
        .collect();
    assert_eq!(second, ["491701111111", "491702222222"]);
}

#[tokio::test]
async fn delivery_callbacks_settle_the_campaign() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .with_lead("Bob", "0049-170-7654321")
        .with_settle_timeout(Duration::from_secs(5))
        .build()
        .await
        .unwrap();

    let runner = {
        let driver = harness.driver.clone();
        let state = harness.state.clone();
        let import = harness.import_leads().await.unwrap();
        tokio::spawn(async move {
            state.begin_cycle(import.leads).await;
            driver
                .initiate_conversations(&tokio_util::sync::CancellationToken::new())
                .await
        })
    };

    let mut stats_rx = harness.state.subscribe();
    stats_rx
        .wait_for(|s| s.pending == 2)
        .await
        .expect("sends should complete");

    let ids: Vec<_> = harness
        .channel
        .templates()
        .await
        .iter()
        .map(|m| m.message_id().clone())
        .collect();
    assert_eq!(harness.report(&ids[0], "delivered").await, TrackOutcome::Delivered);
    assert_eq!(harness.report(&ids[1], "failed").await, TrackOutcome::Failed);

    let stats = runner.await.unwrap();
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(
        harness.ledger.snapshot().await["491701234567"].status,
        ContactStatus::Delivered
    );
}

#[tokio::test]
async fn out_of_order_callbacks_keep_delivered_bounded() {
    let harness = five_leads().build().await.unwrap();
    harness.run_campaign().await.unwrap();
    let ids: Vec<_> = harness
        .channel
        .templates()
        .await
        .iter()
        .map(|m| m.message_id().clone())
        .collect();

    for id in ids.iter().rev() {
        harness.report(id, "delivered").await;
        harness.report(id, "failed").await;
        harness.report(id, "delivered").await;
    }

    let stats = harness.state.stats();
    assert_eq!(stats.delivered, 5);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.failed, 0);
    assert!(stats.delivered <= stats.initiated);
}

#[tokio::test]
async fn booking_request_moves_card_to_leads() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .with_mock_responses(vec!["Great, which day works for you?".into()])
        .build()
        .await
        .unwrap();
    harness.run_campaign().await.unwrap();

    let outcome = harness
        .receive("491701234567", "I'd like to book a consultation")
        .await
        .unwrap();

    assert!(outcome.interested);
    assert_eq!(
        harness.channel.texts_to("491701234567").await,
        vec!["Great, which day works for you?"]
    );
    let card = harness.board.card_for("491701234567").await.unwrap();
    assert_eq!(card.card.name, "Anna (491701234567)");
    assert_eq!(card.list, BoardList::Leads);
    assert_eq!(
        card.card.description,
        "Conversation History:\n\nUser: I'd like to book a consultation\nAI: Great, which day works for you?\n\n"
    );
}

#[tokio::test]
async fn uninterested_reply_stays_in_incoming() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Hi! This is Lisa.".into(), "Sure.".into()])
        .build()
        .await
        .unwrap();

    harness.receive("+1 555 0100", "who is this?").await.unwrap();
    harness.receive("+1 555 0100", "ok thanks").await.unwrap();

    let cards = harness.board.cards().await;
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].card.name, "WhatsApp User (4915550100)");
    assert_eq!(cards[0].list, BoardList::Incoming);
    assert!(cards[0].card.description.ends_with("User: ok thanks\nAI: Sure.\n\n"));
}

#[tokio::test]
async fn inbound_marks_sender_contacted() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .build()
        .await
        .unwrap();

    harness.receive("491701234567", "hello").await.unwrap();

    let entry = harness.ledger.snapshot().await["491701234567"].clone();
    assert!(entry.contacted);
    assert_eq!(entry.status, ContactStatus::Contacted);
    assert!(harness.import_leads().await.unwrap().leads.is_empty());
}

#[tokio::test]
async fn history_never_exceeds_window() {
    let harness = TestHarness::builder().without_board().build().await.unwrap();

    for i in 0..12 {
        harness
            .receive("491701234567", &format!("message {i}"))
            .await
            .unwrap();
    }

    let history = harness.inbound.sessions().history("491701234567").await;
    assert_eq!(history.len(), MAX_TURNS);
    assert_eq!(history.last().unwrap().role, Role::Assistant);
    for call in harness.generator.calls().await {
        assert!(call.len() <= MAX_TURNS);
        assert_eq!(call.last().unwrap().role, Role::User);
    }
}

#[tokio::test]
async fn failed_generation_commits_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.generator.fail_next();

    assert!(harness.receive("491701234567", "hello").await.is_err());

    assert!(harness.inbound.sessions().history("491701234567").await.is_empty());
    assert!(harness.channel.texts_to("491701234567").await.is_empty());
    assert!(!harness.is_contacted("491701234567").await);
    assert!(harness.board.cards().await.is_empty());
}

#[tokio::test]
async fn reply_without_board_skips_sync() {
    let harness = TestHarness::builder().without_board().build().await.unwrap();
    let outcome = harness.receive("491701234567", "tell me more").await.unwrap();
    assert_eq!(outcome.reply, "mock reply");
    assert!(harness.board.cards().await.is_empty());
}

#[tokio::test]
async fn dispatcher_keeps_per_phone_order() {
    let harness = TestHarness::builder()
        .with_mock_responses((0..6).map(|i| format!("reply {i}")).collect())
        .without_board()
        .build()
        .await
        .unwrap();

    for i in 0..6 {
        harness
            .dispatcher
            .dispatch(WebhookEvent::Inbound(InboundMessage {
                id: format!("wamid.in.{i}"),
                from: "491701234567".to_string(),
                text: format!("message {i}"),
                kind: InboundKind::Text,
            }))
            .await;
    }

    let mut texts = Vec::new();
    for _ in 0..200 {
        texts = harness.channel.texts_to("491701234567").await;
        if texts.len() == 6 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(
        texts,
        (0..6).map(|i| format!("reply {i}")).collect::<Vec<_>>()
    );

    let history = harness.inbound.sessions().history("491701234567").await;
    let users: Vec<_> = history
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.clone())
        .collect();
    assert_eq!(users, ["message 1", "message 2", "message 3", "message 4", "message 5"]);
    assert_eq!(harness.dispatcher.worker_count(), 1);
}

#[tokio::test]
async fn dispatcher_routes_status_events_to_tracker() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .build()
        .await
        .unwrap();
    harness.run_campaign().await.unwrap();
    let id = harness.channel.templates().await[0].message_id().clone();

    harness
        .dispatcher
        .dispatch(WebhookEvent::Status(leadrelay_core::types::StatusEvent {
            message_id: id,
            status: leadrelay_core::types::DeliveryReport::Delivered,
            recipient_id: Some("491701234567".into()),
        }))
        .await;

    assert_eq!(harness.state.stats().delivered, 1);
}

fn text_from(from: &str, i: usize) -> WebhookEvent {
    WebhookEvent::Inbound(InboundMessage {
        id: format!("wamid.in.{i}"),
        from: from.to_string(),
        text: format!("message {i}"),
        kind: InboundKind::Text,
    })
}

async fn wait_for_texts(harness: &TestHarness, to: &str, count: usize) -> Vec<String> {
    let mut texts = Vec::new();
    for _ in 0..400 {
        texts = harness.channel.texts_to(to).await;
        if texts.len() >= count {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    texts
}

#[tokio::test]
async fn flooded_phone_does_not_block_status_events() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .without_board()
        .build()
        .await
        .unwrap();
    harness.run_campaign().await.unwrap();
    let id = harness.channel.templates().await[0].message_id().clone();

    for i in 0..WORKER_QUEUE_DEPTH + 8 {
        harness
            .dispatcher
            .dispatch(text_from("491709999999", i))
            .await;
    }
    harness
        .dispatcher
        .dispatch(WebhookEvent::Status(leadrelay_core::types::StatusEvent {
            message_id: id,
            status: leadrelay_core::types::DeliveryReport::Delivered,
            recipient_id: Some("491701234567".into()),
        }))
        .await;
    assert_eq!(harness.state.stats().delivered, 1);

    wait_for_texts(&harness, "491709999999", WORKER_QUEUE_DEPTH).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        harness.channel.texts_to("491709999999").await.len(),
        WORKER_QUEUE_DEPTH
    );
}

#[tokio::test]
async fn idle_worker_retires_and_respawns() {
    let harness = TestHarness::builder().without_board().build().await.unwrap();
    let dispatcher = EventDispatcher::new(harness.inbound.clone(), harness.tracker.clone())
        .with_idle_timeout(Duration::from_millis(30));

    dispatcher.dispatch(text_from("491701234567", 0)).await;
    assert_eq!(dispatcher.worker_count(), 1);
    assert_eq!(wait_for_texts(&harness, "491701234567", 1).await.len(), 1);

    for _ in 0..200 {
        if dispatcher.worker_count() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(dispatcher.worker_count(), 0);

    dispatcher.dispatch(text_from("491701234567", 1)).await;
    assert_eq!(dispatcher.worker_count(), 1);
    assert_eq!(wait_for_texts(&harness, "491701234567", 2).await.len(), 2);
}

#[tokio::test]
async fn already_contacted_lead_is_not_sent() {
    let harness = TestHarness::builder()
        .with_lead("Anna", "+49 170 1234567")
        .build()
        .await
        .unwrap();
    let import = harness.import_leads().await.unwrap();
    harness
        .ledger
        .mark_contacted("491701234567", ContactStatus::Contacted)
        .await
        .unwrap();

    harness.state.begin_cycle(import.leads).await;
    harness
        .driver
        .initiate_conversations(&tokio_util::sync::CancellationToken::new())
        .await;

    assert!(harness.channel.templates().await.is_empty());
}
