// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadrelay serve` command implementation.
//!
//! Starts the webhook gateway, the per-phone event dispatcher, and the
//! recurring campaign scheduler, all sharing one cancellation token that
//! SIGINT/SIGTERM trigger.

use std::sync::Arc;
use std::time::{Duration, Instant};

use leadrelay_campaign::{
    load_leads, shutdown, CampaignDriver, CampaignScheduler, CampaignState, DeliveryTracker,
    DriverSettings, EventDispatcher, InboundHandler, JsonFileLedger, LeadDirectory, LeadSource,
};
use leadrelay_config::model::LeadRelayConfig;
use leadrelay_core::{
    BoardAdapter, LeadRelayError, MessagingChannel, ResponseGenerator, StatusLedger,
};
use leadrelay_gateway::{
    start_server, AuthConfig, GatewayState, HealthState, ServerConfig, StatsFn, WebhookSecrets,
};
use leadrelay_openai::{load_system_prompt, OpenAiGenerator};
use leadrelay_trello::TrelloBoard;
use leadrelay_whatsapp::{resolve_verify_token, WhatsAppChannel};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::verify::check_adapter;

/// Webhook events buffered between the gateway and the dispatcher.
const EVENT_QUEUE_DEPTH: usize = 256;

/// How long each background task gets to finish after cancellation.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the relay until a shutdown signal arrives.
pub async fn run_serve(config: LeadRelayConfig) -> Result<(), LeadRelayError> {
    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "starting leadrelay serve");

    let whatsapp = Arc::new(WhatsAppChannel::new(&config.whatsapp)?);
    let openai = Arc::new(OpenAiGenerator::new(&config.openai)?);
    let board = TrelloBoard::from_config(&config.trello)?.map(Arc::new);

    // Startup checks only log; a flaky remote must not block the webhook.
    check_adapter(whatsapp.as_ref()).await;
    check_adapter(openai.as_ref()).await;
    match &board {
        Some(board) => {
            check_adapter(board.as_ref()).await;
        }
        None => info!("board sync disabled (trello not configured)"),
    }

    let ledger: Arc<dyn StatusLedger + Send + Sync> =
        Arc::new(JsonFileLedger::open(&config.leads.status_path).await);
    let source = LeadSource::from_config(&config.leads)?;
    let initial = load_leads(&source, ledger.as_ref()).await?;
    info!(
        path = %source.path.display(),
        uncontacted = initial.leads.len(),
        skipped_contacted = initial.skipped_contacted,
        skipped_malformed = initial.skipped_malformed,
        "leads imported"
    );

    let persona = load_system_prompt(&config.agent.name, &config.openai).await;

    let channel: Arc<dyn MessagingChannel + Send + Sync> = whatsapp;
    let generator: Arc<dyn ResponseGenerator + Send + Sync> = openai;

    let state = Arc::new(CampaignState::new());
    let directory = Arc::new(LeadDirectory::new());
    let driver = Arc::new(CampaignDriver::new(
        state.clone(),
        channel.clone(),
        ledger.clone(),
        DriverSettings::from_config(&config.campaign),
    ));
    let tracker = Arc::new(DeliveryTracker::new(state.clone(), ledger.clone()));

    let mut inbound = InboundHandler::new(
        channel,
        generator,
        ledger.clone(),
        persona,
        config.leads.default_country_code.clone(),
    )
    .with_directory(directory.clone());
    if let Some(board) = board {
        let board: Arc<dyn BoardAdapter + Send + Sync> = board;
        inbound = inbound.with_board(board);
    }
    let dispatcher = Arc::new(EventDispatcher::new(Arc::new(inbound), tracker));

    let scheduler = CampaignScheduler::new(
        driver,
        source,
        ledger,
        directory,
        config.campaign.cycle_interval(),
        config.campaign.run_on_start,
    );

    let cancel = shutdown::install_signal_handler();
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

    let stats: StatsFn = {
        let state = state.clone();
        Arc::new(move || state.stats())
    };
    let gateway_state = GatewayState {
        events_tx,
        webhook: WebhookSecrets {
            verify_token: resolve_verify_token(&config.whatsapp),
            app_secret: config.whatsapp.app_secret.clone(),
        },
        stats,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: Instant::now(),
        },
    };
    if gateway_state.webhook.verify_token.is_none() {
        warn!("no webhook verify token configured, subscription handshakes will be refused");
    }
    if gateway_state.webhook.app_secret.is_none() {
        warn!("no app secret configured, webhook signatures are not checked");
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let mut gateway = tokio::spawn({
        let cancel = cancel.clone();
        async move { start_server(&server_config, gateway_state, cancel).await }
    });
    let dispatcher_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { dispatcher.run(events_rx, cancel).await }
    });
    let scheduler_task = tokio::spawn({
        let cancel = cancel.clone();
        async move { scheduler.run(initial, cancel).await }
    });

    let mut result = Ok(());
    tokio::select! {
        _ = cancel.cancelled() => {
            match tokio::time::timeout(DRAIN_TIMEOUT, &mut gateway).await {
                Ok(Ok(Err(e))) => result = Err(e),
                Ok(Err(e)) => error!(error = %e, "gateway task panicked"),
                Ok(Ok(Ok(()))) => {}
                Err(_) => warn!("gateway did not stop in time"),
            }
        }
        joined = &mut gateway => {
            // The gateway only returns early on a bind or serve error.
            cancel.cancel();
            result = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(LeadRelayError::Internal(format!("gateway task panicked: {e}"))),
            };
        }
    }

    shutdown::drain(
        "dispatcher",
        async {
            if let Err(e) = dispatcher_task.await {
                error!(error = %e, "dispatcher task panicked");
            }
        },
        DRAIN_TIMEOUT,
    )
    .await;
    shutdown::drain(
        "scheduler",
        async {
            if let Err(e) = scheduler_task.await {
                error!(error = %e, "scheduler task panicked");
            }
        },
        DRAIN_TIMEOUT,
    )
    .await;

    if let Err(e) = &result {
        error!(error = %e, "leadrelay serve stopped with an error");
    } else {
        info!("leadrelay serve shutdown complete");
    }
    result
}

/// Initialize the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadrelay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
