// SPDX-FileCopyrightText: 2026 Leadrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes webhook events to the tracker and to per-phone inbound workers.
//!
//! Each phone gets one worker task fed by its own queue, so messages from
//! the same phone are handled strictly in arrival order while different
//! phones proceed concurrently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use leadrelay_core::types::{InboundMessage, WebhookEvent};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::inbound::InboundHandler;
use crate::tracker::DeliveryTracker;

/// Queue depth of each per-phone worker. Messages beyond it are dropped.
pub const WORKER_QUEUE_DEPTH: usize = 32;

/// How long a worker waits for its next message before retiring.
pub const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

type WorkerMap = DashMap<String, Worker>;

struct Worker {
    id: u64,
    sender: mpsc::Sender<InboundMessage>,
}

pub struct EventDispatcher {
    inbound: Arc<InboundHandler>,
    tracker: Arc<DeliveryTracker>,
    workers: Arc<WorkerMap>,
    next_worker_id: AtomicU64,
    idle_timeout: Duration,
}

impl EventDispatcher {
    pub fn new(inbound: Arc<InboundHandler>, tracker: Arc<DeliveryTracker>) -> Self {
        Self {
            inbound,
            tracker,
            workers: Arc::new(DashMap::new()),
            next_worker_id: AtomicU64::new(0),
            idle_timeout: WORKER_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Consumes events until the channel closes or `cancel` fires.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<WebhookEvent>,
        cancel: CancellationToken,
    ) {
        info!("event dispatcher started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => break,
                },
            }
        }
        info!(workers = self.workers.len(), "event dispatcher stopped");
    }

    pub async fn dispatch(&self, event: WebhookEvent) {
        match event {
            WebhookEvent::Status(status) => {
                self.tracker.on_status_callback(&status).await;
            }
            WebhookEvent::Inbound(message) => self.enqueue(message),
        }
    }

    /// Number of live per-phone workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Hands `message` to its phone's worker without waiting.
    fn enqueue(&self, message: InboundMessage) {
        let phone = self.inbound.normalize(&message.from);
        if phone.is_empty() {
            warn!(from = %message.from, "dropping inbound message without usable sender");
            return;
        }

        let message = match self.try_enqueue(&phone, message) {
            Ok(()) => return,
            Err(TrySendError::Full(message)) => {
                warn!(
                    phone = %phone,
                    message_id = %message.id,
                    depth = WORKER_QUEUE_DEPTH,
                    "inbound queue full, dropping message"
                );
                return;
            }
            Err(TrySendError::Closed(message)) => message,
        };

        // The worker task died; replace it once.
        error!(phone = %phone, "inbound worker is gone, restarting it");
        self.workers.remove(&phone);
        if let Err(e) = self.try_enqueue(&phone, message) {
            error!(phone = %phone, error = %e, "dropping inbound message");
        }
    }

    /// Sends under the map entry lock, so a retiring worker never misses a
    /// message queued for it.
    fn try_enqueue(
        &self,
        phone: &str,
        message: InboundMessage,
    ) -> Result<(), TrySendError<InboundMessage>> {
        let worker = self
            .workers
            .entry(phone.to_string())
            .or_insert_with(|| self.spawn_worker(phone));
        worker.sender.try_send(message)
    }

    fn spawn_worker(&self, phone: &str) -> Worker {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(WORKER_QUEUE_DEPTH);
        tokio::spawn(run_worker(
            id,
            phone.to_string(),
            receiver,
            self.inbound.clone(),
            self.workers.clone(),
            self.idle_timeout,
        ));
        Worker { id, sender }
    }
}

async fn run_worker(
    id: u64,
    phone: String,
    mut receiver: mpsc::Receiver<InboundMessage>,
    inbound: Arc<InboundHandler>,
    workers: Arc<WorkerMap>,
    idle_timeout: Duration,
) {
    debug!(phone = %phone, worker = id, "inbound worker started");
    loop {
        match tokio::time::timeout(idle_timeout, receiver.recv()).await {
            Ok(Some(message)) => {
                if let Err(e) = inbound
                    .handle_inbound_message(&message.from, &message.text)
                    .await
                {
                    warn!(phone = %phone, message_id = %message.id, error = %e, "failed to handle inbound message");
                }
            }
            Ok(None) => break,
            Err(_) => {
                // Retire only while our queue is empty; sends happen under
                // the same entry lock.
                let retired = workers
                    .remove_if(&phone, |_, worker| {
                        worker.id == id && worker.sender.capacity() == WORKER_QUEUE_DEPTH
                    })
                    .is_some();
                if retired {
                    break;
                }
            }
        }
    }
    debug!(phone = %phone, worker = id, "inbound worker stopped");
}
