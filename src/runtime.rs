//! Poll loop and per-conversation workers
//!
//! Each conversation gets its own task fed by a channel, so its messages are
//! handled strictly in arrival order while other conversations proceed in
//! parallel. A slow rate fetch for one chat never delays another.

use crate::dispatcher::MessageHandler;
use crate::gateway::{deliver, Inbound, MessagingGateway};
use crate::store::ConversationId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Pause after a failed poll before polling again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Messages buffered per conversation before routing waits
const WORKER_QUEUE: usize = 32;

/// Conversations quiet for this long lose their worker; the next message
/// starts a fresh one
const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Handle to a running conversation worker
struct ConversationHandle {
    inbound_tx: mpsc::Sender<String>,
    last_routed: Instant,
}

pub struct BotRuntime<G, H>
where
    G: MessagingGateway + 'static,
    H: MessageHandler + 'static,
{
    gateway: Arc<G>,
    handler: Arc<H>,
    send_timeout: Duration,
    idle_timeout: Duration,
    cancel: CancellationToken,
    workers: HashMap<ConversationId, ConversationHandle>,
    tasks: JoinSet<()>,
}

impl<G, H> BotRuntime<G, H>
where
    G: MessagingGateway + 'static,
    H: MessageHandler + 'static,
{
    pub fn new(
        gateway: Arc<G>,
        handler: Arc<H>,
        send_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            handler,
            send_timeout,
            idle_timeout: WORKER_IDLE_TIMEOUT,
            cancel,
            workers: HashMap::new(),
            tasks: JoinSet::new(),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Poll until cancelled, then let every worker drain its queue
    pub async fn run(mut self) {
        tracing::info!("Starting bot runtime");

        loop {
            let batch = tokio::select! {
                () = self.cancel.cancelled() => break,
                batch = self.gateway.poll() => batch,
            };

            match batch {
                Ok(messages) => {
                    if !messages.is_empty() {
                        tracing::debug!(count = messages.len(), "Received update batch");
                    }
                    for message in messages {
                        self.route(message).await;
                    }
                    self.reap();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Polling for updates failed");
                    tokio::select! {
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(POLL_ERROR_PAUSE) => {}
                    }
                }
            }
        }

        tracing::info!(workers = self.workers.len(), "Shutting down, draining conversations");
        self.workers.clear();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Conversation worker ended abnormally");
            }
        }
        tracing::info!("Bot runtime stopped");
    }

    /// Queue a message for its conversation, waiting if that queue is full
    async fn route(&mut self, message: Inbound) {
        let Inbound {
            conversation_id: id,
            text,
        } = message;

        let text = match self.workers.get_mut(&id) {
            Some(handle) => match handle.inbound_tx.send(text).await {
                Ok(()) => {
                    handle.last_routed = Instant::now();
                    return;
                }
                // Worker is gone (it panicked); replace it
                Err(mpsc::error::SendError(text)) => {
                    tracing::warn!(conv_id = %id, "Conversation worker exited, restarting");
                    text
                }
            },
            None => text,
        };

        let handle = self.spawn_worker(id);
        if handle.inbound_tx.send(text).await.is_err() {
            tracing::error!(conv_id = %id, "Fresh conversation worker rejected message");
        }
        self.workers.insert(id, handle);
    }

    /// Drop idle and dead workers
    ///
    /// Dropping the handle closes the channel, so an idle worker finishes
    /// anything still queued and then exits.
    fn reap(&mut self) {
        let idle_timeout = self.idle_timeout;
        self.workers.retain(|id, handle| {
            let keep = !handle.inbound_tx.is_closed() && handle.last_routed.elapsed() < idle_timeout;
            if !keep {
                tracing::debug!(conv_id = %id, "Releasing idle conversation worker");
            }
            keep
        });
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Conversation worker ended abnormally");
            }
        }
    }

    fn spawn_worker(&mut self, id: ConversationId) -> ConversationHandle {
        let (inbound_tx, inbound_rx) = mpsc::channel(WORKER_QUEUE);
        let worker = ConversationWorker {
            id,
            gateway: Arc::clone(&self.gateway),
            handler: Arc::clone(&self.handler),
            send_timeout: self.send_timeout,
        };
        self.tasks.spawn(worker.run(inbound_rx));
        tracing::debug!(conv_id = %id, "Spawned conversation worker");
        ConversationHandle {
            inbound_tx,
            last_routed: Instant::now(),
        }
    }
}

struct ConversationWorker<G, H> {
    id: ConversationId,
    gateway: Arc<G>,
    handler: Arc<H>,
    send_timeout: Duration,
}

impl<G, H> ConversationWorker<G, H>
where
    G: MessagingGateway + 'static,
    H: MessageHandler + 'static,
{
    async fn run(self, mut inbound_rx: mpsc::Receiver<String>) {
        while let Some(text) = inbound_rx.recv().await {
            let reply = self.handler.handle(self.id, &text).await;

            let sent = tokio::time::timeout(
                self.send_timeout,
                deliver(self.gateway.as_ref(), self.id, &reply),
            )
            .await;
            match sent {
                Ok(Ok(())) => tracing::debug!(conv_id = %self.id, "Reply sent"),
                Ok(Err(e)) => tracing::warn!(conv_id = %self.id, error = %e, "Failed to send reply"),
                Err(_) => tracing::warn!(conv_id = %self.id, "Sending reply timed out"),
            }
        }
        tracing::debug!(conv_id = %self.id, "Conversation worker finished");
    }
}
