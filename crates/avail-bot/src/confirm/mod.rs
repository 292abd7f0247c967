//! Confirmation broker - the confirmation port implementation
//!
//! A destructive operation (superseding an active poll) posts a prompt to
//! the invoking channel and waits for the command surface to resolve it
//! via `POST /confirmations/{id}`. The wait is bounded by an explicit
//! timeout and fails closed: no response within the window counts as a
//! decline.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};
use uuid::Uuid;

use avail_core::{ChatPort, ConfirmPrompt, Snowflake};

/// Pending-confirmation registry and prompt sender
pub struct ConfirmationBroker {
    chat: Arc<dyn ChatPort>,
    pending: DashMap<Uuid, oneshot::Sender<bool>>,
    timeout: Duration,
}

impl ConfirmationBroker {
    /// Create a broker that prompts through the given chat port
    pub fn new(chat: Arc<dyn ChatPort>, timeout: Duration) -> Self {
        Self {
            chat,
            pending: DashMap::new(),
            timeout,
        }
    }

    /// Resolve a pending confirmation. Returns false when the id is
    /// unknown or already resolved (including timed out).
    pub fn resolve(&self, id: Uuid, approved: bool) -> bool {
        match self.pending.remove(&id) {
            Some((_, sender)) => {
                // A dropped receiver just means the waiter timed out first
                let _ = sender.send(approved);
                true
            }
            None => false,
        }
    }

    /// Number of confirmations currently awaiting a response
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl ConfirmPrompt for ConfirmationBroker {
    async fn confirm(&self, channel_id: Snowflake, prompt: &str) -> bool {
        let id = Uuid::new_v4();
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(id, sender);

        let text = format!("{prompt}\nConfirm with id `{id}` within {}s.", self.timeout.as_secs());
        if let Err(e) = self.chat.send_message(channel_id, &text).await {
            warn!(error = %e, "failed to send confirmation prompt; failing closed");
            self.pending.remove(&id);
            return false;
        }

        match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(approved)) => {
                info!(%id, approved, "confirmation resolved");
                approved
            }
            // Resolver dropped or timed out: fail closed
            _ => {
                self.pending.remove(&id);
                info!(%id, "confirmation timed out; treated as declined");
                false
            }
        }
    }
}
