//! Test fixtures - fake outbound ports and event builders

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};

use avail_core::{ChatPort, ConfirmPrompt, DomainError, RepoResult, Snowflake};
use avail_engine::{InboundKind, InboundReaction};

/// Counter for unique test data
static COUNTER: AtomicI64 = AtomicI64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> i64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A message the fake chat surface "posted"
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub text: String,
}

/// Recording fake of the message-surface port.
///
/// Assigns sequential message ids, remembers sends/reactions/deletes, and
/// can be told to refuse deleting specific messages.
#[derive(Debug, Default)]
pub struct FakeChat {
    next_id: AtomicI64,
    pub sent: Mutex<Vec<SentMessage>>,
    pub reactions: Mutex<Vec<(Snowflake, String)>>,
    pub deleted: Mutex<Vec<Snowflake>>,
    pub fail_deletes: Mutex<HashSet<Snowflake>>,
}

impl FakeChat {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            ..Self::default()
        }
    }

    /// Make deletes of this message fail with a forbidden error
    pub fn refuse_delete(&self, message_id: Snowflake) {
        self.fail_deletes.lock().insert(message_id);
    }

    /// Ids of every message posted so far
    pub fn sent_ids(&self) -> Vec<Snowflake> {
        self.sent.lock().iter().map(|m| m.message_id).collect()
    }
}

#[async_trait]
impl ChatPort for FakeChat {
    async fn send_message(&self, channel_id: Snowflake, text: &str) -> RepoResult<Snowflake> {
        let message_id = Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().push(SentMessage {
            channel_id,
            message_id,
            text: text.to_string(),
        });
        Ok(message_id)
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()> {
        self.reactions.lock().push((message_id, emoji.to_string()));
        Ok(())
    }

    async fn delete_message(
        &self,
        _channel_id: Snowflake,
        message_id: Snowflake,
    ) -> RepoResult<()> {
        if self.fail_deletes.lock().contains(&message_id) {
            return Err(DomainError::Forbidden("cannot delete message".to_string()));
        }
        self.deleted.lock().push(message_id);
        Ok(())
    }
}

/// Scripted confirmation prompt: always answers with the configured value
/// and records every prompt it was asked.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn approving() -> Self {
        Self {
            answer: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ConfirmPrompt for ScriptedConfirm {
    async fn confirm(&self, _channel_id: Snowflake, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

/// Build a reaction-add signal
pub fn reaction_add(user: i64, emoji: &str, message_id: Snowflake) -> InboundReaction {
    InboundReaction {
        kind: InboundKind::ReactionAdd,
        user_id: Snowflake::new(user),
        user_name: Some(format!("user{user}")),
        message_id,
        channel_id: Snowflake::new(1),
        emoji_name: emoji.to_string(),
        is_bot: false,
    }
}

/// Build a reaction-remove signal
pub fn reaction_remove(user: i64, emoji: &str, message_id: Snowflake) -> InboundReaction {
    InboundReaction {
        kind: InboundKind::ReactionRemove,
        user_id: Snowflake::new(user),
        user_name: Some(format!("user{user}")),
        message_id,
        channel_id: Snowflake::new(1),
        emoji_name: emoji.to_string(),
        is_bot: false,
    }
}
