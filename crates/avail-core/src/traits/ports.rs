//! Outbound ports - the message surface and confirmation prompt

use async_trait::async_trait;

use crate::traits::RepoResult;
use crate::value_objects::Snowflake;

/// Message-surface port: the calls the engine makes against the chat service
#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Post a message, returning its id
    async fn send_message(&self, channel_id: Snowflake, text: &str) -> RepoResult<Snowflake>;

    /// Attach a reaction affordance to a message
    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()>;

    /// Delete a posted message. NotFound and Forbidden are surfaced as
    /// errors here; callers on delete paths tolerate them as non-fatal.
    async fn delete_message(&self, channel_id: Snowflake, message_id: Snowflake)
        -> RepoResult<()>;
}

/// Confirmation port: ask the invoking user to approve a destructive step.
///
/// Implementations must bound the wait with an explicit timeout and fail
/// closed: no response means `false`.
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, channel_id: Snowflake, prompt: &str) -> bool;
}
